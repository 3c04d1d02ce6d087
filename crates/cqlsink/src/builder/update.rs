use super::clause::{SET_SEPARATOR, WHERE_SEPARATOR, check_idents, pair_with_placeholders};
use super::traits::CqlBuilder;
use crate::error::{SinkError, SinkResult};
use crate::ident;
use crate::value::Value;

/// UPDATE builder.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    /// Table name
    table: String,
    /// SET assignments
    set_fields: Vec<(String, Value)>,
    /// WHERE equality conditions
    where_fields: Vec<(String, Value)>,
    /// Append `IF EXISTS`
    if_exists: bool,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_fields: Vec::new(),
            where_fields: Vec::new(),
            if_exists: false,
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set_fields.push((column.to_string(), value.into()));
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.where_fields.push((column.to_string(), value.into()));
        self
    }

    /// Only update a row that currently exists.
    pub fn if_exists(mut self, guard: bool) -> Self {
        self.if_exists = guard;
        self
    }
}

impl CqlBuilder for UpdateBuilder {
    fn build_cql(&self) -> String {
        let mut cql = String::from("UPDATE ");
        ident::write_cql(&mut cql, &self.table);
        cql.push_str(" SET ");
        cql.push_str(&pair_with_placeholders(&self.set_fields, SET_SEPARATOR));
        if !self.where_fields.is_empty() {
            cql.push_str(" WHERE ");
            cql.push_str(&pair_with_placeholders(&self.where_fields, WHERE_SEPARATOR));
        }
        if self.if_exists {
            cql.push_str(" IF EXISTS");
        }
        cql
    }

    /// SET values first, then WHERE values.
    fn params(&self) -> Vec<Value> {
        self.set_fields
            .iter()
            .chain(&self.where_fields)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn columns(&self) -> Vec<String> {
        self.set_fields
            .iter()
            .chain(&self.where_fields)
            .map(|(c, _)| c.clone())
            .collect()
    }

    fn validate(&self) -> SinkResult<()> {
        check_idents(
            &self.table,
            self.set_fields.iter().chain(&self.where_fields).map(|(c, _)| c.as_str()),
        )?;
        if self.where_fields.is_empty() {
            return Err(SinkError::EmptyPredicate(format!(
                "UPDATE {} requires at least one key column",
                self.table
            )));
        }
        if self.set_fields.is_empty() {
            return Err(SinkError::EmptyAssignment(format!(
                "UPDATE {} requires at least one non-key column",
                self.table
            )));
        }
        Ok(())
    }
}
