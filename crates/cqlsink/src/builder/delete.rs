use super::clause::{WHERE_SEPARATOR, check_idents, pair_with_placeholders};
use super::traits::CqlBuilder;
use crate::error::{SinkError, SinkResult};
use crate::ident;
use crate::value::Value;

/// DELETE builder.
///
/// A DELETE without any WHERE condition is rejected at build time; there is
/// no way to ask for an unbounded delete.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    where_fields: Vec<(String, Value)>,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_fields: Vec::new(),
        }
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.where_fields.push((column.to_string(), value.into()));
        self
    }
}

impl CqlBuilder for DeleteBuilder {
    fn build_cql(&self) -> String {
        let mut cql = String::from("DELETE FROM ");
        ident::write_cql(&mut cql, &self.table);
        cql.push_str(" WHERE ");
        cql.push_str(&pair_with_placeholders(&self.where_fields, WHERE_SEPARATOR));
        cql
    }

    fn params(&self) -> Vec<Value> {
        self.where_fields.iter().map(|(_, v)| v.clone()).collect()
    }

    fn columns(&self) -> Vec<String> {
        self.where_fields.iter().map(|(c, _)| c.clone()).collect()
    }

    fn validate(&self) -> SinkResult<()> {
        check_idents(&self.table, self.where_fields.iter().map(|(c, _)| c.as_str()))?;
        if self.where_fields.is_empty() {
            return Err(SinkError::EmptyPredicate(format!(
                "DELETE FROM {} requires at least one key column",
                self.table
            )));
        }
        Ok(())
    }
}
