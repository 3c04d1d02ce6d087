use super::clause::{check_idents, column_list, placeholders};
use super::traits::CqlBuilder;
use crate::error::{SinkError, SinkResult};
use crate::ident;
use crate::value::Value;

/// INSERT builder.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    /// Table name
    table: String,
    /// Column names, in placeholder order
    columns: Vec<String>,
    /// Params, aligned with `columns`
    params: Vec<Value>,
    /// Append `IF NOT EXISTS`
    if_not_exists: bool,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            params: Vec::new(),
            if_not_exists: false,
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push(column.to_string());
        self.params.push(value.into());
        self
    }

    /// Set many columns at once, keeping iteration order.
    pub fn set_all<C, V>(mut self, fields: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: Into<Value>,
    {
        for (col, val) in fields {
            self.columns.push(col.into());
            self.params.push(val.into());
        }
        self
    }

    /// Only insert when no row with the same primary key exists.
    pub fn if_not_exists(mut self, guard: bool) -> Self {
        self.if_not_exists = guard;
        self
    }
}

impl CqlBuilder for InsertBuilder {
    fn build_cql(&self) -> String {
        let mut cql = String::from("INSERT INTO ");
        ident::write_cql(&mut cql, &self.table);
        cql.push_str(" (");
        cql.push_str(&column_list(self.columns.iter().map(String::as_str)));
        cql.push_str(") VALUES (");
        cql.push_str(&placeholders(self.columns.len()));
        cql.push(')');
        if self.if_not_exists {
            cql.push_str(" IF NOT EXISTS");
        }
        cql
    }

    fn params(&self) -> Vec<Value> {
        self.params.clone()
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn validate(&self) -> SinkResult<()> {
        check_idents(&self.table, self.columns.iter().map(String::as_str))?;
        if self.columns.is_empty() {
            return Err(SinkError::EmptyAssignment(format!(
                "INSERT INTO {} requires at least one column",
                self.table
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_insert() {
        let b = InsertBuilder::new("users").set("name", "alice").set("age", 30);
        assert_eq!(b.to_cql(), "INSERT INTO users (name, age) VALUES (?, ?)");
        assert_eq!(b.params(), [Value::from("alice"), Value::Int(30)]);
    }

    #[test]
    fn test_insert_if_not_exists() {
        let b = InsertBuilder::new("users").set("id", 1).if_not_exists(true);
        assert_eq!(b.to_cql(), "INSERT INTO users (id) VALUES (?) IF NOT EXISTS");
    }

    #[test]
    fn test_insert_quotes_names() {
        let b = InsertBuilder::new("Users").set("UserId", 1).set("select", 2);
        assert_eq!(b.to_cql(), r#"INSERT INTO "Users" ("UserId", "select") VALUES (?, ?)"#);
        let stmt = b.build().unwrap();
        assert_eq!(stmt.columns, ["UserId", "select"]);
    }

    #[test]
    fn test_insert_rejects_nul_column() {
        let err = InsertBuilder::new("users").set("a\0b", 1).build().unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn test_insert_without_columns_is_rejected() {
        let err = InsertBuilder::new("users").build().unwrap_err();
        assert!(err.is_empty_assignment());
    }
}
