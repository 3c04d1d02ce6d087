use crate::client::{CqlSession, ExecOutcome};
use crate::error::SinkResult;
use crate::value::Value;
use serde::Serialize;

/// A built statement: CQL template plus positional parameters.
///
/// `params[i]` binds to the i-th `?` in `cql`, counting left to right.
/// Statements produced by the builders also carry `columns[i]`, the raw
/// name of the column that `params[i]` is bound to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub cql: String,
    pub params: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

impl Statement {
    pub fn new(cql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            cql: cql.into(),
            params,
            columns: Vec::new(),
        }
    }

    /// Attach the bound column names, in placeholder order.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Number of positional placeholders in the template.
    ///
    /// A `?` inside a quoted identifier is part of the name, not a marker.
    pub fn placeholder_count(&self) -> usize {
        let mut quoted = false;
        let mut count = 0;
        for ch in self.cql.chars() {
            match ch {
                // `""` inside a quoted name toggles twice
                '"' => quoted = !quoted,
                '?' if !quoted => count += 1,
                _ => {}
            }
        }
        count
    }

    /// Pair each bound column with its parameter.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(&self.params)
    }

    /// Execute on a session.
    pub async fn execute(&self, session: &impl CqlSession) -> SinkResult<ExecOutcome> {
        session.execute(&self.cql, &self.params).await
    }
}
