//! Record-level statement construction.

use super::delete::DeleteBuilder;
use super::insert::InsertBuilder;
use super::statement::Statement;
use super::traits::CqlBuilder;
use super::update::UpdateBuilder;
use crate::error::SinkResult;
use crate::normalize::ColumnSet;
use crate::record::StructuredData;

/// Builds one statement per change record.
///
/// Column order is lexicographic within the key and value groups, so the
/// same record always renders the same CQL text.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    existence_guards: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            existence_guards: true,
        }
    }
}

impl QueryBuilder {
    /// Builder with existence guards enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `IF NOT EXISTS` on inserts and `IF EXISTS` on updates.
    pub fn with_existence_guards(mut self, enabled: bool) -> Self {
        self.existence_guards = enabled;
        self
    }

    pub fn existence_guards(&self) -> bool {
        self.existence_guards
    }

    /// INSERT for Create and Snapshot records.
    ///
    /// Value columns come first, key columns are appended last.
    pub fn build_insert(
        &self,
        key: &StructuredData,
        after: &StructuredData,
        table: &str,
    ) -> SinkResult<Statement> {
        let cols = ColumnSet::from_record(key, Some(after));
        InsertBuilder::new(table)
            .set_all(cols.value_columns.into_iter().zip(cols.value_values))
            .set_all(cols.key_columns.into_iter().zip(cols.key_values))
            .if_not_exists(self.existence_guards)
            .build()
    }

    /// UPDATE for Update records: SET over value columns, WHERE over key columns.
    pub fn build_update(
        &self,
        key: &StructuredData,
        after: &StructuredData,
        table: &str,
    ) -> SinkResult<Statement> {
        let cols = ColumnSet::from_record(key, Some(after));
        let mut builder = UpdateBuilder::new(table).if_exists(self.existence_guards);
        for (col, val) in cols.values() {
            builder = builder.set(col, val.clone());
        }
        for (col, val) in cols.keys() {
            builder = builder.eq(col, val.clone());
        }
        builder.build()
    }

    /// DELETE for Delete records. Only the key is read.
    pub fn build_delete(&self, key: &StructuredData, table: &str) -> SinkResult<Statement> {
        let cols = ColumnSet::from_record(key, None);
        let mut builder = DeleteBuilder::new(table);
        for (col, val) in cols.keys() {
            builder = builder.eq(col, val.clone());
        }
        builder.build()
    }
}
