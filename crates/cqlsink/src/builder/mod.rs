//! CQL statement builders.
//!
//! Turns change records into parameterized INSERT/UPDATE/DELETE statements.
//!
//! ## Design
//!
//! - Placeholders are positional (`?`); parameters are collected in the same
//!   left-to-right order as the placeholders in the template.
//! - Safe defaults: DELETE and UPDATE require a WHERE predicate;
//!   UPDATE requires SET. Violations are errors, never partial statements.
//! - Existence guards (`IF NOT EXISTS` / `IF EXISTS`) are opt-in on the
//!   low-level builders and on by default in [`QueryBuilder`].
//!
//! ```
//! use cqlsink::builder::QueryBuilder;
//! use cqlsink::record::StructuredData;
//!
//! let key = StructuredData::new().with("id", "6");
//! let after = StructuredData::new().with("age", 33).with("id", "6");
//!
//! let stmt = QueryBuilder::new().build_update(&key, &after, "users").unwrap();
//! assert_eq!(stmt.cql, "UPDATE users SET age = ? WHERE id = ? IF EXISTS");
//! assert_eq!(stmt.params.len(), 2);
//! ```

mod clause;
pub mod delete;
pub mod insert;
pub mod query;
pub mod statement;
pub mod traits;
pub mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use query::QueryBuilder;
pub use statement::Statement;
pub use traits::CqlBuilder;
pub use update::UpdateBuilder;
