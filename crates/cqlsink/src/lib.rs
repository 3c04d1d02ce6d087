//! # cqlsink
//!
//! Writes change-data-capture records into Cassandra/ScyllaDB tables.
//!
//! ## Features
//!
//! - **One statement per record**: create/snapshot → `INSERT`, update → `UPDATE`,
//!   delete → `DELETE`
//! - **Parameterized CQL**: values are always bound to `?` placeholders, never inlined
//! - **Quoted identifiers**: table and column names from records are quoted as needed
//! - **Deterministic output**: the same record always renders the same CQL text
//! - **Safe defaults**: DELETE and UPDATE require a key predicate, UPDATE requires SET
//! - **Idempotent replays**: `IF NOT EXISTS` / `IF EXISTS` guards (configurable)
//! - **Statement monitoring**: timing, timeouts and counters via [`InstrumentedSession`]
//!
//! ## Usage
//!
//! ```ignore
//! use cqlsink::{ChangeRecord, Destination, DestinationConfig};
//!
//! let config = DestinationConfig::new(&["127.0.0.1:9042"], "app", "users");
//! let destination = Destination::open(&config).await?;
//!
//! let records: Vec<ChangeRecord> = load_records()?;
//! let written = destination.write(&records).await?;
//! ```
//!
//! Without a cluster, pass a [`RecordingSession`] to
//! [`Destination::from_config`] and inspect the statements it captured.

pub mod builder;
pub mod client;
pub mod config;
pub mod destination;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod normalize;
pub mod record;
pub mod value;

#[cfg(feature = "scylla")]
pub mod session;

pub use builder::{CqlBuilder, DeleteBuilder, InsertBuilder, QueryBuilder, Statement, UpdateBuilder};
pub use client::{CqlSession, ExecOutcome, RecordingSession};
pub use config::{AuthConfig, AuthMechanism, DestinationConfig};
pub use destination::Destination;
pub use error::{SinkError, SinkResult};
pub use ident::Ident;
pub use monitor::{InstrumentedSession, MonitorConfig, SessionStats, StatementKind};
pub use normalize::ColumnSet;
pub use record::{Change, ChangeRecord, Data, Operation, StructuredData};
pub use value::Value;

#[cfg(feature = "scylla")]
pub use session::ScyllaSession;
