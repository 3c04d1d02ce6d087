//! Statement monitoring for CQL execution.
//!
//! [`InstrumentedSession`] wraps any [`CqlSession`](crate::client::CqlSession) and adds:
//! - a `tracing` event per statement (target `cqlsink.cql`)
//! - an optional per-statement timeout
//! - a slow statement warning
//! - counters by statement kind ([`SessionStats`])
//!
//! # Example
//!
//! ```rust,ignore
//! use cqlsink::monitor::{InstrumentedSession, MonitorConfig};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_query_timeout(Duration::from_secs(10))
//!     .with_slow_query_threshold(Duration::from_millis(500));
//!
//! let session = InstrumentedSession::new(scylla_session).with_config(config);
//! ```

mod config;
mod instrumented;
mod stats;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedSession;
pub use stats::{SessionStats, StatementKind};

/// Truncate a string to at most `max_bytes`, respecting UTF-8 boundaries.
pub(crate) fn truncate_cql_bytes(cql: &str, max_bytes: usize) -> &str {
    if cql.len() <= max_bytes {
        return cql;
    }
    let mut end = max_bytes;
    while end > 0 && !cql.is_char_boundary(end) {
        end -= 1;
    }
    &cql[..end]
}
