use std::time::Duration;
use tracing::Level;

/// Configuration for statement monitoring and timeouts.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Statement timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
    /// Level of the per-statement event.
    pub level: Level,
    /// Truncate long CQL in events (in bytes). `None` means no truncation.
    pub max_cql_length: Option<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            slow_query_threshold: None,
            level: Level::DEBUG,
            max_cql_length: Some(200),
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements exceeding this duration return [`SinkError::Timeout`](crate::SinkError::Timeout).
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_cql_length(mut self, len: usize) -> Self {
        self.max_cql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_cql_length = None;
        self
    }
}
