use super::config::MonitorConfig;
use super::stats::{SessionStats, StatementKind, StatsCounters};
use super::truncate_cql_bytes;
use crate::client::{CqlSession, ExecOutcome};
use crate::error::{SinkError, SinkResult};
use crate::value::Value;
use std::time::Instant;
use tracing::Level;

/// A session wrapper that logs, times and counts every statement.
pub struct InstrumentedSession<S> {
    session: S,
    config: MonitorConfig,
    stats: StatsCounters,
}

impl<S: CqlSession> InstrumentedSession<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            config: MonitorConfig::default(),
            stats: StatsCounters::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Counters collected so far.
    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    pub fn inner(&self) -> &S {
        &self.session
    }

    pub fn into_inner(self) -> S {
        self.session
    }

    fn truncate<'a>(&self, cql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_cql_length {
            Some(max) if cql.len() > max => format!("{}...", truncate_cql_bytes(cql, max)).into(),
            _ => cql.into(),
        }
    }

    fn emit(&self, kind: StatementKind, cql: &str, param_count: usize) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let cql = self.truncate(cql);
        emit_at_level!(
            self.config.level,
            target: "cqlsink.cql",
            kind = ?kind,
            param_count,
            cql = %cql,
            "executing statement"
        );
    }
}

impl<S: CqlSession> CqlSession for InstrumentedSession<S> {
    async fn execute(&self, cql: &str, params: &[Value]) -> SinkResult<ExecOutcome> {
        let kind = StatementKind::from_cql(cql);
        self.emit(kind, cql, params.len());

        let start = Instant::now();
        let result = match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.session.execute(cql, params))
                .await
                .unwrap_or(Err(SinkError::Timeout(timeout))),
            None => self.session.execute(cql, params).await,
        };
        let duration = start.elapsed();

        self.stats
            .record(kind, duration, result.as_ref().ok().map(|o| o.applied));

        if let Some(threshold) = self.config.slow_query_threshold
            && duration > threshold
        {
            tracing::warn!(
                target: "cqlsink.cql",
                kind = ?kind,
                duration_ms = duration.as_millis() as u64,
                cql = %self.truncate(cql),
                "slow statement"
            );
        }

        if let Err(e) = &result {
            tracing::debug!(target: "cqlsink.cql", kind = ?kind, error = %e, "statement failed");
        }

        result
    }
}
