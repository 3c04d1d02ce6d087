//! Execution collaborator interface.

use crate::builder::Statement;
use crate::error::{SinkError, SinkResult};
use crate::value::Value;
use std::sync::Mutex;

/// Outcome of executing one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// `false` when a conditional statement (`IF [NOT] EXISTS`) was not applied.
    pub applied: bool,
}

impl ExecOutcome {
    pub const APPLIED: ExecOutcome = ExecOutcome { applied: true };
    pub const NOT_APPLIED: ExecOutcome = ExecOutcome { applied: false };
}

/// Something that can run a CQL statement with positional parameters.
///
/// Implemented by the live driver session and by wrappers such as
/// [`InstrumentedSession`](crate::monitor::InstrumentedSession), so the
/// destination never depends on a concrete transport.
pub trait CqlSession: Send + Sync {
    /// Execute a statement, binding `params` to its `?` placeholders in order.
    fn execute(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = SinkResult<ExecOutcome>> + Send;
}

impl<S: CqlSession> CqlSession for &S {
    fn execute(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = SinkResult<ExecOutcome>> + Send {
        (**self).execute(cql, params)
    }
}

impl<S: CqlSession> CqlSession for std::sync::Arc<S> {
    fn execute(
        &self,
        cql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = SinkResult<ExecOutcome>> + Send {
        (**self).execute(cql, params)
    }
}

/// In-memory session that records statements instead of sending them.
///
/// Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSession {
    executed: Mutex<Vec<Statement>>,
    fail_at: Option<usize>,
    not_applied: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the statement with this zero-based execution index.
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Report every statement as not applied.
    pub fn not_applied(mut self) -> Self {
        self.not_applied = true;
        self
    }

    /// Statements executed so far.
    pub fn executed(&self) -> Vec<Statement> {
        self.lock().clone()
    }

    /// Drain the recorded statements.
    pub fn take(&self) -> Vec<Statement> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Statement>> {
        // a panicked writer cannot leave a half-pushed Vec
        self.executed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CqlSession for RecordingSession {
    async fn execute(&self, cql: &str, params: &[Value]) -> SinkResult<ExecOutcome> {
        let mut executed = self.lock();
        if self.fail_at == Some(executed.len()) {
            return Err(SinkError::execution(format!("injected failure for: {cql}")));
        }
        executed.push(Statement::new(cql, params.to_vec()));
        Ok(ExecOutcome {
            applied: !self.not_applied,
        })
    }
}
