use super::statement::Statement;
use crate::client::{CqlSession, ExecOutcome};
use crate::error::SinkResult;
use crate::value::Value;

/// Base trait for CQL statement builders.
pub trait CqlBuilder: Sync {
    /// Build the CQL template.
    fn build_cql(&self) -> String;

    /// Parameters in placeholder order.
    fn params(&self) -> Vec<Value>;

    /// Column each parameter binds to, aligned with [`params`](Self::params).
    fn columns(&self) -> Vec<String>;

    /// Validate builder state.
    fn validate(&self) -> SinkResult<()> {
        Ok(())
    }

    /// Debug helper.
    fn to_cql(&self) -> String {
        self.build_cql()
    }

    /// Validate, then produce the statement.
    fn build(&self) -> SinkResult<Statement> {
        self.validate()?;
        Ok(Statement::new(self.build_cql(), self.params()).with_columns(self.columns()))
    }

    /// Build and execute on a session.
    fn execute(
        &self,
        session: &impl CqlSession,
    ) -> impl std::future::Future<Output = SinkResult<ExecOutcome>> + Send {
        async move {
            let stmt = self.build()?;
            session.execute(&stmt.cql, &stmt.params).await
        }
    }
}
