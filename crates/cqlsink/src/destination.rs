//! Record dispatcher: turns change records into statements and runs them.

use crate::builder::{QueryBuilder, Statement};
use crate::client::CqlSession;
use crate::config::DestinationConfig;
use crate::error::{SinkError, SinkResult};
use crate::record::{ChangeRecord, Data, Operation, StructuredData};
use tracing::{debug, error, info, warn};

/// A CQL destination bound to one session.
///
/// Records are written one statement at a time, in order.
pub struct Destination<S> {
    session: Option<S>,
    table: String,
    builder: QueryBuilder,
}

#[cfg(feature = "scylla")]
impl Destination<crate::monitor::InstrumentedSession<crate::session::ScyllaSession>> {
    /// Validate the configuration and connect to the cluster.
    pub async fn open(config: &DestinationConfig) -> SinkResult<Self> {
        use crate::monitor::{InstrumentedSession, MonitorConfig};

        let session = crate::session::ScyllaSession::connect(config).await?;
        let mut monitor = MonitorConfig::new();
        if let Some(timeout) = config.query_timeout() {
            monitor = monitor.with_query_timeout(timeout);
        }
        let destination =
            Self::from_config(config, InstrumentedSession::new(session).with_config(monitor))?;
        info!(
            keyspace = %config.keyspace,
            table = %config.table,
            "destination opened"
        );
        Ok(destination)
    }
}

impl<S: CqlSession> Destination<S> {
    /// Build a destination over an existing session.
    pub fn from_config(config: &DestinationConfig, session: S) -> SinkResult<Self> {
        config.validate()?;
        Ok(Self {
            session: Some(session),
            table: config.table.clone(),
            builder: QueryBuilder::new().with_existence_guards(config.existence_guards),
        })
    }

    /// Table used when a record names no collection.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Translate one record into its statement without executing it.
    pub fn build_statement(&self, record: &ChangeRecord) -> SinkResult<Statement> {
        let key = structured(&record.key, "key should be structured data")?;
        let table = record.collection().unwrap_or(&self.table);

        match record.operation {
            Operation::Create | Operation::Snapshot => {
                self.builder.build_insert(key, after_image(record)?, table)
            }
            Operation::Update => self.builder.build_update(key, after_image(record)?, table),
            // the after-image of a delete is never read, raw or not
            Operation::Delete => self.builder.build_delete(key, table),
        }
    }

    /// Write records in order, returning how many were written.
    ///
    /// Stops at the first failing record. The error is a
    /// [`SinkError::Record`] whose index equals the number written.
    pub async fn write(&self, records: &[ChangeRecord]) -> SinkResult<usize> {
        let session = self.session.as_ref().ok_or(SinkError::NotOpen)?;

        for (index, record) in records.iter().enumerate() {
            if let Err(e) = self.write_one(session, record).await {
                error!(
                    index,
                    position = %record.position,
                    operation = %record.operation,
                    error = %e,
                    "failed to write record"
                );
                return Err(e.at_record(index, record.position.clone()));
            }
        }
        Ok(records.len())
    }

    async fn write_one(&self, session: &S, record: &ChangeRecord) -> SinkResult<()> {
        let statement = self.build_statement(record)?;
        debug!(
            position = %record.position,
            operation = %record.operation,
            cql = %statement.cql,
            "writing record"
        );

        let outcome = statement.execute(session).await?;
        if !outcome.applied {
            // redelivered create/snapshot rows already exist, updates may target deleted rows
            warn!(
                position = %record.position,
                operation = %record.operation,
                "conditional write not applied"
            );
        }
        Ok(())
    }

    /// Release the session. Safe to call repeatedly or without a session.
    pub fn teardown(&mut self) -> SinkResult<()> {
        if self.session.take().is_some() {
            info!(table = %self.table, "destination closed");
        }
        Ok(())
    }
}

fn structured<'a>(data: &'a Data, message: &str) -> SinkResult<&'a StructuredData> {
    data.as_structured().ok_or_else(|| SinkError::malformed(message))
}

fn after_image(record: &ChangeRecord) -> SinkResult<&StructuredData> {
    match &record.payload.after {
        Some(after) => structured(after, "payload should be structured data"),
        None => Err(SinkError::malformed("payload should be structured data")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingSession;
    use crate::value::Value;

    fn destination() -> Destination<RecordingSession> {
        let config = DestinationConfig::new(&["localhost"], "ks", "users");
        Destination::from_config(&config, RecordingSession::new()).unwrap()
    }

    fn key() -> StructuredData {
        StructuredData::new().with("id", "6")
    }

    #[test]
    fn test_routes_by_operation() {
        let dest = destination();
        let after = Some(Data::from(StructuredData::new().with("id", "6").with("age", 22)));

        for (op, prefix) in [
            (Operation::Create, "INSERT INTO users"),
            (Operation::Snapshot, "INSERT INTO users"),
            (Operation::Update, "UPDATE users"),
            (Operation::Delete, "DELETE FROM users"),
        ] {
            let record = ChangeRecord::new(op, key(), after.clone());
            let stmt = dest.build_statement(&record).unwrap();
            assert!(stmt.cql.starts_with(prefix), "{op}: {}", stmt.cql);
        }
    }

    #[test]
    fn test_collection_metadata_overrides_table() {
        let dest = destination();
        let record = ChangeRecord::new(Operation::Delete, key(), None)
            .with_metadata("opencdc.collection", "accounts");
        let stmt = dest.build_statement(&record).unwrap();
        assert_eq!(stmt.cql, "DELETE FROM accounts WHERE id = ?");
        assert_eq!(stmt.params, [Value::from("6")]);
    }

    #[test]
    fn test_collection_name_is_quoted() {
        let dest = destination();
        let record = ChangeRecord::new(Operation::Delete, key(), None)
            .with_metadata("opencdc.collection", "users WHERE id = ? OR token");
        let stmt = dest.build_statement(&record).unwrap();
        assert_eq!(stmt.cql, r#"DELETE FROM "users WHERE id = ? OR token" WHERE id = ?"#);
        assert_eq!(stmt.placeholder_count(), 1);

        let record = ChangeRecord::new(Operation::Delete, key(), None)
            .with_metadata("opencdc.collection", "Accounts");
        assert_eq!(
            dest.build_statement(&record).unwrap().cql,
            r#"DELETE FROM "Accounts" WHERE id = ?"#
        );
    }

    #[test]
    fn test_malformed_shapes() {
        let dest = destination();

        let raw_key = ChangeRecord::new(Operation::Create, Data::Raw("6".into()), None);
        let err = dest.build_statement(&raw_key).unwrap_err();
        assert_eq!(err.to_string(), "Malformed record: key should be structured data");

        let raw_after = ChangeRecord::new(Operation::Update, key(), Some(Data::Raw("{}".into())));
        let err = dest.build_statement(&raw_after).unwrap_err();
        assert_eq!(err.to_string(), "Malformed record: payload should be structured data");

        let missing_after = ChangeRecord::new(Operation::Create, key(), None);
        assert!(dest.build_statement(&missing_after).unwrap_err().is_malformed_record());

        let raw_delete = ChangeRecord::new(Operation::Delete, key(), Some(Data::Raw("x".into())));
        assert!(dest.build_statement(&raw_delete).is_ok());

        let null_key =
            ChangeRecord::new(Operation::Delete, Data::Other(serde_json::Value::Null), None);
        let err = dest.build_statement(&null_key).unwrap_err();
        assert_eq!(err.to_string(), "Malformed record: key should be structured data");

        let numeric_after = ChangeRecord::new(
            Operation::Create,
            key(),
            Some(Data::Other(serde_json::json!(7))),
        );
        assert!(dest.build_statement(&numeric_after).unwrap_err().is_malformed_record());
    }

    #[test]
    fn test_delete_ignores_after_image() {
        let dest = destination();
        let afters = [
            None,
            Some(Data::Raw("opaque".into())),
            Some(Data::from(StructuredData::new().with("id", "6").with("age", 40))),
        ];
        let built: Vec<Statement> = afters
            .into_iter()
            .map(|after| dest.build_statement(&ChangeRecord::new(Operation::Delete, key(), after)).unwrap())
            .collect();
        assert!(built.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_write_after_teardown_is_not_open() {
        let mut dest = destination();
        dest.teardown().unwrap();
        dest.teardown().unwrap();
        assert!(!dest.is_open());

        let record = ChangeRecord::new(Operation::Delete, key(), None);
        let err = dest.write(&[record]).await.unwrap_err();
        assert!(matches!(err, SinkError::NotOpen));
    }

    #[test]
    fn test_from_config_validates() {
        let config = DestinationConfig::new(&["localhost."], "ks", "users");
        assert!(Destination::from_config(&config, RecordingSession::new()).is_err());
    }
}
