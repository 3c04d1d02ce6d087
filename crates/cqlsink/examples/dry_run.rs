//! Translate change records into CQL without a cluster.
//!
//! Run with: cargo run --example dry_run -p cqlsink

use cqlsink::{ChangeRecord, Destination, DestinationConfig, RecordingSession, SinkError};

#[tokio::main]
async fn main() -> Result<(), SinkError> {
    let config = DestinationConfig::new(&["localhost"], "app", "users");
    let destination = Destination::from_config(&config, RecordingSession::new())?;

    let lines = [
        r#"{"position":"1","operation":"snapshot","key":{"id":"6"},"payload":{"after":{"id":"6","age":22,"name":"alice"}}}"#,
        r#"{"position":"2","operation":"update","key":{"id":"6"},"payload":{"after":{"id":"6","age":33}}}"#,
        r#"{"position":"3","operation":"delete","metadata":{"opencdc.collection":"users_archive"},"key":{"id":"6"}}"#,
    ];
    let records: Vec<ChangeRecord> = lines
        .iter()
        .map(|line| serde_json::from_str(line).map_err(|e| SinkError::malformed(e.to_string())))
        .collect::<Result<_, _>>()?;

    let written = destination.write(&records).await?;
    println!("translated {written} records");

    if let Some(session) = destination.session() {
        for stmt in session.executed() {
            println!("{}", stmt.cql);
            println!("  params: {:?}", stmt.params);
        }
    }

    Ok(())
}
