#![cfg(feature = "scylla")]

use cqlsink::{ChangeRecord, Data, Destination, DestinationConfig, Operation, SinkError, SinkResult, StructuredData};
use scylla::client::session_builder::SessionBuilder;
use std::time::{SystemTime, UNIX_EPOCH};

const KEYSPACE: &str = "cqlsink_test";

async fn row_count(session: &scylla::client::session::Session, table: &str) -> SinkResult<usize> {
    let result = session
        .query_unpaged(format!("SELECT id1 FROM {KEYSPACE}.{table}"), ())
        .await
        .map_err(|e| SinkError::execution(e.to_string()))?
        .into_rows_result()
        .map_err(|e| SinkError::execution(e.to_string()))?;
    Ok(result.rows_num())
}

#[tokio::test]
async fn write_roundtrip_against_cluster() -> SinkResult<()> {
    dotenvy::dotenv().ok();
    let nodes = match std::env::var("CQLSINK_TEST_NODES") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("CQLSINK_TEST_NODES is not set; skipping write_roundtrip_against_cluster");
            return Ok(());
        }
    };
    let nodes: Vec<&str> = nodes.split(',').map(str::trim).collect();

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let table = format!("users_{}_{}", std::process::id(), nanos % 1_000_000);

    let config = DestinationConfig::new(&nodes, KEYSPACE, &table);
    let admin = SessionBuilder::new()
        .known_nodes(config.contact_points()?)
        .build()
        .await
        .map_err(|e| SinkError::Connection(e.to_string()))?;
    for ddl in [
        format!(
            "CREATE KEYSPACE IF NOT EXISTS {KEYSPACE} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
        ),
        format!(
            "CREATE TABLE {KEYSPACE}.{table} (id1 text, id2 int, column1 int, column2 boolean, column3 timestamp, PRIMARY KEY (id1, id2))"
        ),
    ] {
        admin
            .query_unpaged(ddl, ())
            .await
            .map_err(|e| SinkError::execution(e.to_string()))?;
    }

    let mut destination = Destination::open(&config).await?;

    let key = StructuredData::new().with("id1", "6").with("id2", 6);
    let after = StructuredData::new()
        .with("id1", "6")
        .with("id2", 6)
        .with("column1", 22)
        .with("column2", true)
        .with("column3", "2023-08-01T10:00:00Z");
    let updated = StructuredData::new().with("column1", 33).with("column2", false);

    let records = [
        ChangeRecord::new(Operation::Snapshot, key.clone(), Some(Data::from(after.clone()))),
        // replay of the same row is not applied but still counts
        ChangeRecord::new(Operation::Create, key.clone(), Some(Data::from(after))),
        ChangeRecord::new(Operation::Update, key.clone(), Some(Data::from(updated))),
    ];
    assert_eq!(destination.write(&records).await?, 3);
    assert_eq!(row_count(&admin, &table).await?, 1);

    let stats = destination.session().unwrap().stats();
    assert_eq!(stats.executed, 3);
    assert_eq!(stats.not_applied, 1);

    let delete = ChangeRecord::new(Operation::Delete, key, None);
    assert_eq!(destination.write(&[delete]).await?, 1);
    assert_eq!(row_count(&admin, &table).await?, 0);

    destination.teardown()?;
    admin
        .query_unpaged(format!("DROP TABLE {KEYSPACE}.{table}"), ())
        .await
        .map_err(|e| SinkError::execution(e.to_string()))?;
    Ok(())
}
