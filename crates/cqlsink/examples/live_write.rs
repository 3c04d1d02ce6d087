//! Write a few records to a running cluster.
//!
//! Run with: cargo run --example live_write -p cqlsink
//!
//! Set CQLSINK_TEST_NODES in .env file or environment variable:
//! CQLSINK_TEST_NODES=127.0.0.1:9042
//!
//! Expects `CREATE TABLE app.users (id text PRIMARY KEY, age int, name text)`.

use cqlsink::{ChangeRecord, Data, Destination, DestinationConfig, Operation, SinkError, StructuredData};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), SinkError> {
    dotenvy::dotenv().ok();

    let nodes = env::var("CQLSINK_TEST_NODES").expect("CQLSINK_TEST_NODES must be set in .env or environment");
    let nodes: Vec<&str> = nodes.split(',').map(str::trim).collect();

    let config = DestinationConfig::new(&nodes, "app", "users")
        .with_query_timeout(Duration::from_secs(5));
    let mut destination = Destination::open(&config).await?;

    let key = StructuredData::new().with("id", "6");
    let after = StructuredData::new().with("id", "6").with("age", 22).with("name", "alice");
    let records = [
        ChangeRecord::new(Operation::Create, key.clone(), Some(Data::from(after))),
        ChangeRecord::new(
            Operation::Update,
            key.clone(),
            Some(Data::from(StructuredData::new().with("age", 23))),
        ),
        ChangeRecord::new(Operation::Delete, key, None),
    ];

    let written = destination.write(&records).await?;
    println!("wrote {written} records");

    if let Some(session) = destination.session() {
        println!("{:?}", session.stats());
    }

    destination.teardown()
}
