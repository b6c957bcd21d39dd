use catalog_framework::{TableAccess, TableActor, TableClient, TableEntity, TableError};
use async_trait::async_trait;

// --- Test Record ---

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    name: String,
    hits: u64,
}

impl TableEntity for Counter {
    type Key = String;
    type Error = std::convert::Infallible;

    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, PartialEq)]
struct CounterTableError(String);

struct CounterTable {
    inner: TableClient<Counter>,
}

#[async_trait]
impl TableAccess<Counter> for CounterTable {
    type Error = CounterTableError;

    fn inner(&self) -> &TableClient<Counter> {
        &self.inner
    }

    fn map_error(e: TableError) -> CounterTableError {
        CounterTableError(e.to_string())
    }
}

/// Concurrent writers to the same key leave exactly one row behind.
#[tokio::test]
async fn test_concurrent_upserts_keep_one_row_per_key() {
    let (actor, client) = TableActor::<Counter>::new("counters", 32);
    let handle = tokio::spawn(actor.run());

    let mut writers = vec![];
    for hits in 0..20u64 {
        let client = client.clone();
        writers.push(tokio::spawn(async move {
            client
                .put(Counter {
                    name: format!("c{}", hits % 2),
                    hits,
                })
                .await
        }));
    }
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let rows = client.scan().await.unwrap();
    assert_eq!(rows.len(), 2, "one row per key");

    drop(client);
    handle.await.unwrap();
}

/// The provided trait methods route through the wrapper's error mapping.
#[tokio::test]
async fn test_table_access_wrapper() {
    let (actor, client) = TableActor::<Counter>::new("counters", 8);
    tokio::spawn(actor.run());
    let table = CounterTable { inner: client };

    table
        .put(Counter {
            name: "page".into(),
            hits: 3,
        })
        .await
        .unwrap();

    let fetched = table.get("page".to_string()).await.unwrap();
    assert_eq!(fetched.map(|c| c.hits), Some(3));
    assert_eq!(table.scan().await.unwrap().len(), 1);
}

/// Once the actor task is gone, clients report a closed table instead of hanging.
#[tokio::test]
async fn test_closed_table_reports_error() {
    let (actor, client) = TableActor::<Counter>::new("counters", 8);
    drop(actor);

    let table = CounterTable { inner: client };
    let result = table.scan().await;
    assert_eq!(
        result,
        Err(CounterTableError("Table actor closed".to_string()))
    );
}
