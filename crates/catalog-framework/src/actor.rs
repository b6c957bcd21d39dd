//! # Table Actor
//!
//! This module defines the `TableActor`, the server half of an in-process key-value
//! table. It owns the records and processes requests sequentially, so the map needs
//! no locking.

use crate::client::TableClient;
use crate::entity::TableEntity;
use crate::error::TableError;
use crate::message::TableRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that owns one table of records.
///
/// # Concurrency Model
/// Each table runs in its own Tokio task and handles one request at a time. Many
/// clients may write the same key concurrently; the actor applies the puts in arrival
/// order and the last one wins. There is no read-modify-write, so no request can
/// observe a half-applied update.
///
/// # Usage Pattern
///
/// ```rust
/// use catalog_framework::{TableActor, TableEntity};
///
/// #[derive(Clone, Debug)]
/// struct Row { id: String, value: u32 }
///
/// impl TableEntity for Row {
///     type Key = String;
///     type Error = std::convert::Infallible;
///     fn key(&self) -> String { self.id.clone() }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = TableActor::<Row>::new("rows", 10);
///     tokio::spawn(actor.run());
///
///     client.put(Row { id: "a".into(), value: 1 }).await.unwrap();
///     client.put(Row { id: "a".into(), value: 2 }).await.unwrap();
///
///     let rows = client.scan().await.unwrap();
///     assert_eq!(rows.len(), 1);
///     assert_eq!(rows[0].value, 2);
/// }
/// ```
pub struct TableActor<T: TableEntity> {
    name: String,
    receiver: mpsc::Receiver<TableRequest<T>>,
    store: HashMap<T::Key, T>,
}

impl<T: TableEntity> TableActor<T> {
    /// Creates a new `TableActor` and its associated `TableClient`.
    ///
    /// # Arguments
    ///
    /// * `name` - Table name, used in log fields.
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   client calls wait until there is space.
    pub fn new(name: impl Into<String>, buffer_size: usize) -> (Self, TableClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name: name.into(),
            receiver,
            store: HashMap::new(),
        };
        (actor, TableClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        let table = self.name.as_str();
        info!(table, "Table started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TableRequest::Put { item, respond_to } => {
                    debug!(table, ?item, "Put");
                    if let Err(e) = item.validate() {
                        warn!(table, error = %e, "Put rejected");
                        let _ = respond_to.send(Err(TableError::Rejected(Box::new(e))));
                        continue;
                    }
                    let key = item.key();
                    let replaced = self.store.insert(key.clone(), item).is_some();
                    info!(table, %key, replaced, size = self.store.len(), "Stored");
                    let _ = respond_to.send(Ok(()));
                }
                TableRequest::Get { key, respond_to } => {
                    let item = self.store.get(&key).cloned();
                    debug!(table, %key, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                TableRequest::Scan { respond_to } => {
                    let items: Vec<T> = self.store.values().cloned().collect();
                    debug!(table, count = items.len(), "Scan");
                    let _ = respond_to.send(Ok(items));
                }
            }
        }

        info!(table, size = self.store.len(), "Shutdown");
    }
}
