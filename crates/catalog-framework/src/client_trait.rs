//! # TableAccess Trait
//!
//! Provides a common interface for record-specific table wrappers, adding default
//! `put`, `get` and `scan` methods on top of a generic `TableClient`.
use crate::{TableClient, TableEntity, TableError};
use async_trait::async_trait;

/// Trait for record-specific wrappers to inherit the standard table operations.
///
/// # Example
///
/// ```rust
/// use catalog_framework::{TableAccess, TableClient, TableEntity, TableError};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Stock { product_id: String, count: u64 }
///
/// impl TableEntity for Stock {
///     type Key = String;
///     type Error = std::convert::Infallible;
///     fn key(&self) -> String { self.product_id.clone() }
/// }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("stock table: {0}")]
/// struct StockTableError(String);
///
/// struct StockTable { inner: TableClient<Stock> }
///
/// #[async_trait]
/// impl TableAccess<Stock> for StockTable {
///     type Error = StockTableError;
///     fn inner(&self) -> &TableClient<Stock> { &self.inner }
///     fn map_error(e: TableError) -> StockTableError { StockTableError(e.to_string()) }
/// }
///
/// async fn usage(table: StockTable) {
///     // put(), get() and scan() are provided automatically
///     let _ = table.get("p1".to_string()).await;
/// }
/// ```
#[async_trait]
pub trait TableAccess<T: TableEntity>: Send + Sync {
    /// The wrapper-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic TableClient.
    fn inner(&self) -> &TableClient<T>;

    /// Map framework errors to the wrapper's error type.
    fn map_error(e: TableError) -> Self::Error;

    /// Upsert a record.
    #[tracing::instrument(skip(self, item))]
    async fn put(&self, item: T) -> Result<(), Self::Error> {
        tracing::debug!(key = %item.key(), "Sending request");
        self.inner().put(item).await.map_err(Self::map_error)
    }

    /// Fetch a record by key.
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: T::Key) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(key).await.map_err(Self::map_error)
    }

    /// Fetch every record.
    #[tracing::instrument(skip(self))]
    async fn scan(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().scan().await.map_err(Self::map_error)
    }
}
