//! # Catalog Store
//!
//! Two key-value tables, `products` keyed by `id` and `stock` keyed by `product_id`,
//! behind one object-safe trait. Writes are keyed upserts; there is no multi-key
//! transaction, so a product and its stock row are two independent writes.
//!
//! - [`memory::MemoryStore`] runs each table as a [`TableActor`](catalog_framework::TableActor).
//! - [`dynamo::DynamoStore`] talks to DynamoDB.

pub mod dynamo;
pub mod memory;

use crate::model::{Product, Stock};
use async_trait::async_trait;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{table} table unavailable: {reason}")]
    Unavailable { table: &'static str, reason: String },
    #[error("{table} row rejected: {reason}")]
    Rejected { table: &'static str, reason: String },
    #[error("{operation} on {table} failed: {reason}")]
    Request {
        table: String,
        operation: &'static str,
        reason: String,
    },
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn put_product(&self, product: Product) -> Result<(), StoreError>;

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// Every product, in store order.
    async fn scan_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn put_stock(&self, stock: Stock) -> Result<(), StoreError>;

    async fn get_stock(&self, product_id: &str) -> Result<Option<Stock>, StoreError>;

    /// Every stock row, in store order.
    async fn scan_stock(&self) -> Result<Vec<Stock>, StoreError>;
}
