//! In-process catalog tables.
//!
//! Each table is a [`TableActor`] owning its rows; [`MemoryStore`] holds one client per
//! table and forwards the [`CatalogStore`] calls to them.

use super::{CatalogStore, StoreError};
use crate::model::{Product, Stock};
use async_trait::async_trait;
use catalog_framework::{TableAccess, TableActor, TableClient, TableEntity, TableError};
use tokio::task::JoinHandle;

pub const PRODUCTS_TABLE: &str = "products";
pub const STOCK_TABLE: &str = "stock";

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RowError(&'static str);

impl TableEntity for Product {
    type Key = String;
    type Error = RowError;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn validate(&self) -> Result<(), RowError> {
        if self.id.is_empty() {
            return Err(RowError("product id is empty"));
        }
        if self.title.is_empty() {
            return Err(RowError("product title is empty"));
        }
        Ok(())
    }
}

impl TableEntity for Stock {
    type Key = String;
    type Error = RowError;

    fn key(&self) -> String {
        self.product_id.clone()
    }

    fn validate(&self) -> Result<(), RowError> {
        if self.product_id.is_empty() {
            Err(RowError("stock product_id is empty"))
        } else {
            Ok(())
        }
    }
}

fn table_error(table: &'static str, e: TableError) -> StoreError {
    match e {
        TableError::Rejected(reason) => StoreError::Rejected {
            table,
            reason: reason.to_string(),
        },
        other => StoreError::Unavailable {
            table,
            reason: other.to_string(),
        },
    }
}

pub struct ProductTable {
    inner: TableClient<Product>,
}

#[async_trait]
impl TableAccess<Product> for ProductTable {
    type Error = StoreError;

    fn inner(&self) -> &TableClient<Product> {
        &self.inner
    }

    fn map_error(e: TableError) -> StoreError {
        table_error(PRODUCTS_TABLE, e)
    }
}

pub struct StockTable {
    inner: TableClient<Stock>,
}

#[async_trait]
impl TableAccess<Stock> for StockTable {
    type Error = StoreError;

    fn inner(&self) -> &TableClient<Stock> {
        &self.inner
    }

    fn map_error(e: TableError) -> StoreError {
        table_error(STOCK_TABLE, e)
    }
}

/// Both catalog tables, served by table actors.
pub struct MemoryStore {
    products: ProductTable,
    stock: StockTable,
}

impl MemoryStore {
    /// Spawns one actor per table. The actors stop once the store (and every other
    /// client) is dropped; await the handles to wait for that.
    pub fn spawn(buffer_size: usize) -> (Self, Vec<JoinHandle<()>>) {
        let (product_actor, products) = TableActor::<Product>::new(PRODUCTS_TABLE, buffer_size);
        let (stock_actor, stock) = TableActor::<Stock>::new(STOCK_TABLE, buffer_size);
        let handles = vec![
            tokio::spawn(product_actor.run()),
            tokio::spawn(stock_actor.run()),
        ];
        (Self::from_clients(products, stock), handles)
    }

    /// Wraps existing clients, e.g. ones handed out by `MockTable`.
    pub fn from_clients(products: TableClient<Product>, stock: TableClient<Stock>) -> Self {
        Self {
            products: ProductTable { inner: products },
            stock: StockTable { inner: stock },
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn put_product(&self, product: Product) -> Result<(), StoreError> {
        self.products.put(product).await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.products.get(id.to_string()).await
    }

    async fn scan_products(&self) -> Result<Vec<Product>, StoreError> {
        self.products.scan().await
    }

    async fn put_stock(&self, stock: Stock) -> Result<(), StoreError> {
        self.stock.put(stock).await
    }

    async fn get_stock(&self, product_id: &str) -> Result<Option<Stock>, StoreError> {
        self.stock.get(product_id.to_string()).await
    }

    async fn scan_stock(&self) -> Result<Vec<Stock>, StoreError> {
        self.stock.scan().await
    }
}
