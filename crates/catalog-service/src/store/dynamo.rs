//! DynamoDB catalog tables.
//!
//! Table schema:
//! - `products`: PK `id` (S); `title`, `description`, `image` (S); `price` (N)
//! - `stock`: PK `product_id` (S); `count` (N)
//!
//! Scans follow `LastEvaluatedKey` until the table is exhausted, so callers always get
//! the whole table. Items written by other tools are decoded leniently: missing
//! optional attributes take their defaults, and an item without its key is skipped.

use super::{CatalogStore, StoreError};
use crate::model::{Price, Product, Stock};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB implementation of [`CatalogStore`].
pub struct DynamoStore {
    client: Client,
    products_table: String,
    stock_table: String,
}

impl DynamoStore {
    /// Build a store from shared SDK configuration, optionally against a local endpoint.
    pub fn new(
        config: &aws_config::SdkConfig,
        endpoint_url: Option<&str>,
        products_table: impl Into<String>,
        stock_table: impl Into<String>,
    ) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(config)
        };

        let store = Self {
            client,
            products_table: products_table.into(),
            stock_table: stock_table.into(),
        };
        info!(
            products = %store.products_table,
            stock = %store.stock_table,
            "Connected to DynamoDB"
        );
        store
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| request_error(table, "PutItem", e))?;
        Ok(())
    }

    async fn get_item(&self, table: &str, key: &str, value: &str) -> Result<Option<Item>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(table)
            .key(key, AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| request_error(table, "GetItem", e))?;
        Ok(result.item)
    }

    async fn scan_all(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| request_error(table, "Scan", e))?;
            pages += 1;
            items.extend(page.items.unwrap_or_default());

            match page.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(table, pages, count = items.len(), "Scanned table");
        Ok(items)
    }
}

fn request_error<E: std::error::Error>(table: &str, operation: &'static str, e: E) -> StoreError {
    StoreError::Request {
        table: table.to_string(),
        operation,
        reason: DisplayErrorContext(e).to_string(),
    }
}

fn string_attr(item: &Item, name: &str) -> Option<String> {
    match item.get(name) {
        Some(AttributeValue::S(s)) => Some(s.clone()),
        Some(AttributeValue::N(n)) => Some(n.clone()),
        _ => None,
    }
}

fn number_attr(item: &Item, name: &str) -> Option<String> {
    match item.get(name) {
        Some(AttributeValue::N(n)) | Some(AttributeValue::S(n)) => Some(n.clone()),
        _ => None,
    }
}

pub(crate) fn product_to_item(product: Product) -> Item {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(product.id));
    item.insert("title".to_string(), AttributeValue::S(product.title));
    item.insert("description".to_string(), AttributeValue::S(product.description));
    item.insert("price".to_string(), AttributeValue::N(product.price.to_string()));
    item.insert("image".to_string(), AttributeValue::S(product.image));
    item
}

pub(crate) fn product_from_item(item: &Item) -> Option<Product> {
    let Some(id) = string_attr(item, "id") else {
        warn!("Skipping product item without id");
        return None;
    };
    let price = match number_attr(item, "price").as_deref().map(Price::parse) {
        Some(Some(price)) => price,
        other => {
            if other.is_some() {
                warn!(%id, "Malformed product price, reading as 0");
            }
            Price::from_units(0)
        }
    };
    Some(Product {
        title: string_attr(item, "title").unwrap_or_default(),
        description: string_attr(item, "description").unwrap_or_default(),
        image: string_attr(item, "image").unwrap_or_default(),
        price,
        id,
    })
}

pub(crate) fn stock_to_item(stock: Stock) -> Item {
    let mut item = HashMap::new();
    item.insert("product_id".to_string(), AttributeValue::S(stock.product_id));
    item.insert("count".to_string(), AttributeValue::N(stock.count.to_string()));
    item
}

pub(crate) fn stock_from_item(item: &Item) -> Option<Stock> {
    let Some(product_id) = string_attr(item, "product_id") else {
        warn!("Skipping stock item without product_id");
        return None;
    };
    let count = match number_attr(item, "count") {
        None => 0,
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
            warn!(%product_id, count = %raw, "Malformed stock count, reading as 0");
            0
        }),
    };
    Some(Stock { product_id, count })
}

#[async_trait]
impl CatalogStore for DynamoStore {
    #[instrument(skip(self, product), fields(id = %product.id))]
    async fn put_product(&self, product: Product) -> Result<(), StoreError> {
        self.put_item(&self.products_table, product_to_item(product)).await?;
        debug!("Stored product in DynamoDB");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let item = self.get_item(&self.products_table, "id", id).await?;
        Ok(item.as_ref().and_then(product_from_item))
    }

    #[instrument(skip(self))]
    async fn scan_products(&self) -> Result<Vec<Product>, StoreError> {
        let items = self.scan_all(&self.products_table).await?;
        Ok(items.iter().filter_map(product_from_item).collect())
    }

    #[instrument(skip(self, stock), fields(product_id = %stock.product_id))]
    async fn put_stock(&self, stock: Stock) -> Result<(), StoreError> {
        self.put_item(&self.stock_table, stock_to_item(stock)).await?;
        debug!("Stored stock in DynamoDB");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_stock(&self, product_id: &str) -> Result<Option<Stock>, StoreError> {
        let item = self.get_item(&self.stock_table, "product_id", product_id).await?;
        Ok(item.as_ref().and_then(stock_from_item))
    }

    #[instrument(skip(self))]
    async fn scan_stock(&self) -> Result<Vec<Stock>, StoreError> {
        let items = self.scan_all(&self.stock_table).await?;
        Ok(items.iter().filter_map(stock_from_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_item_attributes() {
        let product = Product::new("p1", "Mug", Price::parse("12.5").unwrap()).with_image("mug.png");
        let item = product_to_item(product.clone());

        assert_eq!(item.get("price"), Some(&AttributeValue::N("12.5".to_string())));
        assert_eq!(product_from_item(&item), Some(product));
    }

    #[test]
    fn test_sparse_product_item_uses_defaults() {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("p2".to_string()));
        item.insert("title".to_string(), AttributeValue::S("Cap".to_string()));
        item.insert("price".to_string(), AttributeValue::N("9".to_string()));

        let product = product_from_item(&item).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.image, "");
        assert_eq!(product.price, Price::from_units(9));
    }

    #[test]
    fn test_item_without_key_is_skipped() {
        let mut item = HashMap::new();
        item.insert("count".to_string(), AttributeValue::N("4".to_string()));
        assert_eq!(stock_from_item(&item), None);
        assert_eq!(product_from_item(&item), None);
    }

    #[test]
    fn test_malformed_count_reads_as_zero() {
        let mut item = stock_to_item(Stock::new("p3", 7));
        assert_eq!(stock_from_item(&item), Some(Stock::new("p3", 7)));

        item.insert("count".to_string(), AttributeValue::N("-1".to_string()));
        assert_eq!(stock_from_item(&item), Some(Stock::new("p3", 0)));
    }
}
