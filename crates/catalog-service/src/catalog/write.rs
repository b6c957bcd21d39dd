//! Single-product creation.

use super::CatalogError;
use crate::model::fields::{is_present, text};
use crate::model::{NewProduct, Price, Product, Stock};
use crate::store::CatalogStore;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Also write a `count = 0` stock row for every created product.
    pub init_stock_on_create: bool,
}

/// Validate and insert one product under a fresh id.
///
/// Nothing is written when validation fails. With `init_stock_on_create` the product
/// and its stock row are two independent writes.
#[instrument(skip(store, input))]
pub async fn create(
    store: &dyn CatalogStore,
    input: NewProduct,
    options: WriteOptions,
) -> Result<Product, CatalogError> {
    let title = match &input.title {
        Some(Value::String(title)) if !title.is_empty() => title.clone(),
        _ => return Err(required()),
    };
    if !is_present(input.price.as_ref()) {
        return Err(required());
    }
    let price = input
        .price
        .as_ref()
        .and_then(Price::from_value)
        .ok_or_else(|| CatalogError::Validation("Price must be a non-negative number".to_string()))?;

    let product = Product::new(Uuid::new_v4().to_string(), title, price)
        .with_description(text(input.description.as_ref()).unwrap_or_default())
        .with_image(text(input.image.as_ref()).unwrap_or_default());

    store.put_product(product.clone()).await?;
    if options.init_stock_on_create {
        store.put_stock(Stock::new(product.id.clone(), 0)).await?;
    }

    info!(id = %product.id, title = %product.title, "Product created");
    Ok(product)
}

fn required() -> CatalogError {
    CatalogError::Validation("Title and price are required".to_string())
}
