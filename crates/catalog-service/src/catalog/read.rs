//! Joined reads over the products and stock tables.

use super::CatalogError;
use crate::model::{Product, ProductWithStock, Stock};
use crate::store::CatalogStore;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Attach stock counts to products. Missing stock reads as 0; when several stock rows
/// share a product id the last one wins.
pub fn join_stock(products: Vec<Product>, stock: Vec<Stock>) -> Vec<ProductWithStock> {
    let counts: HashMap<String, u64> = stock
        .into_iter()
        .map(|row| (row.product_id, row.count))
        .collect();

    products
        .into_iter()
        .map(|product| {
            let count = counts.get(&product.id).copied().unwrap_or(0);
            ProductWithStock { product, count }
        })
        .collect()
}

/// Every product with its stock count, in product scan order.
#[instrument(skip(store))]
pub async fn list_available(store: &dyn CatalogStore) -> Result<Vec<ProductWithStock>, CatalogError> {
    let products = store.scan_products().await?;
    let stock = store.scan_stock().await?;
    debug!(products = products.len(), stock = stock.len(), "Scanned catalog");
    Ok(join_stock(products, stock))
}

/// One product with its stock count.
#[instrument(skip(store))]
pub async fn get_by_id(
    store: &dyn CatalogStore,
    id: Option<&str>,
) -> Result<ProductWithStock, CatalogError> {
    let id = match id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(CatalogError::BadRequest("Product ID is required".to_string())),
    };

    let product = store
        .get_product(id)
        .await?
        .ok_or_else(|| CatalogError::NotFound("Product not found".to_string()))?;
    let count = store.get_stock(id).await?.map(|row| row.count).unwrap_or(0);

    Ok(ProductWithStock { product, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Price;

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {id}"), Price::from_units(10))
    }

    #[test]
    fn test_join_defaults_missing_stock_to_zero() {
        let joined = join_stock(
            vec![product("a"), product("b")],
            vec![Stock::new("a", 4), Stock::new("orphan", 9)],
        );
        let counts: Vec<_> = joined.iter().map(|p| (p.product.id.as_str(), p.count)).collect();
        assert_eq!(counts, vec![("a", 4), ("b", 0)]);
    }

    #[test]
    fn test_join_last_stock_row_wins() {
        let joined = join_stock(
            vec![product("a")],
            vec![Stock::new("a", 1), Stock::new("a", 7)],
        );
        assert_eq!(joined[0].count, 7);
    }

    #[test]
    fn test_join_empty() {
        assert!(join_stock(vec![], vec![Stock::new("a", 1)]).is_empty());
    }
}
