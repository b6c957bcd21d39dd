use serde::{Deserialize, Serialize};

/// Inventory count for one product, keyed by `product_id`.
///
/// The foreign key is not enforced: a stock row may exist for a product that was never
/// written, and a product without a stock row reads as `count = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub product_id: String,
    #[serde(default)]
    pub count: u64,
}

impl Stock {
    pub fn new(product_id: impl Into<String>, count: u64) -> Self {
        Self {
            product_id: product_id.into(),
            count,
        }
    }
}
