use super::{Price, Product};
use serde::{Deserialize, Serialize};

/// The product fields repeated in a batch notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub id: String,
    pub title: String,
    pub price: Price,
}

impl From<&Product> for CreatedProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price.clone(),
        }
    }
}

/// Notification body sent once per batch that created at least one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub products_created: usize,
    pub products: Vec<CreatedProduct>,
}

impl BatchSummary {
    pub fn new(created: &[Product]) -> Self {
        Self {
            products_created: created.len(),
            products: created.iter().map(CreatedProduct::from).collect(),
        }
    }

    pub fn subject(&self) -> String {
        format!("{} New Product(s) Created", self.products_created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_shape() {
        let created = vec![
            Product::new("a", "Cap", Price::from_units(9)).with_description("ignored"),
            Product::new("b", "Mug", Price::from_units(12)),
        ];
        let summary = BatchSummary::new(&created);

        assert_eq!(summary.subject(), "2 New Product(s) Created");
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "productsCreated": 2,
                "products": [
                    {"id": "a", "title": "Cap", "price": 9},
                    {"id": "b", "title": "Mug", "price": 12}
                ]
            })
        );
    }
}
