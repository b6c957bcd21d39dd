//! # Product
//!
//! In local runs a [`Product`] is stored by a [`TableActor`](catalog_framework::TableActor)
//! keyed by `id`; in production it is one item of the `products` DynamoDB table.
//!
//! Products are written once (by the write API or the batch processor) and never
//! updated or deleted.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::Display;

/// A non-negative price, kept as the JSON number it was supplied as.
///
/// Integers stay integers on the wire (`1499`), decimals stay decimals (`29.99`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Number", into = "Number")]
pub struct Price(Number);

impl Price {
    /// Whole-unit price (the batch path stores integer prices).
    pub fn from_units(units: u64) -> Self {
        Self(Number::from(units))
    }

    /// Accept a JSON number or numeric string, rejecting negatives and non-numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Self::try_from(n.clone()).ok(),
            Value::String(s) => Self::parse(s.trim()),
            _ => None,
        }
    }

    /// Parse the textual form used by DynamoDB number attributes.
    pub fn parse(text: &str) -> Option<Self> {
        let number: Number = serde_json::from_str(text).ok()?;
        Self::try_from(number).ok()
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl TryFrom<Number> for Price {
    type Error = String;

    fn try_from(number: Number) -> Result<Self, Self::Error> {
        match number.as_f64() {
            Some(f) if f >= 0.0 && f.is_finite() => Ok(Self(number)),
            _ => Err(format!("price must be a non-negative number, got {}", number)),
        }
    }
}

impl From<Price> for Number {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Creates a new Product instance.
    ///
    /// # Arguments
    /// * `id` - Unique identifier (a UUID unless the batch payload supplied one)
    /// * `title` - Display name, never empty
    /// * `price` - Non-negative price
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            image: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// Request body of `POST /products`.
///
/// Fields are kept loose so that presence can be checked the same way for every
/// client; see [`crate::model::fields`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
}

/// Read model: a product joined with its stock count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_keeps_number_form() {
        let whole = Price::from_value(&json!(1499)).unwrap();
        let decimal = Price::from_value(&json!("29.99")).unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "1499");
        assert_eq!(serde_json::to_string(&decimal).unwrap(), "29.99");
    }

    #[test]
    fn test_price_rejects_negative_and_text() {
        assert!(Price::from_value(&json!(-1)).is_none());
        assert!(Price::from_value(&json!("cheap")).is_none());
        assert!(serde_json::from_value::<Price>(json!(-5)).is_err());
    }

    #[test]
    fn test_joined_product_serializes_flat() {
        let joined = ProductWithStock {
            product: Product::new("A", "Red Hoodie", Price::from_units(2999)),
            count: 25,
        };
        assert_eq!(
            serde_json::to_value(&joined).unwrap(),
            json!({
                "id": "A",
                "title": "Red Hoodie",
                "description": "",
                "price": 2999,
                "image": "",
                "count": 25
            })
        );
    }
}
