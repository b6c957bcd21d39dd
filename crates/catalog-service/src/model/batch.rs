//! Queue-resident product records and how they become catalog rows.

use super::fields::{is_present, leading_int, text};
use super::{Price, Product, Stock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How numeric fields of a queued record are coerced to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericCoercion {
    /// Unparseable or negative values become 0.
    #[default]
    Lenient,
    /// Unparseable or negative values reject the record.
    Strict,
}

impl NumericCoercion {
    /// Coerce a field with integer-prefix rules. Missing fields are 0 in both modes;
    /// `None` means the record must be skipped.
    pub fn coerce(self, value: Option<&Value>) -> Option<u64> {
        if !is_present(value) {
            return Some(0);
        }
        match value.and_then(leading_int) {
            Some(n) if n >= 0 => Some(n as u64),
            _ => match self {
                NumericCoercion::Lenient => Some(0),
                NumericCoercion::Strict => None,
            },
        }
    }
}

/// Why a queued record was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordRejection {
    #[error("body is not a JSON object: {0}")]
    Malformed(String),
    #[error("missing title or price")]
    MissingFields,
    #[error("price {0} is not a non-negative integer")]
    InvalidPrice(Value),
    #[error("count {0} is not a non-negative integer")]
    InvalidCount(Value),
}

/// One product row as it travels through the ingestion queue.
///
/// CSV-sourced values arrive as strings, hand-written messages may carry numbers;
/// both are accepted. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
}

impl BatchMessage {
    pub fn parse(body: &str) -> Result<Self, RecordRejection> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| RecordRejection::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(RecordRejection::Malformed(format!("expected an object, got {value}")));
        }
        serde_json::from_value(value).map_err(|e| RecordRejection::Malformed(e.to_string()))
    }

    /// Build the Product and Stock rows for this record.
    ///
    /// Everything is checked before anything is returned, so a rejected record never
    /// leads to a partial write.
    pub fn into_rows(
        self,
        coercion: NumericCoercion,
        new_id: impl FnOnce() -> String,
    ) -> Result<(Product, Stock), RecordRejection> {
        if !is_present(self.title.as_ref()) || !is_present(self.price.as_ref()) {
            return Err(RecordRejection::MissingFields);
        }
        let title = text(self.title.as_ref()).ok_or(RecordRejection::MissingFields)?;

        let price = coercion
            .coerce(self.price.as_ref())
            .ok_or_else(|| RecordRejection::InvalidPrice(self.price.clone().unwrap_or_default()))?;
        let count = coercion
            .coerce(self.count.as_ref())
            .ok_or_else(|| RecordRejection::InvalidCount(self.count.clone().unwrap_or_default()))?;

        let id = text(self.id.as_ref()).unwrap_or_else(new_id);
        let product = Product::new(id.clone(), title, Price::from_units(price))
            .with_description(text(self.description.as_ref()).unwrap_or_default())
            .with_image(text(self.image.as_ref()).unwrap_or_default());

        Ok((product, Stock::new(id, count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: Value) -> BatchMessage {
        serde_json::from_value(value).unwrap()
    }

    fn fixed_id() -> String {
        "generated".to_string()
    }

    #[test]
    fn test_csv_strings_are_coerced() {
        let (product, stock) = message(json!({
            "title": "Blue Mug",
            "price": "12.5",
            "count": "40",
            "description": "Stoneware"
        }))
        .into_rows(NumericCoercion::Lenient, fixed_id)
        .unwrap();

        assert_eq!(product.id, "generated");
        assert_eq!(product.price, Price::from_units(12));
        assert_eq!(product.description, "Stoneware");
        assert_eq!(product.image, "");
        assert_eq!(stock, Stock::new("generated", 40));
    }

    #[test]
    fn test_payload_id_is_kept() {
        let (product, stock) = message(json!({"id": "p-7", "title": "Cap", "price": 9}))
            .into_rows(NumericCoercion::Lenient, fixed_id)
            .unwrap();
        assert_eq!(product.id, "p-7");
        assert_eq!(stock.product_id, "p-7");
        assert_eq!(stock.count, 0);
    }

    #[test]
    fn test_missing_price_is_rejected() {
        let result = message(json!({"title": "Cap"})).into_rows(NumericCoercion::Lenient, fixed_id);
        assert_eq!(result, Err(RecordRejection::MissingFields));

        let zero = message(json!({"title": "Cap", "price": 0})).into_rows(NumericCoercion::Lenient, fixed_id);
        assert_eq!(zero, Err(RecordRejection::MissingFields));
    }

    #[test]
    fn test_unparseable_price_depends_on_mode() {
        let record = message(json!({"title": "Cap", "price": "abc", "count": "-2"}));

        let (product, stock) = record
            .clone()
            .into_rows(NumericCoercion::Lenient, fixed_id)
            .unwrap();
        assert_eq!(product.price, Price::from_units(0));
        assert_eq!(stock.count, 0);

        let strict = record.into_rows(NumericCoercion::Strict, fixed_id);
        assert!(matches!(strict, Err(RecordRejection::InvalidPrice(_))));
    }

    #[test]
    fn test_oversized_count_keeps_its_magnitude() {
        let (_, stock) = message(json!({"title": "Cap", "price": "5", "count": "123456789012345678901234"}))
            .into_rows(NumericCoercion::Lenient, fixed_id)
            .unwrap();
        assert_eq!(stock.count, i64::MAX as u64);
    }

    #[test]
    fn test_strict_rejects_bad_count() {
        let strict = message(json!({"title": "Cap", "price": "5", "count": "lots"}))
            .into_rows(NumericCoercion::Strict, fixed_id);
        assert!(matches!(strict, Err(RecordRejection::InvalidCount(_))));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        assert!(matches!(BatchMessage::parse("not json"), Err(RecordRejection::Malformed(_))));
        assert!(matches!(BatchMessage::parse("[1,2]"), Err(RecordRejection::Malformed(_))));
    }
}
