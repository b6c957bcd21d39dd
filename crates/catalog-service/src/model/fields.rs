//! Loose field handling for client- and CSV-supplied JSON.
//!
//! Payloads reach the catalog from browsers and from CSV files, so the same field may
//! arrive as a number, a numeric string, or an empty cell. These helpers give every
//! entry point one definition of "present", "text" and "integer".

use serde_json::Value;

/// Whether a field counts as supplied.
///
/// Absent, `null`, `false`, `0` and `""` are all treated as missing.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a scalar field as text. Empty strings and non-scalars yield `None`.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer parsing with `parseInt` rules: numbers are truncated, strings contribute
/// their leading integer (`"12.5kg"` is 12). Anything else yields `None`.
///
/// Values beyond the `i64` range saturate.
pub fn leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let (sign, digits) = match trimmed.as_bytes().first() {
                Some(b'-') => (-1, &trimmed[1..]),
                Some(b'+') => (1, &trimmed[1..]),
                _ => (1, trimmed),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let digits = &digits[..end];
            if digits.is_empty() {
                return None;
            }
            // All ASCII digits, so parsing can only fail on overflow.
            Some(sign * digits.parse::<i64>().unwrap_or(i64::MAX))
        }
        _ => None,
    }
}
