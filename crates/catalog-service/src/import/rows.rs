//! CSV rows to queue messages.

use serde_json::{Map, Value};

/// Parse a CSV document with a header row into one JSON object per data row.
///
/// Values stay strings; surrounding whitespace is trimmed and empty cells are left
/// out, so an empty `count` column reads the same as a missing one.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Map<String, Value>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, value)| !header.is_empty() && !value.is_empty())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Decode an S3 event object key: `+` is a space, `%XX` is a byte.
pub fn decode_object_key(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b'%' => match bytes.get(i + 1..i + 3).and_then(hex_byte) {
                Some(byte) => {
                    decoded.push(byte);
                    i += 3;
                }
                None => {
                    decoded.push(b'%');
                    i += 1;
                }
            },
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    if !pair.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_become_objects() {
        let csv = b"title,description,price,count\nRed Hoodie, Warm ,2999,25\nBlue Mug,,12.5,\n";
        let rows = parse_csv(csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"title": "Red Hoodie", "description": "Warm", "price": "2999", "count": "25"})
        );
        assert_eq!(
            Value::Object(rows[1].clone()),
            json!({"title": "Blue Mug", "price": "12.5"})
        );
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        assert!(parse_csv(b"title,price\n").unwrap().is_empty());
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        assert!(parse_csv(b"title,price\nCap,9,extra\n").is_err());
    }

    #[test]
    fn test_object_key_decoding() {
        assert_eq!(decode_object_key("uploaded/my+products%282%29.csv"), "uploaded/my products(2).csv");
        assert_eq!(decode_object_key("uploaded/100%.csv"), "uploaded/100%.csv");
    }
}
