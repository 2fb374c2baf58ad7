//! Line Codec Module
//!
//! Encoding and decoding between records and single JSON lines.
//!
//! ## Line Format
//!
//! Each stored record is one self-describing JSON object:
//!
//! ```text
//! {"_id":"...","_type":"Widget","_class":"Widget","name":"bolt"}
//! ```
//!
//! The type store frames lines with `delimiter + newline`; the codec only
//! deals in the JSON payload and guarantees the payload never contains the
//! delimiter.

use serde_json::Value;

use crate::error::{FlatError, Result};
use crate::record::Record;

/// Encodes records to lines and decodes lines back into generic records
pub struct LineCodec {
    delimiter: String,
}

impl LineCodec {
    pub fn new(delimiter: &str) -> Self {
        Self { delimiter: delimiter.to_string() }
    }

    /// Encode a record as a single JSON line.
    ///
    /// Stamps `_class` from the type tag when a typed constructor has not
    /// set it already, so decoding can always rebuild the original shape.
    /// Fails if the encoded payload contains the delimiter: such a line
    /// would split into garbage fragments on the next read.
    pub fn encode(&self, record: &Record) -> Result<String> {
        let mut record = record.clone();
        if record.class_name().is_none() {
            if let Some(tag) = record.type_tag().map(str::to_string) {
                record.set_class_name(&tag);
            }
        }
        let line = serde_json::to_string(&record)
            .map_err(|e| FlatError::Serialization(e.to_string()))?;
        if line.contains(&self.delimiter) {
            return Err(FlatError::Serialization(format!(
                "encoded record for id {:?} contains the delimiter {:?}",
                record.id().unwrap_or(""),
                self.delimiter
            )));
        }
        Ok(line)
    }

    /// Decode one line into a generic record.
    ///
    /// Returns `None` for blank, malformed, non-object, or id-less lines,
    /// so one corrupt record never blocks the rest of a partition.
    pub fn decode(&self, line: &str) -> Option<Record> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let value: Value = serde_json::from_str(line).ok()?;
        let record = Record::from_value(value).ok()?;
        record.id()?;
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DELIMITER;
    use serde_json::json;

    fn codec() -> LineCodec {
        LineCodec::new(DEFAULT_DELIMITER)
    }

    #[test]
    fn test_encode_stamps_class_from_type_tag() {
        let mut record = Record::of_type("Widget");
        record.set_id("w1");

        let line = codec().encode(&record).unwrap();
        let decoded = codec().decode(&line).unwrap();

        assert_eq!(decoded.class_name(), Some("Widget"));
    }

    #[test]
    fn test_encode_keeps_explicit_class() {
        let mut record = Record::of_type("Widget");
        record.set_id("w1");
        record.set_class_name("LegacyWidget");

        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.class_name(), Some("LegacyWidget"));
    }

    #[test]
    fn test_encode_rejects_delimiter_collision() {
        let codec = LineCodec::new(",");
        let mut record = Record::of_type("Widget");
        record.set_id("w1");
        record.set("name", json!("bolt"));

        // every multi-field JSON object contains a comma
        assert!(matches!(
            codec.encode(&record),
            Err(FlatError::Serialization(_))
        ));
    }

    #[test]
    fn test_decode_skips_garbage() {
        assert!(codec().decode("").is_none());
        assert!(codec().decode("   ").is_none());
        assert!(codec().decode("{not json").is_none());
        assert!(codec().decode("[1,2,3]").is_none());
        assert!(codec().decode("\"bare string\"").is_none());
        // an object without an id cannot be keyed into a stack
        assert!(codec().decode(r#"{"name":"bolt"}"#).is_none());
    }

    #[test]
    fn test_decode_round_trip_preserves_fields() {
        let mut record = Record::of_type("Widget");
        record.set_id("w1");
        record.set("name", json!("bolt"));
        record.set("quantity", json!(7));

        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();

        assert_eq!(decoded.id(), Some("w1"));
        assert_eq!(decoded.get("name"), Some(&json!("bolt")));
        assert_eq!(decoded.get("quantity"), Some(&json!(7)));
    }
}
