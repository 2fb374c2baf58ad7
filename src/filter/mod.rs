//! Predicate Filter Module
//!
//! Equality-conjunction matching over named record fields.

use std::collections::HashMap;

use serde_json::Value;

use crate::record::Record;

/// Field name → exact-match value requirements
pub type Requirements = HashMap<String, Value>;

/// Check a record against a set of field-equality requirements.
///
/// Empty requirements match everything. Otherwise every named field must be
/// present and strictly equal (type and value) to the required value; one
/// missing or unequal field rejects the record.
pub fn matches(record: &Record, requirements: &Requirements) -> bool {
    requirements
        .iter()
        .all(|(field, expected)| record.get(field) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> Record {
        Record::of_type("Widget")
            .with("_id", json!("w1"))
            .with("name", json!("bolt"))
            .with("quantity", json!(7))
    }

    fn require(pairs: &[(&str, Value)]) -> Requirements {
        pairs
            .iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_empty_requirements_match_everything() {
        assert!(matches(&widget(), &Requirements::new()));
    }

    #[test]
    fn test_single_field_match() {
        assert!(matches(&widget(), &require(&[("name", json!("bolt"))])));
        assert!(!matches(&widget(), &require(&[("name", json!("nut"))])));
    }

    #[test]
    fn test_missing_field_never_matches() {
        assert!(!matches(&widget(), &require(&[("color", json!("red"))])));
    }

    #[test]
    fn test_conjunction_requires_every_field() {
        // both match
        assert!(matches(
            &widget(),
            &require(&[("name", json!("bolt")), ("quantity", json!(7))])
        ));
        // first matches, second does not: the record must be rejected even
        // when the mismatching requirement is not the last one checked
        assert!(!matches(
            &widget(),
            &require(&[("name", json!("bolt")), ("quantity", json!(8))])
        ));
        assert!(!matches(
            &widget(),
            &require(&[("quantity", json!(8)), ("name", json!("bolt"))])
        ));
    }

    #[test]
    fn test_equality_is_strict_on_type() {
        assert!(!matches(&widget(), &require(&[("quantity", json!(7.0))])));
        assert!(!matches(&widget(), &require(&[("quantity", json!("7"))])));
    }
}
