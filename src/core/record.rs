//! Field lookup over heterogeneous records

use crate::core::field::FieldValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Anything a condition can be tested against
///
/// Returning `None` or `Some(FieldValue::Null)` both mean the field is
/// missing, and every condition on a missing field fails.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).map(FieldValue::from_json)
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.as_object().and_then(|object| object.field(name))
    }
}

impl Record for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_lookup() {
        let record = json!({"name": "Alice", "value": 100, "closed": null});
        assert_eq!(record.field("name"), Some(FieldValue::from("Alice")));
        assert_eq!(record.field("value"), Some(FieldValue::Integer(100)));
        assert_eq!(record.field("closed"), Some(FieldValue::Null));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn test_non_object_has_no_fields() {
        assert_eq!(json!([1, 2]).field("0"), None);
        assert_eq!(json!("text").field("name"), None);
    }

    #[test]
    fn test_hash_map_lookup() {
        let mut record = HashMap::new();
        record.insert("stage".to_string(), FieldValue::from("proposal"));
        assert_eq!(record.field("stage"), Some(FieldValue::from("proposal")));
    }
}
