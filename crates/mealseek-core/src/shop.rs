//! The restaurant record returned by the search and detail APIs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A restaurant as returned by the backend.
///
/// Only `id` and the coordinates are interpreted here (for map centring);
/// `name` is lifted out for listings and every other field is carried
/// through untouched in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Shop {
    /// A top-level string field from the pass-through payload (`address`, ...).
    #[must_use]
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = serde_json::json!({
            "id": "J001",
            "name": "Menya",
            "lat": 35.1,
            "lng": 139.2,
            "address": "1-2-3 Shibuya",
            "genre": { "code": "G013", "name": "Ramen" }
        });
        let shop: Shop = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(shop.detail_str("address"), Some("1-2-3 Shibuya"));
        assert_eq!(serde_json::to_value(&shop).unwrap(), raw);
    }

    #[test]
    fn missing_coordinates_fail_to_parse() {
        let raw = serde_json::json!({ "id": "J001", "name": "Menya" });
        assert!(serde_json::from_value::<Shop>(raw).is_err());
    }
}
