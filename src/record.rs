//! Traffic alert record model
//!
//! The core only needs an identifier and a payload it can cache; the
//! remaining fields are carried through unchanged.

use serde::{Deserialize, Serialize};

/// Prefix for cache keys derived from record identifiers
pub const CACHE_KEY_PREFIX: &str = "record:";

/// Geographic position of an alert (longitude / latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// A persisted traffic alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_id: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    pub reliability: u32,
    pub confidence: u32,
    pub report_rating: u32,
    pub location: Location,
    pub pub_millis: i64,
}

impl AlertRecord {
    /// Record identifier
    pub fn id(&self) -> &str {
        &self.alert_id
    }

    /// Cache key under which this record is stored
    pub fn cache_key(&self) -> String {
        cache_key_for(&self.alert_id)
    }
}

/// Build the cache key for a record identifier
pub fn cache_key_for(id: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, id)
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> AlertRecord {
    AlertRecord {
        alert_id: id.to_string(),
        country: "CI".to_string(),
        city: Some("Santiago".to_string()),
        alert_type: "JAM".to_string(),
        subtype: None,
        street: Some("Av. Providencia".to_string()),
        reliability: 6,
        confidence: 1,
        report_rating: 3,
        location: Location { x: -70.61, y: -33.43 },
        pub_millis: 1_700_000_000_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let record = sample_record("abc-123");
        assert_eq!(record.cache_key(), "record:abc-123");
        assert_eq!(cache_key_for("x"), "record:x");
    }

    #[test]
    fn test_serde_uses_type_field() {
        let record = sample_record("a1");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "JAM");
        assert!(json.get("subtype").is_none());

        let back: AlertRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
