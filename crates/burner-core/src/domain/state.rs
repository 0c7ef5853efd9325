//! The local mirror of the heater's state.
//!
//! The device pushes JSON objects containing some or all of its parameters.
//! [`StateMirror`] folds each object into a single map: every key in the new
//! object overwrites the previous value for that key, and keys the new object
//! does not mention are left alone.  Nothing is ever removed.
//!
//! # Why `serde_json::Value` and not `ParamValue`?
//!
//! The mirror must accept anything the device sends, including keys the
//! client has never heard of and values that are not numbers.  Storing the raw
//! JSON value keeps the mirror lossless; typed accessors convert on read.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Last-known value of every key the device has reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMirror {
    values: HashMap<String, Value>,
}

impl StateMirror {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one decoded inbound object, last write wins.
    ///
    /// Returns the number of keys written.
    pub fn merge(&mut self, update: Map<String, Value>) -> usize {
        let count = update.len();
        self.values.extend(update);
        count
    }

    /// Returns the raw value for `key`, or `None` if it was never reported.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key` rendered as text.
    ///
    /// JSON strings are returned without their quotes; every other value uses
    /// its JSON rendering (`19`, `0.022`, `true`).
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(render_value)
    }

    /// Returns the value for `key` as `f64` if it is numeric.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Returns the value for `key` as `i64` if it is an integral number.
    ///
    /// Floats with no fractional part (`7.0`) are accepted, since some
    /// firmware revisions report integer codes as floats.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        let f = value.as_f64()?;
        (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
    }

    /// Returns `true` if the device has ever reported `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys in the mirror.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` until the first non-empty merge.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a copy of the whole mirror.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.values.clone()
    }
}

/// Renders a JSON value the way the mirror's string accessors do.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_new_mirror_is_empty() {
        let mirror = StateMirror::new();
        assert!(mirror.is_empty());
        assert_eq!(mirror.get("TempCurrent"), None);
    }

    #[test]
    fn test_later_frame_wins_for_shared_key() {
        // Arrange
        let mut mirror = StateMirror::new();

        // Act: two frames share TempDesired
        mirror.merge(object(json!({"TempDesired": 21, "RunState": 7})));
        mirror.merge(object(json!({"TempDesired": 19})));

        // Assert: the second value wins and untouched keys survive
        assert_eq!(mirror.get("TempDesired"), Some(&json!(19)));
        assert_eq!(mirror.get("RunState"), Some(&json!(7)));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"GlowPlugVolts": 8.2, "Firmware": "3.4"})));
        assert_eq!(mirror.get_f64("GlowPlugVolts"), Some(8.2));
        assert_eq!(mirror.get_string("Firmware"), Some("3.4".to_string()));
    }

    #[test]
    fn test_empty_merge_changes_nothing() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"FanMin": 1680})));
        let written = mirror.merge(Map::new());
        assert_eq!(written, 0);
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn test_merge_returns_number_of_keys_written() {
        let mut mirror = StateMirror::new();
        let written = mirror.merge(object(json!({"PumpMin": 1.6, "PumpMax": 5.5})));
        assert_eq!(written, 2);
    }

    #[test]
    fn test_get_string_renders_numbers_like_json() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"FanMax": 4500, "PumpCal": 0.022})));
        assert_eq!(mirror.get_string("FanMax"), Some("4500".to_string()));
        assert_eq!(mirror.get_string("PumpCal"), Some("0.022".to_string()));
    }

    #[test]
    fn test_get_i64_accepts_integral_floats() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"RunState": 9.0, "PumpCal": 0.5})));
        assert_eq!(mirror.get_i64("RunState"), Some(9));
        assert_eq!(mirror.get_i64("PumpCal"), None);
    }

    #[test]
    fn test_non_numeric_value_has_no_numeric_view() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"RunState": "running"})));
        assert_eq!(mirror.get_f64("RunState"), None);
        assert_eq!(mirror.get_i64("RunState"), None);
        assert!(mirror.contains("RunState"));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut mirror = StateMirror::new();
        mirror.merge(object(json!({"FrostOn": 0})));
        let snap = mirror.snapshot();
        mirror.merge(object(json!({"FrostOn": 4})));
        assert_eq!(snap.get("FrostOn"), Some(&json!(0)));
    }
}
