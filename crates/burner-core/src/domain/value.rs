//! Numeric parameter values.
//!
//! The heater mixes integer parameters (`FanMin = 1680`) with fractional ones
//! (`PumpCal = 0.022`).  [`ParamValue`] keeps the distinction so a value is
//! written back exactly as the caller supplied it: `19` goes out as `19`, not
//! `19.0`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An integer or floating-point parameter value.
///
/// Serialised untagged, so on the wire it is a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Whole-number value such as a fan speed or run mode.
    Int(i64),
    /// Fractional value such as a pump calibration.
    Float(f64),
}

impl ParamValue {
    /// Returns the value as `f64` for numeric comparison.
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Int(i) => i as f64,
            ParamValue::Float(f) => f,
        }
    }

    /// Returns the value as an integer if it is one.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(i),
            ParamValue::Float(_) => None,
        }
    }

    /// Returns `false` for NaN and infinities, which JSON cannot carry.
    pub fn is_finite(self) -> bool {
        match self {
            ParamValue::Int(_) => true,
            ParamValue::Float(f) => f.is_finite(),
        }
    }

    /// Reads a JSON value pushed by the device, if it is a number.
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            Some(ParamValue::Int(i))
        } else {
            n.as_f64().map(ParamValue::Float)
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_serialises_as_bare_integer() {
        let v = ParamValue::Int(19);
        assert_eq!(serde_json::to_string(&v).unwrap(), "19");
    }

    #[test]
    fn test_float_serialises_as_bare_float() {
        let v = ParamValue::Float(0.035);
        assert_eq!(serde_json::to_string(&v).unwrap(), "0.035");
    }

    #[test]
    fn test_deserialise_prefers_integer() {
        let v: ParamValue = serde_json::from_str("4500").unwrap();
        assert_eq!(v, ParamValue::Int(4500));

        let v: ParamValue = serde_json::from_str("11.5").unwrap();
        assert_eq!(v, ParamValue::Float(11.5));
    }

    #[test]
    fn test_from_json_reads_numbers_only() {
        assert_eq!(ParamValue::from_json(&json!(7)), Some(ParamValue::Int(7)));
        assert_eq!(
            ParamValue::from_json(&json!(1.8)),
            Some(ParamValue::Float(1.8))
        );
        assert_eq!(ParamValue::from_json(&json!("7")), None);
        assert_eq!(ParamValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_nan_is_not_finite() {
        assert!(!ParamValue::Float(f64::NAN).is_finite());
        assert!(!ParamValue::Float(f64::INFINITY).is_finite());
        assert!(ParamValue::Float(-30.0).is_finite());
        assert!(ParamValue::Int(i64::MAX).is_finite());
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::Int(-3).to_string(), "-3");
        assert_eq!(ParamValue::Float(5.9).to_string(), "5.9");
    }

    #[test]
    fn test_as_i64_only_for_integers() {
        assert_eq!(ParamValue::Int(1).as_i64(), Some(1));
        assert_eq!(ParamValue::Float(1.0).as_i64(), None);
    }
}
