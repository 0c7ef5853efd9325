//! JSON codec for heater frames.
//!
//! Wire format (UTF-8 text frames):
//! ```text
//! outbound: {"<Key>": <number>}            exactly one key
//! inbound:  {"<Key>": <value>, ...}        zero or more keys
//! ```
//! Outbound commands are never batched.  `{"Refresh": 1}` asks the device to
//! push its full state; `{"Run": 0|1}` stops or starts the heater.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::parameter::{Parameter, RunMode};
use crate::domain::value::ParamValue;

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(String),

    /// The frame is valid JSON but not an object.
    #[error("frame is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    /// NaN or infinity cannot be represented in JSON.
    #[error("value for {key} is not a finite number")]
    NonFiniteValue { key: String },
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// A single-key command sent to the heater.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    key: String,
    value: ParamValue,
}

impl Command {
    /// Builds a `{key: value}` command.  Any key is accepted.
    pub fn new(key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Builds a command for a known parameter.
    pub fn set(parameter: Parameter, value: impl Into<ParamValue>) -> Self {
        Self::new(parameter.as_str(), value)
    }

    /// `{"Refresh": 1}`.
    pub fn refresh() -> Self {
        Self::new(Parameter::Refresh.as_str(), 1)
    }

    /// `{"Run": 0}` or `{"Run": 1}`.
    pub fn run(mode: RunMode) -> Self {
        Self::new(Parameter::Run.as_str(), mode.as_wire())
    }

    /// The key being written.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value being written.
    pub fn value(&self) -> ParamValue {
        self.value
    }

    /// Encodes the command as a one-key JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NonFiniteValue`] for NaN or infinite floats,
    /// which `serde_json` would otherwise silently turn into `null`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use burner_core::Command;
    ///
    /// let frame = Command::new("TempDesired", 19).to_json().unwrap();
    /// assert_eq!(frame, r#"{"TempDesired":19}"#);
    /// ```
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        if !self.value.is_finite() {
            return Err(ProtocolError::NonFiniteValue {
                key: self.key.clone(),
            });
        }
        let mut object = Map::with_capacity(1);
        let value = match self.value {
            ParamValue::Int(i) => Value::from(i),
            ParamValue::Float(f) => Value::from(f),
        };
        object.insert(self.key.clone(), value);
        Ok(Value::Object(object).to_string())
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Decodes one inbound text frame into the object it carries.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidJson`] for unparsable text and
/// [`ProtocolError::NotAnObject`] for arrays, strings, numbers and the like.
/// Callers drop such frames; they are never fatal.
pub fn decode_frame(text: &str) -> Result<Map<String, Value>, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ProtocolError::NotAnObject("array")),
        Value::String(_) => Err(ProtocolError::NotAnObject("string")),
        Value::Number(_) => Err(ProtocolError::NotAnObject("number")),
        Value::Bool(_) => Err(ProtocolError::NotAnObject("boolean")),
        Value::Null => Err(ProtocolError::NotAnObject("null")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refresh_command_wire_format() {
        assert_eq!(Command::refresh().to_json().unwrap(), r#"{"Refresh":1}"#);
    }

    #[test]
    fn test_run_command_wire_format() {
        assert_eq!(
            Command::run(RunMode::Start).to_json().unwrap(),
            r#"{"Run":1}"#
        );
        assert_eq!(
            Command::run(RunMode::Stop).to_json().unwrap(),
            r#"{"Run":0}"#
        );
    }

    #[test]
    fn test_float_command_keeps_fraction() {
        let frame = Command::set(Parameter::PumpCal, 0.035).to_json().unwrap();
        assert_eq!(frame, r#"{"PumpCal":0.035}"#);
    }

    #[test]
    fn test_command_has_exactly_one_key() {
        let frame = Command::new("LowVoltCutout", 11.2).to_json().unwrap();
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("LowVoltCutout"), Some(&json!(11.2)));
    }

    #[test]
    fn test_nan_command_is_rejected() {
        let result = Command::new("PumpMin", f64::NAN).to_json();
        assert_eq!(
            result,
            Err(ProtocolError::NonFiniteValue {
                key: "PumpMin".to_string()
            })
        );
    }

    #[test]
    fn test_accessors() {
        let cmd = Command::set(Parameter::FanMax, 5500);
        assert_eq!(cmd.key(), "FanMax");
        assert_eq!(cmd.value(), ParamValue::Int(5500));
    }

    #[test]
    fn test_decode_state_push() {
        let map = decode_frame(r#"{"TempCurrent": 10.1, "RunState": 7}"#).unwrap();
        assert_eq!(map.get("TempCurrent"), Some(&json!(10.1)));
        assert_eq!(map.get("RunState"), Some(&json!(7)));
    }

    #[test]
    fn test_decode_empty_object() {
        assert!(decode_frame("{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        // The kind of diagnostic reply a test double sends for bad input.
        let result = decode_frame("Data received as:  {oops}!");
        assert!(matches!(result, Err(ProtocolError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert_eq!(decode_frame("[1,2]"), Err(ProtocolError::NotAnObject("array")));
        assert_eq!(decode_frame("42"), Err(ProtocolError::NotAnObject("number")));
        assert_eq!(decode_frame("null"), Err(ProtocolError::NotAnObject("null")));
    }
}
