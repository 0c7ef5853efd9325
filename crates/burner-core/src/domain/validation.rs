//! Client-side input validation.
//!
//! These checks run before any frame is sent.  A [`ValidationError`] is the
//! only failure the client reports as an error rather than a `false`
//! verification result: it means the caller asked for something the device
//! would not accept, so no network traffic happens at all.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::domain::parameter::{Parameter, RunMode};
use crate::domain::value::ParamValue;

/// Accepted frost-mode start temperatures, inclusive.
pub const FROST_ON_RANGE: RangeInclusive<f64> = 0.0..=30.0;

/// Accepted frost-mode temperature rise, inclusive.
pub const FROST_RISE_RANGE: RangeInclusive<f64> = -30.0..=30.0;

/// A requested value that fails a client-side check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `Run` only accepts 0 (stop) and 1 (start).
    #[error("incorrect run mode specified: {0} (only 0 or 1 are valid)")]
    InvalidRunMode(i64),

    /// `Run` written as a fractional number.
    #[error("incorrect run mode specified: {0} (only 0 or 1 are valid)")]
    NonIntegralRunMode(f64),

    /// `FrostOn` outside 0 to 30.
    #[error("invalid FrostOn value {0}: only values between 0 and 30 are valid")]
    FrostOnOutOfRange(f64),

    /// `FrostRise` outside -30 to +30.
    #[error("invalid FrostRise value {0}: only values between -30 and +30 are valid")]
    FrostRiseOutOfRange(f64),

    /// NaN or infinity, which cannot be encoded as JSON.
    #[error("{parameter} must be a finite number")]
    NonFinite { parameter: String },
}

/// Checks a raw run-mode integer.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRunMode`] for anything other than 0 or 1.
pub fn validate_run_mode(mode: i64) -> Result<RunMode, ValidationError> {
    RunMode::from_wire(mode).ok_or(ValidationError::InvalidRunMode(mode))
}

/// Checks a frost-mode start temperature.
///
/// # Errors
///
/// Returns [`ValidationError::NonFinite`] or
/// [`ValidationError::FrostOnOutOfRange`].
pub fn validate_frost_on(start_temp: f64) -> Result<f64, ValidationError> {
    if !start_temp.is_finite() {
        return Err(ValidationError::NonFinite {
            parameter: Parameter::FrostOn.to_string(),
        });
    }
    if !FROST_ON_RANGE.contains(&start_temp) {
        return Err(ValidationError::FrostOnOutOfRange(start_temp));
    }
    Ok(start_temp)
}

/// Checks a frost-mode temperature rise.
///
/// # Errors
///
/// Returns [`ValidationError::NonFinite`] or
/// [`ValidationError::FrostRiseOutOfRange`].
pub fn validate_frost_rise(temp_rise: f64) -> Result<f64, ValidationError> {
    if !temp_rise.is_finite() {
        return Err(ValidationError::NonFinite {
            parameter: Parameter::FrostRise.to_string(),
        });
    }
    if !FROST_RISE_RANGE.contains(&temp_rise) {
        return Err(ValidationError::FrostRiseOutOfRange(temp_rise));
    }
    Ok(temp_rise)
}

/// Rejects NaN and infinities for any other parameter.
///
/// # Errors
///
/// Returns [`ValidationError::NonFinite`].
pub fn validate_finite(parameter: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite {
            parameter: parameter.to_string(),
        })
    }
}

/// Checks an arbitrary `key = value` write.
///
/// Applies the same limits as the typed checks when `key` is one of the
/// constrained parameters, and rejects non-finite values for every key.
/// A `Run` value comes back as the integer the device expects.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first check that fails.
pub fn validate_command(key: &str, value: ParamValue) -> Result<ParamValue, ValidationError> {
    validate_finite(key, value.as_f64())?;
    match key.parse::<Parameter>() {
        Ok(Parameter::Run) => {
            let mode = match value {
                ParamValue::Int(mode) => validate_run_mode(mode)?,
                ParamValue::Float(mode) if mode == 0.0 => RunMode::Stop,
                ParamValue::Float(mode) if mode == 1.0 => RunMode::Start,
                ParamValue::Float(mode) => return Err(ValidationError::NonIntegralRunMode(mode)),
            };
            Ok(ParamValue::Int(mode.as_wire()))
        }
        Ok(Parameter::FrostOn) => validate_frost_on(value.as_f64()).map(|_| value),
        Ok(Parameter::FrostRise) => validate_frost_rise(value.as_f64()).map(|_| value),
        _ => Ok(value),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
