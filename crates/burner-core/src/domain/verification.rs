//! Rules that decide whether a write took effect.
//!
//! The heater has no acknowledgment channel.  After a write the client asks
//! for a fresh state push and compares what it sees against what it asked
//! for.  For most keys that is a direct echo: write `FanMin`, read `FanMin`.
//! A few keys are asymmetric: `Run` is never reported back, its effect shows
//! up as a code in `RunState` instead.
//!
//! Asymmetric keys live in a declarative table, [`ASYMMETRIC_RULES`], so a new
//! one is a table row, not a new branch in the verifier.
//!
//! # Value equality
//!
//! Echoed values are compared numerically with a small relative tolerance
//! rather than as strings, so a device that reports `19.0` for a requested
//! `19`, or `0.035000001` for `0.035`, still counts as confirmed.

use serde_json::Value;

use crate::domain::parameter::RunMode;
use crate::domain::state::render_value;
use crate::domain::value::ParamValue;

/// Relative tolerance used when comparing numeric values.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// How the observed value is judged against the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The read key must report the requested value.
    EchoesRequested,
    /// The read key is a run-state code; 1 must yield 9 and 0 must yield 7.
    RunStateAcknowledges,
}

/// Write keys whose effect is read from a different key.
///
/// Each row is `(write key, read key, settle before reading, expectation)`.
/// "Settle" means the device needs extra time before the new state is
/// visible, on top of the ordinary refresh delay.
pub const ASYMMETRIC_RULES: &[(&str, &str, bool, Expectation)] = &[(
    "Run",
    "RunState",
    true,
    Expectation::RunStateAcknowledges,
)];

/// How to confirm one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationRule<'a> {
    /// The mirror key to inspect after refreshing.
    pub read_key: &'a str,
    /// Whether to wait the settle delay before refreshing.
    pub settle: bool,
    /// How the observed value is judged.
    pub expectation: Expectation,
}

impl<'a> VerificationRule<'a> {
    /// Returns the rule for `write_key`.
    ///
    /// Keys without a row in [`ASYMMETRIC_RULES`] are verified by echo.
    pub fn for_key(write_key: &'a str) -> Self {
        ASYMMETRIC_RULES
            .iter()
            .find(|(key, ..)| *key == write_key)
            .map(|&(_, read_key, settle, expectation)| VerificationRule {
                read_key,
                settle,
                expectation,
            })
            .unwrap_or(VerificationRule {
                read_key: write_key,
                settle: false,
                expectation: Expectation::EchoesRequested,
            })
    }

    /// Judges an observed mirror value against the requested value.
    pub fn evaluate(&self, requested: ParamValue, observed: Option<&Value>) -> VerificationOutcome {
        let Some(observed) = observed else {
            return VerificationOutcome::Missing;
        };

        let confirmed = match self.expectation {
            Expectation::EchoesRequested => values_match(requested, observed),
            Expectation::RunStateAcknowledges => run_state_acknowledges(requested, observed),
        };

        if confirmed {
            VerificationOutcome::Confirmed
        } else {
            VerificationOutcome::Mismatch {
                observed: observed.clone(),
            }
        }
    }
}

/// The result of a single verification attempt.
///
/// There is no separate timeout outcome: a device that did not push in time
/// looks the same as one that pushed the old value.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// The device reports the expected value.
    Confirmed,
    /// The device reports something else.
    Mismatch {
        /// What the mirror held when the check ran.
        observed: Value,
    },
    /// The device has never reported the read key.
    Missing,
}

impl VerificationOutcome {
    /// Returns `true` only for [`VerificationOutcome::Confirmed`].
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VerificationOutcome::Confirmed)
    }
}

/// Compares a requested value with what the device reported.
///
/// Numbers match within [`NUMERIC_TOLERANCE`] relative to the larger
/// magnitude (floored at 1).  A non-numeric observation falls back to exact
/// text comparison.
pub fn values_match(requested: ParamValue, observed: &Value) -> bool {
    match observed.as_f64() {
        Some(actual) => {
            let expected = requested.as_f64();
            let scale = expected.abs().max(actual.abs()).max(1.0);
            (expected - actual).abs() <= NUMERIC_TOLERANCE * scale
        }
        None => render_value(observed) == requested.to_string(),
    }
}

fn run_state_acknowledges(requested: ParamValue, observed: &Value) -> bool {
    let Some(mode) = requested.as_i64().and_then(RunMode::from_wire) else {
        return false;
    };
    let code = match observed.as_i64() {
        Some(code) => code,
        None => match observed.as_f64() {
            Some(f) if f.fract() == 0.0 => f as i64,
            _ => return false,
        },
    };
    code == mode.acknowledged_run_state()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
