//! Parameter vocabulary understood by the heater controller.
//!
//! The device itself is not schema-checked: any string is a structurally
//! valid key and the state mirror stores whatever the device pushes.  The
//! [`Parameter`] enum exists for the typed client API and for documentation;
//! it is never used to filter inbound frames.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string does not name a known [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown heater parameter: {0:?}")]
pub struct UnknownParameter(pub String);

/// Every key the heater is known to use.
///
/// The first thirteen variants are readable state keys that the device
/// includes in its state pushes.  [`Parameter::Refresh`] and
/// [`Parameter::Run`] are pseudo-commands: they can be written but the device
/// never reports a key with that name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Ambient temperature measured by the controller.
    TempCurrent,
    /// Heat exchanger body temperature.
    TempBody,
    /// Thermostat set point.
    TempDesired,
    /// Numeric run-state code (7 = stopped, 9 = running).
    RunState,
    /// Minimum blower speed in RPM.
    FanMin,
    /// Maximum blower speed in RPM.
    FanMax,
    /// Minimum fuel pump rate in Hz.
    PumpMin,
    /// Maximum fuel pump rate in Hz.
    PumpMax,
    /// Fuel pump calibration, millilitres per stroke.
    PumpCal,
    /// Fuel pump stroke counter; writing 0 resets it.
    PumpCount,
    /// Supply voltage below which the heater shuts down.
    LowVoltCutout,
    /// Frost-mode start temperature.
    FrostOn,
    /// Frost-mode temperature rise before stopping.
    FrostRise,
    /// Ask the device to push its full state.
    Refresh,
    /// Start (1) or stop (0) the heater.
    Run,
}

impl Parameter {
    /// All known parameters, readable keys first.
    pub const ALL: [Parameter; 15] = [
        Parameter::TempCurrent,
        Parameter::TempBody,
        Parameter::TempDesired,
        Parameter::RunState,
        Parameter::FanMin,
        Parameter::FanMax,
        Parameter::PumpMin,
        Parameter::PumpMax,
        Parameter::PumpCal,
        Parameter::PumpCount,
        Parameter::LowVoltCutout,
        Parameter::FrostOn,
        Parameter::FrostRise,
        Parameter::Refresh,
        Parameter::Run,
    ];

    /// Returns the exact key string used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Parameter::TempCurrent => "TempCurrent",
            Parameter::TempBody => "TempBody",
            Parameter::TempDesired => "TempDesired",
            Parameter::RunState => "RunState",
            Parameter::FanMin => "FanMin",
            Parameter::FanMax => "FanMax",
            Parameter::PumpMin => "PumpMin",
            Parameter::PumpMax => "PumpMax",
            Parameter::PumpCal => "PumpCal",
            Parameter::PumpCount => "PumpCount",
            Parameter::LowVoltCutout => "LowVoltCutout",
            Parameter::FrostOn => "FrostOn",
            Parameter::FrostRise => "FrostRise",
            Parameter::Refresh => "Refresh",
            Parameter::Run => "Run",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownParameter(s.to_string()))
    }
}

/// The two values the `Run` pseudo-command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Shut the heater down (`{"Run": 0}`).
    Stop,
    /// Start the heater (`{"Run": 1}`).
    Start,
}

impl RunMode {
    /// Returns the integer sent on the wire.
    pub const fn as_wire(self) -> i64 {
        match self {
            RunMode::Stop => 0,
            RunMode::Start => 1,
        }
    }

    /// Returns the `RunState` code the device reports once this mode has
    /// taken effect.
    pub const fn acknowledged_run_state(self) -> i64 {
        match self {
            RunMode::Stop => 7,
            RunMode::Start => 9,
        }
    }

    /// Maps a wire integer to a mode; anything other than 0 or 1 is `None`.
    pub const fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(RunMode::Stop),
            1 => Some(RunMode::Start),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
