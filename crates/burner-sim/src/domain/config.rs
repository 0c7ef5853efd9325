//! Simulator configuration.
//!
//! [`SimConfig`] decides where the simulator listens, what state it starts
//! with, and how it treats writes.  [`WritePolicy`] is what lets a test make
//! the simulated heater misbehave: ignore writes entirely, or apply a value
//! slightly different from the one requested.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Map, Value};

/// How the simulated heater treats configuration writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WritePolicy {
    /// Store the requested value; `Run` moves `RunState` after the
    /// transition delay.
    Apply,
    /// Accept the frame and change nothing, including `RunState`.
    Ignore,
    /// Store `requested + offset` for numeric writes.  `Run` behaves as
    /// with [`WritePolicy::Apply`].
    Offset(f64),
}

/// All runtime settings for one simulator instance.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Address to listen on.  Port 0 picks a free port; read it back from
    /// `DeviceSimulator::local_addr`.
    pub bind_addr: SocketAddr,
    /// State reported before any write.
    pub initial_state: Map<String, Value>,
    pub write_policy: WritePolicy,
    /// Delay between `{"Run": n}` and the matching `RunState` change.
    pub run_transition_delay: Duration,
    /// Reply `Data received as: <frame>!` to every frame, not only to
    /// malformed ones.
    pub echo_diagnostics: bool,
}

impl Default for SimConfig {
    /// Loopback on an ephemeral port, factory state, writes applied, and a
    /// 50 ms run transition.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            initial_state: default_initial_state(),
            write_policy: WritePolicy::Apply,
            run_transition_delay: Duration::from_millis(50),
            echo_diagnostics: false,
        }
    }
}

impl SimConfig {
    /// Default config with a different write policy.
    pub fn with_policy(write_policy: WritePolicy) -> Self {
        Self {
            write_policy,
            ..Self::default()
        }
    }
}

/// Factory state of a stopped heater in a cold room.
pub fn default_initial_state() -> Map<String, Value> {
    let state = json!({
        "TempCurrent": 10.1,
        "TempBody": 10.4,
        "TempDesired": 21,
        "RunState": 7,
        "PumpMin": 1.6,
        "PumpMax": 5.5,
        "PumpCal": 0.022,
        "PumpCount": 0,
        "LowVoltCutout": 11.5,
        "FanMin": 1680,
        "FanMax": 4500,
        "FrostOn": 0,
        "FrostRise": 5,
    });
    match state {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
