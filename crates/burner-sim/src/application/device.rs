//! The simulated heater.
//!
//! [`DeviceModel`] turns one inbound text frame into a list of
//! [`Reaction`]s for the server to carry out.  It never touches a socket or
//! a timer, so every behaviour below is unit-testable:
//!
//! | Frame                    | Reaction                                      |
//! |--------------------------|-----------------------------------------------|
//! | `{"Refresh": _}`         | broadcast the full state                      |
//! | `{"Run": 0\|1}`          | `RunState` 7 / 9 after the transition delay   |
//! | `{"<Key>": v, ...}`      | store per [`WritePolicy`]                     |
//! | anything not an object   | reply `Data received as: <frame>!`            |

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use burner_core::{decode_frame, ParamValue, Parameter, RunMode};

use crate::domain::config::WritePolicy;

/// Something the server must do in response to a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Send this text to the session the frame came from.
    Reply(String),
    /// Send this text to every connected session.
    Broadcast(String),
    /// Set `RunState` to this code once the transition delay has passed.
    RunTransition(i64),
}

/// State and write handling of one simulated heater.
#[derive(Debug, Clone)]
pub struct DeviceModel {
    state: Map<String, Value>,
    policy: WritePolicy,
    echo_diagnostics: bool,
    received: Vec<String>,
}

impl DeviceModel {
    pub fn new(initial_state: Map<String, Value>, policy: WritePolicy, echo_diagnostics: bool) -> Self {
        Self {
            state: initial_state,
            policy,
            echo_diagnostics,
            received: Vec::new(),
        }
    }

    /// Handles one inbound text frame.
    pub fn handle_frame(&mut self, text: &str) -> Vec<Reaction> {
        self.received.push(text.to_string());

        let mut reactions = Vec::new();
        if self.echo_diagnostics {
            reactions.push(Reaction::Reply(diagnostic_reply(text)));
        }

        let frame = match decode_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("malformed frame ({e}): {text:?}");
                if !self.echo_diagnostics {
                    reactions.push(Reaction::Reply(diagnostic_reply(text)));
                }
                return reactions;
            }
        };

        let mut refresh = false;
        for (key, value) in frame {
            if key == Parameter::Refresh.as_str() {
                refresh = true;
            } else if key == Parameter::Run.as_str() {
                reactions.extend(self.run(&value));
            } else {
                self.write(key, value);
            }
        }

        // Refresh last, so a frame that both writes and refreshes reports
        // the written value.
        if refresh {
            reactions.push(Reaction::Broadcast(self.state_json()));
        }
        reactions
    }

    fn run(&self, value: &Value) -> Option<Reaction> {
        let Some(mode) = ParamValue::from_json(value)
            .and_then(ParamValue::as_i64)
            .and_then(RunMode::from_wire)
        else {
            warn!("ignoring Run with unsupported value {value}");
            return None;
        };
        match self.policy {
            WritePolicy::Ignore => None,
            WritePolicy::Apply | WritePolicy::Offset(_) => {
                Some(Reaction::RunTransition(mode.acknowledged_run_state()))
            }
        }
    }

    fn write(&mut self, key: String, value: Value) {
        let stored = match self.policy {
            WritePolicy::Ignore => return,
            WritePolicy::Apply => value,
            WritePolicy::Offset(offset) => match ParamValue::from_json(&value) {
                Some(n) => json!(n.as_f64() + offset),
                None => value,
            },
        };
        debug!("{key} <- {stored}");
        self.state.insert(key, stored);
    }

    /// Completes a run transition scheduled by [`Reaction::RunTransition`].
    pub fn apply_run_state(&mut self, run_state: i64) {
        self.state
            .insert(Parameter::RunState.as_str().to_string(), json!(run_state));
    }

    /// Merges an unsolicited update into the state and returns the text to
    /// broadcast.
    pub fn merge_push(&mut self, update: Map<String, Value>) -> String {
        let text = Value::Object(update.clone()).to_string();
        self.state.extend(update);
        text
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// Full state as a JSON object.
    pub fn state_json(&self) -> String {
        Value::Object(self.state.clone()).to_string()
    }

    /// Every text frame received so far, in arrival order.
    pub fn received(&self) -> &[String] {
        &self.received
    }
}

fn diagnostic_reply(text: &str) -> String {
    format!("Data received as: {text}!")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
