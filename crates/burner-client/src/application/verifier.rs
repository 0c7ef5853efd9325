//! Set-and-verify.
//!
//! The heater never acknowledges a write.  [`CommandVerifier`] turns a
//! fire-and-forget `{key: value}` frame into an approximate read-after-write
//! check:
//!
//! ```text
//! send {key: value}
//!   │
//!   ├─ rule.settle?  ── wait run_settle_delay          (Run only)
//!   │
//!   ├─ send {"Refresh": 1}, wait refresh_delay         (device pushes state)
//!   │
//!   └─ read rule.read_key from the mirror, judge it    → VerificationOutcome
//! ```
//!
//! Exactly one attempt is made.  There is no retry loop and no backoff: if
//! the device does not push within the delay the outcome is simply not
//! confirmed.  Transport failures are logged and the check still runs, so a
//! lost command shows up as a failed verification rather than an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use burner_core::{render_value, Command, VerificationOutcome, VerificationRule};

use crate::application::dispatcher::SharedState;
use crate::application::link::HeaterLink;
use crate::domain::config::Timings;

/// Refresh, fetch and set-and-verify over a [`HeaterLink`].
#[derive(Clone)]
pub struct CommandVerifier {
    link: Arc<dyn HeaterLink>,
    state: SharedState,
    timings: Timings,
}

impl CommandVerifier {
    /// Creates a verifier sending on `link` and reading from `state`.
    pub fn new(link: Arc<dyn HeaterLink>, state: SharedState, timings: Timings) -> Self {
        Self {
            link,
            state,
            timings,
        }
    }

    /// Sends `{"Refresh": 1}` and waits for the device to push its state.
    ///
    /// The wait is unconditional; the mirror is not inspected here.
    pub async fn refresh(&self) {
        self.send_logged(&Command::refresh()).await;
        tokio::time::sleep(self.timings.refresh_delay()).await;
    }

    /// Returns the raw mirror value for `key`, optionally refreshing first.
    pub async fn fetch_value(&self, key: &str, with_refresh: bool) -> Option<Value> {
        if with_refresh {
            self.refresh().await;
        }
        self.state.read().await.get(key).cloned()
    }

    /// Returns the mirror value for `key` as text, optionally refreshing
    /// first.  `None` means the device has never reported the key.
    pub async fn fetch(&self, key: &str, with_refresh: bool) -> Option<String> {
        self.fetch_value(key, with_refresh)
            .await
            .map(|v| render_value(&v))
    }

    /// Sends `command` and reports how verification went.
    pub async fn set_config_outcome(&self, command: &Command) -> VerificationOutcome {
        self.send_logged(command).await;

        let rule = VerificationRule::for_key(command.key());
        if rule.settle {
            tokio::time::sleep(self.timings.run_settle_delay()).await;
        }

        let observed = self.fetch_value(rule.read_key, true).await;
        let outcome = rule.evaluate(command.value(), observed.as_ref());

        match &outcome {
            VerificationOutcome::Confirmed => {
                info!("{} = {} confirmed", command.key(), command.value());
            }
            VerificationOutcome::Mismatch { observed } => {
                info!(
                    "{} = {} not confirmed: {} reports {observed}",
                    command.key(),
                    command.value(),
                    rule.read_key
                );
            }
            VerificationOutcome::Missing => {
                info!(
                    "{} = {} not confirmed: device has not reported {}",
                    command.key(),
                    command.value(),
                    rule.read_key
                );
            }
        }
        outcome
    }

    /// Sends `command` and returns `true` only if the device confirmed it.
    pub async fn set_config(&self, command: &Command) -> bool {
        self.set_config_outcome(command).await.is_confirmed()
    }

    async fn send_logged(&self, command: &Command) {
        match self.link.send(command).await {
            Ok(()) => debug!("command sent: {command:?}"),
            Err(e) => error!("unable to send {command:?}: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
