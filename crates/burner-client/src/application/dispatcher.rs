//! Inbound frame dispatch.
//!
//! Every text frame the heater sends is handed to [`InboundDispatcher`].  A
//! frame that decodes to a JSON object is merged into the shared
//! [`StateMirror`]; anything else is dropped with a debug log.  Unknown keys
//! are kept: the dispatcher never filters against the parameter vocabulary.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace};

use burner_core::{decode_frame, StateMirror};

/// The state mirror shared between the receive loop (one writer) and the
/// verifier and public API (readers).
pub type SharedState = Arc<RwLock<StateMirror>>;

/// Decodes inbound frames and merges them into the state mirror.
#[derive(Debug, Clone)]
pub struct InboundDispatcher {
    state: SharedState,
}

impl InboundDispatcher {
    /// Creates a dispatcher writing into `state`.
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Handles one text frame.
    ///
    /// Returns `true` if the frame was merged, `false` if it was dropped.
    /// Dropping is never an error for the caller.
    pub async fn dispatch(&self, text: &str) -> bool {
        match decode_frame(text) {
            Ok(update) => {
                let mut mirror = self.state.write().await;
                let written = mirror.merge(update);
                trace!("merged {written} key(s) into state mirror");
                true
            }
            Err(e) => {
                debug!("dropping undecodable frame ({e}): {text:?}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
