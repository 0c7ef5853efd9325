//! Infrastructure layer for burner-client.
//!
//! Handles all I/O: the WebSocket connection to the heater, the background
//! receive loop, and the dedicated runtime that lets synchronous code drive
//! the async client.
//!
//! # What does NOT belong here?
//!
//! - Verification rules or input validation (application and core)
//! - Configuration parsing (domain)

pub mod blocking;
pub mod session;

use std::sync::Arc;

use tokio::sync::RwLock;

use burner_core::StateMirror;

use crate::application::{HeaterClient, HeaterLink, SharedState};
use crate::domain::config::ClientConfig;

pub use blocking::{BlockingError, BlockingHeaterClient};
pub use session::{Session, SessionError};

/// Builds a [`HeaterClient`] backed by a WebSocket [`Session`].
///
/// The client is not connected yet; call [`HeaterClient::connect`].
pub fn new_client(config: &ClientConfig) -> HeaterClient {
    let state: SharedState = Arc::new(RwLock::new(StateMirror::new()));
    let session = Session::new(config, Arc::clone(&state));
    HeaterClient::with_link(
        Arc::new(session) as Arc<dyn HeaterLink>,
        state,
        config.timings,
    )
}
