//! The seam between the client logic and the transport.
//!
//! [`HeaterLink`] is everything the application layer needs from a
//! connection: open it, close it, ask whether it is usable, and push one
//! command down it.  The WebSocket session in the infrastructure layer is the
//! production implementation; tests substitute recording doubles or mocks.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use burner_core::{Command, ProtocolError};

/// Why a command could not be handed to the transport.
#[derive(Debug, Error)]
pub enum SendError {
    /// There is no open connection (never connected, closed, or dropped).
    #[error("the websocket is not currently open")]
    NotConnected,

    /// The command could not be encoded as JSON.
    #[error("could not encode command: {0}")]
    Encode(#[from] ProtocolError),

    /// The transport rejected the frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport did not accept the frame in time.
    #[error("timed out after {0:?} sending the frame")]
    TimedOut(Duration),
}

/// A connection to one heater.
///
/// All methods are infallible at the type level except [`HeaterLink::send`]:
/// connect and close failures are logged by the implementation and reported
/// as `false`, matching how the client surfaces network trouble.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeaterLink: Send + Sync {
    /// Opens the connection and starts receiving.  Returns `true` on success.
    async fn connect(&self) -> bool;

    /// Closes the connection.  Returns `true` if an open connection was closed.
    async fn close(&self) -> bool;

    /// Whether the connection is believed usable.
    fn is_alive(&self) -> bool;

    /// Sends one command frame.
    async fn send(&self, command: &Command) -> Result<(), SendError>;
}
