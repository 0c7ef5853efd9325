//! Application layer for burner-client.
//!
//! The application layer knows *what* the client does (merge pushes, refresh,
//! set-and-verify, validate input) and delegates *how* bytes move to a
//! [`HeaterLink`] implementation supplied by the infrastructure layer.
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or owning the WebSocket stream (that is infrastructure)
//! - Building Tokio runtimes (that is the blocking bridge)

pub mod dispatcher;
pub mod heater_client;
pub mod link;
pub mod verifier;

pub use dispatcher::{InboundDispatcher, SharedState};
pub use heater_client::HeaterClient;
pub use link::{HeaterLink, SendError};
pub use verifier::CommandVerifier;
