//! burner-client library crate.
//!
//! An async client for Afterburner heater controllers.  The controller is
//! reached over a single WebSocket, pushes its state as JSON objects, and
//! never acknowledges a write.  This crate keeps the session alive, mirrors
//! the pushed state locally, and turns every fire-and-forget write into a
//! "set and verify" call that reports whether the change actually took.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   ↕
//! [burner-client]
//!   ├── domain/           ClientConfig, Timings (TOML-backed)
//!   ├── application/
//!   │     ├── link         HeaterLink trait (the transport seam)
//!   │     ├── dispatcher   inbound frame → state mirror merge
//!   │     ├── verifier     refresh / fetch / set-and-verify
//!   │     └── heater_client  typed public API + validation
//!   └── infrastructure/
//!         ├── session      tokio-tungstenite connection + receive loop
//!         └── blocking     drive the async client from synchronous code
//!   ↕
//! heater (JSON over ws://host[:port])
//! ```
//!
//! # Example
//!
//! ```no_run
//! use burner_client::{new_client, ClientConfig};
//!
//! # async fn example() {
//! let client = new_client(&ClientConfig::for_endpoint("192.168.4.1"));
//! if client.connect().await {
//!     let ok = client.set_temp_desired(19).await;
//!     println!("set point accepted: {ok}");
//!     println!("ambient: {:?}", client.temp_current().await);
//!     client.close().await;
//! }
//! # }
//! ```

/// Domain layer: configuration types (no I/O beyond reading a TOML file).
pub mod domain;

/// Application layer: dispatching, verification and the public client API.
pub mod application;

/// Infrastructure layer: WebSocket session and the blocking bridge.
pub mod infrastructure;

pub use application::{HeaterClient, HeaterLink, SendError, SharedState};
pub use domain::{ClientConfig, ConfigError, Timings};
pub use infrastructure::{new_client, BlockingError, BlockingHeaterClient, Session, SessionError};

pub use burner_core::{ParamValue, Parameter, RunMode, ValidationError, VerificationOutcome};
