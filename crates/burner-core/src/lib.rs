//! # burner-core
//!
//! Shared library for the Afterburner heater client containing the parameter
//! vocabulary, the JSON frame codec, the local state mirror and the rules that
//! decide whether a configuration write took effect.
//!
//! It has zero dependencies on sockets, async runtimes or the file system.
//!
//! # Architecture overview
//!
//! The heater controller exposes a flat set of named numeric parameters over a
//! single WebSocket.  It never acknowledges a write; the only way to learn
//! whether `{"TempDesired": 19}` was accepted is to ask the device for its full
//! state again and look.  This crate holds everything about that exchange that
//! does not involve I/O:
//!
//! - **`protocol`** – How frames look on the wire.  Outbound commands are
//!   single-key JSON objects; inbound frames are JSON objects carrying a
//!   partial or full state snapshot.
//!
//! - **`domain`** – The parameter names, numeric values, the [`StateMirror`]
//!   that accumulates inbound snapshots, the [`VerificationRule`] table that
//!   maps a write key to the key and predicate used to confirm it, and the
//!   client-side input validation.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `burner_core::StateMirror` instead of `burner_core::domain::state::StateMirror`.
pub use domain::parameter::{Parameter, RunMode, UnknownParameter};
pub use domain::state::{render_value, StateMirror};
pub use domain::validation::{
    validate_command, validate_finite, validate_frost_on, validate_frost_rise, validate_run_mode,
    ValidationError,
};
pub use domain::value::ParamValue;
pub use domain::verification::{VerificationOutcome, VerificationRule};
pub use protocol::frame::{decode_frame, Command, ProtocolError};
