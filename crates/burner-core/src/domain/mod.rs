//! Domain entities for the heater client.
//!
//! Everything here is pure: no sockets, no timers, no file access.  Code in
//! the client crate's application and infrastructure layers depends on these
//! types, never the other way round.

/// The named parameters the heater exposes, plus the `Run` command mode.
pub mod parameter;

/// The local mirror of the device's last-known parameter values.
pub mod state;

/// Client-side range checks performed before any frame is sent.
pub mod validation;

/// Numeric parameter values as they travel on the wire.
pub mod value;

/// Rules that decide whether a write took effect.
pub mod verification;
