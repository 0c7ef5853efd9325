//! Domain layer for burner-sim.
//!
//! Plain configuration types with no I/O.  The binary fills them from the
//! command line; tests build them directly.

pub mod config;

pub use config::{default_initial_state, SimConfig, WritePolicy};
