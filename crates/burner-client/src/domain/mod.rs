//! Domain layer for burner-client.
//!
//! Holds the configuration structures shared by the session, the verifier and
//! the command-line tool.  Nothing here opens a socket or spawns a task.

pub mod config;

pub use config::{ClientConfig, ConfigError, Timings};
