//! Client configuration.
//!
//! [`ClientConfig`] names the heater's address and the fixed delays the
//! session and verifier use.  It can be built in code, loaded from a TOML
//! file, or overlaid from command-line arguments by the `burner` binary.
//!
//! ```toml
//! endpoint = "192.168.4.1"
//!
//! [timings]
//! recv_timeout_ms = 1500
//! idle_sleep_ms = 3000
//! refresh_delay_ms = 2500
//! run_settle_delay_ms = 5000
//! io_timeout_ms = 5000
//! ```
//!
//! Every timing field has a serde default, so a file containing only
//! `endpoint = "..."` is complete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Everything the client needs to reach and talk to one heater.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host` or `host:port` of the heater; the client connects to
    /// `ws://{endpoint}`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Fixed delays used by the receive loop and the verifier.
    #[serde(default)]
    pub timings: Timings,
}

/// Fixed delays, in milliseconds.
///
/// The defaults match what the heater firmware needs in practice; tests use
/// much shorter values against the local simulator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timings {
    /// How long the receive loop waits for a frame before idling.
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,
    /// How long the receive loop idles after a quiet period.
    #[serde(default = "default_idle_sleep_ms")]
    pub idle_sleep_ms: u64,
    /// How long `refresh` waits for the device to push its state.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
    /// Extra wait before verifying a run-mode change.
    #[serde(default = "default_run_settle_delay_ms")]
    pub run_settle_delay_ms: u64,
    /// Upper bound on opening the connection, sending one frame, or the
    /// close handshake.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

impl Timings {
    /// Per-iteration receive timeout.
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    /// Idle sleep after a receive timeout.
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    /// Wait after sending `{"Refresh": 1}`.
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Wait before the `RunState` read that verifies a `Run` write.
    pub fn run_settle_delay(&self) -> Duration {
        Duration::from_millis(self.run_settle_delay_ms)
    }

    /// Limit on a single connect, send or close.
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_endpoint() -> String {
    "192.168.4.1".to_string()
}
fn default_recv_timeout_ms() -> u64 {
    1_500
}
fn default_idle_sleep_ms() -> u64 {
    3_000
}
fn default_refresh_delay_ms() -> u64 {
    2_500
}
fn default_run_settle_delay_ms() -> u64 {
    5_000
}
fn default_io_timeout_ms() -> u64 {
    5_000
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            recv_timeout_ms: default_recv_timeout_ms(),
            idle_sleep_ms: default_idle_sleep_ms(),
            refresh_delay_ms: default_refresh_delay_ms(),
            run_settle_delay_ms: default_run_settle_delay_ms(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timings: Timings::default(),
        }
    }
}

impl ClientConfig {
    /// Default timings against the given endpoint.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timings: Timings::default(),
        }
    }

    /// The WebSocket URI the session connects to.
    pub fn uri(&self) -> String {
        format!("ws://{}", self.endpoint)
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
