//! Synchronous facade over [`HeaterClient`].
//!
//! [`BlockingHeaterClient`] owns a small dedicated tokio runtime.  The
//! receive loop lives on the runtime's worker thread, so inbound frames keep
//! being merged while the caller's thread is doing something else.  Every
//! method blocks the calling thread until the async operation finishes.
//!
//! Must not be created or used from inside another tokio runtime: blocking
//! a runtime thread on a second runtime panics.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use burner_core::{ParamValue, Parameter, ValidationError, VerificationOutcome};

use crate::application::HeaterClient;
use crate::domain::config::ClientConfig;

use super::new_client;

/// Errors surfaced by the blocking facade.
#[derive(Debug, Error)]
pub enum BlockingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to start the client runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Blocking heater client.
pub struct BlockingHeaterClient {
    // Field order matters: the client (and its session) drops before the
    // runtime that its receive loop runs on.
    client: Arc<HeaterClient>,
    runtime: Runtime,
}

impl BlockingHeaterClient {
    /// Builds a blocking client for `config`.  Does not connect.
    ///
    /// # Errors
    ///
    /// Returns [`BlockingError::Runtime`] if the worker thread cannot be
    /// started.
    pub fn new(config: &ClientConfig) -> Result<Self, BlockingError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("burner-worker")
            .enable_all()
            .build()?;
        Ok(Self {
            client: Arc::new(new_client(config)),
            runtime,
        })
    }

    /// Shortcut for [`ClientConfig::for_endpoint`] + [`BlockingHeaterClient::new`].
    pub fn for_endpoint(endpoint: impl Into<String>) -> Result<Self, BlockingError> {
        Self::new(&ClientConfig::for_endpoint(endpoint))
    }

    pub fn connect(&self) -> bool {
        self.runtime.block_on(self.client.connect())
    }

    pub fn close(&self) -> bool {
        self.runtime.block_on(self.client.close())
    }

    pub fn is_alive(&self) -> bool {
        self.client.is_alive()
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn refresh(&self) {
        self.runtime.block_on(self.client.refresh())
    }

    pub fn fetch(&self, key: &str, with_refresh: bool) -> Option<String> {
        self.runtime.block_on(self.client.fetch(key, with_refresh))
    }

    pub fn fetch_value(&self, key: &str, with_refresh: bool) -> Option<Value> {
        self.runtime.block_on(self.client.fetch_value(key, with_refresh))
    }

    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.runtime.block_on(self.client.snapshot())
    }

    pub fn get_f64(&self, parameter: Parameter) -> Option<f64> {
        self.runtime.block_on(self.client.get_f64(parameter))
    }

    pub fn get_i64(&self, parameter: Parameter) -> Option<i64> {
        self.runtime.block_on(self.client.get_i64(parameter))
    }

    pub fn temp_current(&self) -> Option<f64> {
        self.runtime.block_on(self.client.temp_current())
    }

    pub fn temp_body(&self) -> Option<f64> {
        self.runtime.block_on(self.client.temp_body())
    }

    pub fn temp_desired(&self) -> Option<f64> {
        self.runtime.block_on(self.client.temp_desired())
    }

    pub fn run_state(&self) -> Option<i64> {
        self.runtime.block_on(self.client.run_state())
    }

    pub fn pump_count(&self) -> Option<i64> {
        self.runtime.block_on(self.client.pump_count())
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    pub fn set_config(&self, key: &str, value: impl Into<ParamValue>) -> bool {
        self.runtime.block_on(self.client.set_config(key, value))
    }

    /// # Errors
    ///
    /// Returns [`BlockingError::Validation`] if the value fails the checks
    /// for `key`; nothing is sent.
    pub fn set_config_outcome(
        &self,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<VerificationOutcome, BlockingError> {
        Ok(self
            .runtime
            .block_on(self.client.set_config_outcome(key, value))?)
    }

    pub fn set_temp_desired(&self, temperature: i64) -> bool {
        self.runtime.block_on(self.client.set_temp_desired(temperature))
    }

    /// # Errors
    ///
    /// Returns [`BlockingError::Validation`] for a mode other than 0 or 1;
    /// nothing is sent.
    pub fn set_run_mode(&self, mode: i64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_run_mode(mode))?)
    }

    pub fn set_fan_min(&self, fan_min: i64) -> bool {
        self.runtime.block_on(self.client.set_fan_min(fan_min))
    }

    pub fn set_fan_max(&self, fan_max: i64) -> bool {
        self.runtime.block_on(self.client.set_fan_max(fan_max))
    }

    pub fn set_pump_reset(&self) -> bool {
        self.runtime.block_on(self.client.set_pump_reset())
    }

    /// # Errors
    ///
    /// The float setters return [`BlockingError::Validation`] for NaN or
    /// infinity; nothing is sent.
    pub fn set_pump_min(&self, pump_min: f64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_pump_min(pump_min))?)
    }

    pub fn set_pump_max(&self, pump_max: f64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_pump_max(pump_max))?)
    }

    pub fn set_pump_cal(&self, pump_cal: f64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_pump_cal(pump_cal))?)
    }

    pub fn set_low_volt_cutout(&self, low_volt_cutout: f64) -> Result<bool, BlockingError> {
        Ok(self
            .runtime
            .block_on(self.client.set_low_volt_cutout(low_volt_cutout))?)
    }

    /// # Errors
    ///
    /// Returns [`BlockingError::Validation`] outside 0 to 30; nothing is sent.
    pub fn set_frost_on(&self, start_temp: f64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_frost_on(start_temp))?)
    }

    /// # Errors
    ///
    /// Returns [`BlockingError::Validation`] outside -30 to 30; nothing is
    /// sent.
    pub fn set_frost_rise(&self, temp_rise: f64) -> Result<bool, BlockingError> {
        Ok(self.runtime.block_on(self.client.set_frost_rise(temp_rise))?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
