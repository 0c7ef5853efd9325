//! The public client API.
//!
//! [`HeaterClient`] is what callers hold.  Each typed setter is a thin
//! single-key wrapper over [`CommandVerifier::set_config`].  Setters that
//! take a run mode or a float check their input first and return a
//! [`ValidationError`] without touching the network.  The generic
//! [`HeaterClient::set_config`] applies the same checks to whatever key it
//! is given.
//!
//! Every other failure (no connection, lost frame, device ignoring the
//! write) comes back as `false` or `None`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use burner_core::{
    validate_command, validate_finite, validate_frost_on, validate_frost_rise, validate_run_mode,
    Command, ParamValue, Parameter, ValidationError, VerificationOutcome,
};

use crate::application::dispatcher::SharedState;
use crate::application::link::HeaterLink;
use crate::application::verifier::CommandVerifier;
use crate::domain::config::Timings;

/// Async client for one heater.
#[derive(Clone)]
pub struct HeaterClient {
    link: Arc<dyn HeaterLink>,
    state: SharedState,
    verifier: CommandVerifier,
}

impl HeaterClient {
    /// Assembles a client from a link and the mirror that link's receive
    /// loop writes into.
    ///
    /// Most callers want [`crate::new_client`], which builds the WebSocket
    /// session for them.
    pub fn with_link(link: Arc<dyn HeaterLink>, state: SharedState, timings: Timings) -> Self {
        let verifier = CommandVerifier::new(Arc::clone(&link), Arc::clone(&state), timings);
        Self {
            link,
            state,
            verifier,
        }
    }

    // ── Session lifecycle ─────────────────────────────────────────────────────

    /// Opens the connection.  Returns `false` (and logs) on failure.
    pub async fn connect(&self) -> bool {
        self.link.connect().await
    }

    /// Closes the connection.  Returns `false` (and logs) if there was
    /// nothing to close or the close failed.
    pub async fn close(&self) -> bool {
        self.link.close().await
    }

    /// Whether the session believes its connection is usable.
    pub fn is_alive(&self) -> bool {
        self.link.is_alive()
    }

    // ── Read side ─────────────────────────────────────────────────────────────

    /// Asks the device to push its full state and waits for it.
    pub async fn refresh(&self) {
        self.verifier.refresh().await;
    }

    /// Last-known value of `key` as text, optionally refreshing first.
    pub async fn fetch(&self, key: &str, with_refresh: bool) -> Option<String> {
        self.verifier.fetch(key, with_refresh).await
    }

    /// Last-known raw value of `key`, optionally refreshing first.
    pub async fn fetch_value(&self, key: &str, with_refresh: bool) -> Option<Value> {
        self.verifier.fetch_value(key, with_refresh).await
    }

    /// Copy of the whole state mirror.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.state.read().await.snapshot()
    }

    /// Numeric view of a known parameter, without refreshing.
    pub async fn get_f64(&self, parameter: Parameter) -> Option<f64> {
        self.state.read().await.get_f64(parameter.as_str())
    }

    /// Integer view of a known parameter, without refreshing.
    pub async fn get_i64(&self, parameter: Parameter) -> Option<i64> {
        self.state.read().await.get_i64(parameter.as_str())
    }

    /// Ambient temperature.
    pub async fn temp_current(&self) -> Option<f64> {
        self.get_f64(Parameter::TempCurrent).await
    }

    /// Heat exchanger body temperature.
    pub async fn temp_body(&self) -> Option<f64> {
        self.get_f64(Parameter::TempBody).await
    }

    /// Thermostat set point.
    pub async fn temp_desired(&self) -> Option<f64> {
        self.get_f64(Parameter::TempDesired).await
    }

    /// Run-state code (7 stopped, 9 running).
    pub async fn run_state(&self) -> Option<i64> {
        self.get_i64(Parameter::RunState).await
    }

    /// Fuel pump stroke counter.
    pub async fn pump_count(&self) -> Option<i64> {
        self.get_i64(Parameter::PumpCount).await
    }

    // ── Write side ────────────────────────────────────────────────────────────

    /// Writes `key = value` and verifies it took effect.
    ///
    /// A value that fails validation (a `Run` other than 0 or 1, a frost
    /// value out of range, NaN or infinity) is logged and reported as
    /// `false` without sending anything.
    pub async fn set_config(&self, key: &str, value: impl Into<ParamValue>) -> bool {
        match self.set_config_outcome(key, value).await {
            Ok(outcome) => outcome.is_confirmed(),
            Err(e) => {
                error!("not sending {key}: {e}");
                false
            }
        }
    }

    /// Like [`HeaterClient::set_config`] but returns the full outcome, so a
    /// caller can tell a mismatch from a key the device never reported.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the value fails the checks for
    /// `key`; no frame is sent.
    pub async fn set_config_outcome(
        &self,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<VerificationOutcome, ValidationError> {
        let value = validate_command(key, value.into())?;
        Ok(self
            .verifier
            .set_config_outcome(&Command::new(key, value))
            .await)
    }

    async fn set(&self, parameter: Parameter, value: impl Into<ParamValue>) -> bool {
        self.verifier
            .set_config(&Command::set(parameter, value))
            .await
    }

    /// Sets the thermostat set point.
    pub async fn set_temp_desired(&self, temperature: i64) -> bool {
        self.set(Parameter::TempDesired, temperature).await
    }

    /// Starts (1) or stops (0) the heater.
    ///
    /// Confirmed when `RunState` reads 9 after a start or 7 after a stop.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRunMode`] for any other value; no
    /// frame is sent.
    pub async fn set_run_mode(&self, mode: i64) -> Result<bool, ValidationError> {
        let mode = validate_run_mode(mode)?;
        Ok(self.verifier.set_config(&Command::run(mode)).await)
    }

    /// Sets the minimum blower speed.
    pub async fn set_fan_min(&self, fan_min: i64) -> bool {
        self.set(Parameter::FanMin, fan_min).await
    }

    /// Sets the maximum blower speed.
    pub async fn set_fan_max(&self, fan_max: i64) -> bool {
        self.set(Parameter::FanMax, fan_max).await
    }

    /// Resets the fuel pump stroke counter to zero.
    pub async fn set_pump_reset(&self) -> bool {
        self.set(Parameter::PumpCount, 0).await
    }

    /// Sets the minimum fuel pump rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFinite`] for NaN or infinity; no frame
    /// is sent.
    pub async fn set_pump_min(&self, pump_min: f64) -> Result<bool, ValidationError> {
        let pump_min = validate_finite(Parameter::PumpMin.as_str(), pump_min)?;
        Ok(self.set(Parameter::PumpMin, pump_min).await)
    }

    /// Sets the maximum fuel pump rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFinite`] for NaN or infinity; no frame
    /// is sent.
    pub async fn set_pump_max(&self, pump_max: f64) -> Result<bool, ValidationError> {
        let pump_max = validate_finite(Parameter::PumpMax.as_str(), pump_max)?;
        Ok(self.set(Parameter::PumpMax, pump_max).await)
    }

    /// Sets the fuel pump calibration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFinite`] for NaN or infinity; no frame
    /// is sent.
    pub async fn set_pump_cal(&self, pump_cal: f64) -> Result<bool, ValidationError> {
        let pump_cal = validate_finite(Parameter::PumpCal.as_str(), pump_cal)?;
        Ok(self.set(Parameter::PumpCal, pump_cal).await)
    }

    /// Sets the low-voltage cutout.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFinite`] for NaN or infinity; no frame
    /// is sent.
    pub async fn set_low_volt_cutout(
        &self,
        low_volt_cutout: f64,
    ) -> Result<bool, ValidationError> {
        let low_volt_cutout = validate_finite(Parameter::LowVoltCutout.as_str(), low_volt_cutout)?;
        Ok(self.set(Parameter::LowVoltCutout, low_volt_cutout).await)
    }

    /// Sets the frost-mode start temperature (0 to 30 inclusive).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] outside that range; no frame is sent.
    pub async fn set_frost_on(&self, start_temp: f64) -> Result<bool, ValidationError> {
        let start_temp = validate_frost_on(start_temp)?;
        Ok(self.set(Parameter::FrostOn, start_temp).await)
    }

    /// Sets the frost-mode temperature rise (-30 to +30 inclusive).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] outside that range; no frame is sent.
    pub async fn set_frost_rise(&self, temp_rise: f64) -> Result<bool, ValidationError> {
        let temp_rise = validate_frost_rise(temp_rise)?;
        Ok(self.set(Parameter::FrostRise, temp_rise).await)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::always;
    use serde_json::{json, Map};
    use tokio::sync::RwLock;
    use tokio_test::{assert_err, assert_ok};

    use burner_core::StateMirror;

    use crate::application::link::MockHeaterLink;

    fn fast_timings() -> Timings {
        Timings {
            recv_timeout_ms: 10,
            idle_sleep_ms: 5,
            refresh_delay_ms: 1,
            run_settle_delay_ms: 1,
            io_timeout_ms: 100,
        }
    }

    fn client_with(mock: MockHeaterLink) -> (HeaterClient, SharedState) {
        let state: SharedState = Arc::new(RwLock::new(StateMirror::new()));
        let client = HeaterClient::with_link(Arc::new(mock), Arc::clone(&state), fast_timings());
        (client, state)
    }

    async fn seed(state: &SharedState, v: Value) {
        if let Value::Object(m) = v {
            state.write().await.merge(m);
        }
    }

    #[tokio::test]
    async fn test_invalid_run_mode_sends_nothing() {
        // Arrange: any call to send fails the test.
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, _state) = client_with(mock);

        // Act
        let result = client.set_run_mode(2).await;

        // Assert
        assert_eq!(result, Err(ValidationError::InvalidRunMode(2)));
    }

    #[tokio::test]
    async fn test_out_of_range_frost_values_send_nothing() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, _state) = client_with(mock);

        assert_err!(client.set_frost_on(31.0).await);
        assert_err!(client.set_frost_on(-1.0).await);
        assert_err!(client.set_frost_rise(-31.0).await);
        assert_err!(client.set_frost_rise(f64::NAN).await);
    }

    #[tokio::test]
    async fn test_valid_run_mode_sends_run_then_refresh() {
        // Arrange
        let mut mock = MockHeaterLink::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Run" && c.value() == ParamValue::Int(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Refresh")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        seed(&state, json!({"RunState": 9})).await;

        // Act
        let result = client.set_run_mode(1).await;

        // Assert
        assert_eq!(assert_ok!(result), true);
    }

    #[tokio::test]
    async fn test_frost_on_in_range_is_sent_as_float() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send()
            .withf(|c: &Command| c.key() == "FrostOn" && c.value() == ParamValue::Float(1.1))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Refresh")
            .returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        seed(&state, json!({"FrostOn": 1.1})).await;

        assert_eq!(client.set_frost_on(1.1).await, Ok(true));
    }

    #[tokio::test]
    async fn test_pump_reset_writes_zero_pump_count() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send()
            .withf(|c: &Command| c.key() == "PumpCount" && c.value() == ParamValue::Int(0))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Refresh")
            .returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        seed(&state, json!({"PumpCount": 0})).await;

        assert!(client.set_pump_reset().await);
    }

    #[tokio::test]
    async fn test_typed_getters_read_the_mirror() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, state) = client_with(mock);
        seed(
            &state,
            json!({"TempCurrent": 10.1, "TempBody": 45, "RunState": 7, "PumpCount": 1200}),
        )
        .await;

        assert_eq!(client.temp_current().await, Some(10.1));
        assert_eq!(client.temp_body().await, Some(45.0));
        assert_eq!(client.run_state().await, Some(7));
        assert_eq!(client.pump_count().await, Some(1200));
        assert_eq!(client.temp_desired().await, None);
    }

    #[tokio::test]
    async fn test_snapshot_copies_mirror() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, state) = client_with(mock);
        seed(&state, json!({"FanMin": 1680, "FanMax": 4500})).await;

        let snap = client.snapshot().await;

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("FanMax"), Some(&json!(4500)));
    }

    #[tokio::test]
    async fn test_lifecycle_delegates_to_link() {
        let mut mock = MockHeaterLink::new();
        mock.expect_connect().times(1).returning(|| true);
        mock.expect_is_alive().times(1).returning(|| true);
        mock.expect_close().times(1).returning(|| true);
        let (client, _state) = client_with(mock);

        assert!(client.connect().await);
        assert!(client.is_alive());
        assert!(client.close().await);
    }

    #[tokio::test]
    async fn test_set_config_reports_false_when_link_is_down() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send()
            .with(always())
            .returning(|_| Err(crate::application::link::SendError::NotConnected));
        let (client, _state) = client_with(mock);

        assert!(!client.set_temp_desired(19).await);
        assert_eq!(
            client.set_config_outcome("FanMin", 1750).await,
            Ok(VerificationOutcome::Missing)
        );
    }

    #[tokio::test]
    async fn test_unknown_key_can_be_written() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send().returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        let mut update = Map::new();
        update.insert("ThermostatMode".to_string(), json!(2));
        state.write().await.merge(update);

        assert!(client.set_config("ThermostatMode", 2).await);
    }

    #[tokio::test]
    async fn test_non_finite_pump_values_send_nothing() {
        // Arrange: not even a refresh may go out.
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, _state) = client_with(mock);

        // Act
        let result = client.set_pump_cal(f64::NAN).await;

        // Assert
        assert_eq!(
            result,
            Err(ValidationError::NonFinite {
                parameter: "PumpCal".to_string()
            })
        );
        assert_err!(client.set_pump_min(f64::INFINITY).await);
        assert_err!(client.set_pump_max(f64::NEG_INFINITY).await);
        assert_err!(client.set_low_volt_cutout(f64::NAN).await);
    }

    #[tokio::test]
    async fn test_finite_pump_cal_is_sent_and_verified() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send()
            .withf(|c: &Command| c.key() == "PumpCal" && c.value() == ParamValue::Float(0.035))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Refresh")
            .returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        seed(&state, json!({"PumpCal": 0.035})).await;

        assert_eq!(client.set_pump_cal(0.035).await, Ok(true));
    }

    #[tokio::test]
    async fn test_generic_run_write_is_validated() {
        // Arrange
        let mut mock = MockHeaterLink::new();
        mock.expect_send().never();
        let (client, _state) = client_with(mock);

        // Act / Assert: the untyped path enforces the same limits.
        assert!(!client.set_config("Run", 2).await);
        assert_eq!(
            client.set_config_outcome("Run", 2).await,
            Err(ValidationError::InvalidRunMode(2))
        );
        assert!(!client.set_config("FrostOn", 45.0).await);
        assert!(!client.set_config("TempDesired", f64::NAN).await);
    }

    #[tokio::test]
    async fn test_generic_run_write_sends_integer_mode() {
        let mut mock = MockHeaterLink::new();
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Run" && c.value() == ParamValue::Int(0))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_send()
            .withf(|c: &Command| c.key() == "Refresh")
            .returning(|_| Ok(()));
        let (client, state) = client_with(mock);
        seed(&state, json!({"RunState": 7})).await;

        assert!(client.set_config("Run", 0.0).await);
    }
}
