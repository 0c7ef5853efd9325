//! burner-sim library crate.
//!
//! A loopback stand-in for an Afterburner heater's WebSocket interface.  It
//! speaks the same JSON frames as the real controller: it pushes its full
//! state on `{"Refresh": 1}`, applies single-key writes, moves `RunState`
//! some time after `{"Run": n}`, and answers anything it cannot parse with a
//! plain-text diagnostic.
//!
//! A [`WritePolicy`] makes it ignore or skew writes so the client's
//! verification failures can be exercised.
//!
//! # Example
//!
//! ```no_run
//! use burner_sim::{DeviceSimulator, SimConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let sim = DeviceSimulator::start(SimConfig::default()).await?;
//! println!("connect to ws://{}", sim.endpoint());
//! sim.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{DeviceModel, Reaction};
pub use domain::{default_initial_state, SimConfig, WritePolicy};
pub use infrastructure::DeviceSimulator;
