//! Application layer for burner-sim: the simulated heater's behaviour,
//! independent of sockets.

pub mod device;

pub use device::{DeviceModel, Reaction};
