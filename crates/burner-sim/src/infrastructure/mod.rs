//! Infrastructure layer for burner-sim: the WebSocket server.

pub mod server;

pub use server::DeviceSimulator;
