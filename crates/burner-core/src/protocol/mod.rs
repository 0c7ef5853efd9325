//! Protocol module containing the JSON frame codec.

pub mod frame;

pub use frame::{decode_frame, Command, ProtocolError};
