//! Browser connection lifecycle.
//!
//! Owns everything between the capture pipeline and the wire: WebSocket
//! transport, command/response correlation, event routing, and DevTools
//! endpoint discovery. The ergonomic capability layer in `shutter-rs` is
//! built on top of this crate.

pub mod connection;
pub mod error;
pub mod probe;
pub mod testing;
pub mod transport;

pub use connection::Connection;
pub use error::{Result, RuntimeError};
pub use transport::TransportParts;
