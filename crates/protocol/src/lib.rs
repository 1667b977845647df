//! Wire types for the DevTools protocol subset this service speaks.
//!
//! This crate contains the serde-serializable types used for communication
//! with a remote browser over the Chrome DevTools Protocol. These types
//! represent the "protocol layer" - the shapes of data as they appear on
//! the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with protocol: Match the DevTools domain schemas
//! * Stable: Changes only when the wire protocol changes
//!
//! Higher-level ergonomic APIs are built on top of these types in
//! `shutter-rs`.

pub mod emulation;
pub mod message;
pub mod page;
pub mod target;
pub mod version;

pub use emulation::*;
pub use message::*;
pub use page::*;
pub use target::*;
pub use version::*;
