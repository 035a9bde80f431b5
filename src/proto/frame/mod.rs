//! RESP frame types.
//!
//! Simple strings, errors, integers, bulk strings and arrays as they travel
//! between the native client and the server.

/// Frame type definitions.
pub mod types;

pub use types::Frame;
