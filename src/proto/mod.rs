//! RESP (Redis Serialization Protocol) support used by the native client.
//!
//! ## Modules
//!
//! - [`codec`] - Encoder and decoder for RESP protocol
//! - [`error`] - Crate-wide error type
//! - [`frame`] - Frame types representing RESP data structures

pub mod codec;
/// Error types.
pub mod error;
pub mod frame;
