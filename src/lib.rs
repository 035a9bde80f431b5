//! # Redbridge
//!
//! A Redis connection adapter: typed key-value, set, sorted-set, hash and
//! server-administration operations translated into calls on a native
//! client, with direct and pipelined execution and SCAN cursors that
//! release their connection exactly once.
//!
//! ## Features
//!
//! - `tls` - TLS/SSL support for `rediss://` addresses
//!
//! ## Example
//!
//! ```no_run
//! use redbridge::{ConnectionBuilder, ScanOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = ConnectionBuilder::new()
//!         .address("redis://localhost:6379")
//!         .connect()?;
//!
//!     conn.set("user:1", "alice")?.value()?;
//!     let name = conn.get("user:1")?.value()?;
//!     assert_eq!(name.as_deref(), Some(&b"alice"[..]));
//!
//!     let mut cursor = conn.scan(ScanOptions::new().pattern("user:*"))?;
//!     while cursor.has_next()? {
//!         if let Some(key) = cursor.next() {
//!             println!("{:?}", key?);
//!         }
//!     }
//!     cursor.close()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod core;
pub mod native;
pub mod proto;

pub use crate::core::builder::ConnectionBuilder;
pub use crate::core::config::{ConnectionConfig, SentinelConfig};
pub use crate::core::mode::{ExecutionMode, Operation, PipelineSupport};
pub use crate::core::scan::{ScanCursor, ScanOptions};
pub use crate::core::sentinel::{RedisServer, SentinelConnection};
pub use crate::core::types::{QueuedReply, RedisNode, Reply, ScoredMember, ShutdownOption, Value};
pub use crate::core::{Error, ErrorKind, RedisConnection, Result};
pub use crate::native::{NativeClient, RespClient, ScanPage};
