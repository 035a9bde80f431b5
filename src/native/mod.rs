//! The native client capability the connection adapter is built on.
//!
//! [`NativeClient`] is the seam between the database-agnostic command API and
//! the wire. [`RespClient`] is the production implementation; tests substitute
//! their own recording implementation.

use bytes::Bytes;

use crate::core::command::{self, Cmd};
use crate::core::scan::ScanOptions;
use crate::core::types::{RedisNode, ScoredMember};
use crate::proto::frame::Frame;
use crate::Result;

/// RESP client over TCP or TLS.
pub mod client;
/// Framed async connection.
pub mod connection;

cfg_if::cfg_if! {
    if #[cfg(feature = "tls")] {
        mod tls;
        pub use tls::TlsConnectorInner;
    }
}

pub use client::RespClient;

/// One page of a SCAN-family reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage<T> {
    /// Cursor token to pass on the next call; `"0"` once iteration is done.
    pub cursor: String,
    /// Elements returned with this page.
    pub items: Vec<T>,
}

impl<T> ScanPage<T> {
    /// Returns true if the server reported the end of the iteration.
    pub fn is_last(&self) -> bool {
        self.cursor == "0"
    }
}

/// Blocking command execution against a single Redis server.
///
/// Implementations report server error replies as [`crate::Error::Server`]
/// from [`execute`](NativeClient::execute) and per entry from
/// [`sync`](NativeClient::sync). The scripting and scan-family methods have
/// default implementations on top of `execute`.
pub trait NativeClient {
    /// Sends one command and waits for its reply.
    fn execute(&mut self, cmd: Cmd) -> Result<Frame>;

    /// Adds a command to the pending pipeline without waiting for a reply.
    fn queue(&mut self, cmd: Cmd) -> Result<()>;

    /// Sends every queued command and returns their replies in order.
    fn sync(&mut self) -> Result<Vec<Result<Frame>>>;

    /// Releases the underlying connection.
    fn quit(&mut self) -> Result<()>;

    /// Opens a client to a sentinel node, reusing this client's credentials
    /// and timeouts.
    fn connect_sentinel(&self, node: &RedisNode) -> Result<Self>
    where
        Self: Sized;

    /// Runs a Lua script.
    fn eval(&mut self, script: &[u8], keys: &[Bytes], args: &[Bytes]) -> Result<Frame> {
        self.execute(command::eval(script, keys, args))
    }

    /// Fetches one page of keys.
    fn scan(&mut self, cursor: &str, options: &ScanOptions) -> Result<ScanPage<Bytes>> {
        let frame = self.execute(command::scan(cursor, options))?;
        command::frame_to_value_page(frame)
    }

    /// Fetches one page of set members.
    fn sscan(&mut self, key: &[u8], cursor: &str, options: &ScanOptions) -> Result<ScanPage<Bytes>> {
        let frame = self.execute(command::key_scan("SSCAN", key, cursor, options))?;
        command::frame_to_value_page(frame)
    }

    /// Fetches one page of hash entries.
    fn hscan(
        &mut self,
        key: &[u8],
        cursor: &str,
        options: &ScanOptions,
    ) -> Result<ScanPage<(Bytes, Bytes)>> {
        let frame = self.execute(command::key_scan("HSCAN", key, cursor, options))?;
        command::frame_to_entry_page(frame)
    }

    /// Fetches one page of sorted-set members.
    fn zscan(
        &mut self,
        key: &[u8],
        cursor: &str,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredMember>> {
        let frame = self.execute(command::key_scan("ZSCAN", key, cursor, options))?;
        command::frame_to_scored_page(frame)
    }
}
