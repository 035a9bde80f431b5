//! # Redbridge Core
//!
//! The connection adapter: typed Redis operations routed through a
//! [`NativeClient`] in either direct or pipelined mode.
//!
//! ## Modules
//!
//! - [`builder`] - Connection builder
//! - [`command`] - Command builders and reply converters
//! - [`config`] - Connection settings
//! - [`mode`] - Execution modes and pipeline eligibility
//! - [`scan`] - SCAN-family cursors
//! - [`sentinel`] - Sentinel administration
//! - [`validate`] - Argument checks
//!

use std::fmt;

use bytes::Bytes;
use tracing::{debug, instrument, warn};

pub use crate::proto::error::{Error, ErrorKind, Result};

/// Connection builder.
pub mod builder;
/// Command construction and reply conversion.
pub mod command;
mod commands;
/// Connection settings.
pub mod config;
/// Execution mode controller.
pub mod mode;
/// SCAN-family cursors.
pub mod scan;
/// Sentinel connections.
pub mod sentinel;
/// Shared value types.
pub mod types;
/// Argument validation.
pub mod validate;

use crate::core::command::Cmd;
use crate::core::config::SentinelConfig;
use crate::core::mode::{ExecutionMode, Operation, PipelineSupport};
use crate::core::sentinel::SentinelConnection;
use crate::core::types::{QueuedReply, Reply, Value};
use crate::native::{NativeClient, RespClient};
use crate::proto::frame::Frame;

type Converter = Box<dyn FnOnce(Frame) -> Result<Value>>;

/// A Redis connection exposing typed operations over a native client.
///
/// In [direct](ExecutionMode::Direct) mode every operation runs immediately
/// and returns [`Reply::Value`]. After [`open_pipeline`](Self::open_pipeline)
/// operations are queued and return [`Reply::Queued`]; their values are
/// produced, in order, by [`close_pipeline`](Self::close_pipeline).
/// Operations that cannot be queued fail with
/// [`Error::UnsupportedOperation`] without touching the native client.
///
/// # Example
///
/// ```no_run
/// use redbridge::ConnectionBuilder;
///
/// # fn main() -> redbridge::Result<()> {
/// let mut conn = ConnectionBuilder::new()
///     .address("redis://127.0.0.1:6379")
///     .connect()?;
///
/// conn.set("greeting", "hello")?.value()?;
///
/// conn.open_pipeline()?;
/// let _ = conn.incr("visits")?;
/// let _ = conn.get("greeting")?;
/// let results = conn.close_pipeline()?;
/// assert_eq!(results.len(), 2);
///
/// conn.close()?;
/// # Ok(())
/// # }
/// ```
pub struct RedisConnection<C: NativeClient = RespClient> {
    client: C,
    mode: ExecutionMode,
    pending: Vec<Converter>,
    sentinel: Option<SentinelConfig>,
    closed: bool,
}

impl<C: NativeClient> RedisConnection<C> {
    /// Wraps a native client. The connection starts in direct mode.
    pub fn new(client: C) -> Self {
        Self {
            client,
            mode: ExecutionMode::Direct,
            pending: Vec::new(),
            sentinel: None,
            closed: false,
        }
    }

    /// Attaches sentinel endpoints used by
    /// [`get_sentinel_connection`](Self::get_sentinel_connection).
    pub fn with_sentinel(mut self, sentinel: SentinelConfig) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// The native client this connection delegates to.
    pub fn native_client(&self) -> &C {
        &self.client
    }

    /// Current execution mode.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Returns true while commands are being queued.
    pub fn is_pipelined(&self) -> bool {
        self.mode == ExecutionMode::Pipelined
    }

    /// Returns true once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Switches to pipelined mode. Does nothing if already pipelined.
    pub fn open_pipeline(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.mode == ExecutionMode::Direct {
            self.mode = ExecutionMode::Pipelined;
            debug!("pipeline opened");
        }
        Ok(())
    }

    /// Sends every queued command and returns the resolved values in
    /// submission order, then switches back to direct mode.
    ///
    /// The outer error reports a transport failure; a server error for a
    /// single command appears as an inner `Err` at that command's index.
    /// Returns an empty list when called in direct mode.
    #[instrument(skip(self), fields(queued = self.pending.len()), level = "debug")]
    pub fn close_pipeline(&mut self) -> Result<Vec<Result<Value>>> {
        if self.mode == ExecutionMode::Direct {
            return Ok(Vec::new());
        }
        self.mode = ExecutionMode::Direct;
        let converters = std::mem::take(&mut self.pending);
        if converters.is_empty() {
            debug!("pipeline closed with no commands");
            return Ok(Vec::new());
        }

        let replies = self.native()?.sync()?;
        if replies.len() != converters.len() {
            return Err(Error::protocol(format!(
                "pipeline returned {} replies for {} commands",
                replies.len(),
                converters.len()
            )));
        }

        debug!(replies = replies.len(), "pipeline closed");
        Ok(replies
            .into_iter()
            .zip(converters)
            .map(|(reply, convert)| reply.and_then(convert))
            .collect())
    }

    /// Releases the native connection. Later calls are no-ops; later
    /// operations fail with [`Error::InvalidApiUsage`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.pending.is_empty() {
            warn!(
                discarded = self.pending.len(),
                "closing connection with queued commands"
            );
            self.pending.clear();
        }
        self.mode = ExecutionMode::Direct;
        debug!("releasing connection");
        self.client.quit()
    }

    /// Runs a command that has no typed wrapper.
    ///
    /// # Arguments
    ///
    /// * `name` - Command name, e.g. `"OBJECT"`.
    /// * `args` - Arguments following the name.
    pub fn execute<I, A>(&mut self, name: &str, args: I) -> Result<Reply<Value>>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("command name must not be empty"));
        }
        let cmd = Cmd::new(name.to_string()).args_from(args.into_iter().map(to_bytes));
        self.dispatch(Operation::Execute, cmd, command::frame_to_value)
    }

    /// Opens an administrative connection to the first reachable sentinel.
    ///
    /// Fails with [`Error::ResourceUsage`] when no sentinels are configured,
    /// without contacting any server.
    pub fn get_sentinel_connection(&self) -> Result<SentinelConnection<C>> {
        let sentinel = self.sentinel.as_ref().ok_or_else(|| Error::ResourceUsage {
            message: "no sentinels configured".to_string(),
        })?;
        self.ensure_open()?;

        for node in &sentinel.nodes {
            let mut client = match self.client.connect_sentinel(node) {
                Ok(client) => client,
                Err(e) => {
                    warn!(%node, error = %e, "sentinel unreachable");
                    continue;
                }
            };
            match client.execute(Cmd::new("PING")) {
                Ok(_) => {
                    debug!(%node, master = %sentinel.master_name, "connected to sentinel");
                    return Ok(SentinelConnection::new(client, node.clone()));
                }
                Err(e) => {
                    warn!(%node, error = %e, "sentinel did not answer PING");
                    let _ = client.quit();
                }
            }
        }

        Err(Error::ResourceUsage {
            message: format!(
                "no reachable sentinel for master {}",
                sentinel.master_name
            ),
        })
    }

    /// Runs `cmd` directly or queues it, converting the reply with `convert`.
    pub(crate) fn dispatch<T, F>(&mut self, op: Operation, cmd: Cmd, convert: F) -> Result<Reply<T>>
    where
        T: Into<Value> + 'static,
        F: FnOnce(Frame) -> Result<T> + 'static,
    {
        self.check_mode(op)?;
        match self.mode {
            ExecutionMode::Direct => {
                let frame = self.native()?.execute(cmd)?;
                convert(frame).map(Reply::Value)
            }
            ExecutionMode::Pipelined => {
                self.native()?.queue(cmd)?;
                let index = self.pending.len();
                self.pending
                    .push(Box::new(move |frame| convert(frame).map(Into::into)));
                Ok(Reply::Queued(QueuedReply::new(index)))
            }
        }
    }

    /// Runs an operation that never queues.
    pub(crate) fn direct<T, F>(&mut self, op: Operation, cmd: Cmd, convert: F) -> Result<T>
    where
        F: FnOnce(Frame) -> Result<T>,
    {
        let frame = self.direct_client(op)?.execute(cmd)?;
        convert(frame)
    }

    /// The native client, after checking that `op` may run in the current mode.
    pub(crate) fn direct_client(&mut self, op: Operation) -> Result<&mut C> {
        self.check_mode(op)?;
        self.native()
    }

    pub(crate) fn native(&mut self) -> Result<&mut C> {
        self.ensure_open()?;
        Ok(&mut self.client)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidApiUsage {
                message: "connection is closed".to_string(),
            });
        }
        Ok(())
    }

    fn check_mode(&self, op: Operation) -> Result<()> {
        self.ensure_open()?;
        if self.mode == ExecutionMode::Pipelined
            && op.pipeline_support() == PipelineSupport::Unsupported
        {
            return Err(Error::UnsupportedOperation {
                operation: op.name(),
                context: "in pipeline mode",
            });
        }
        Ok(())
    }
}

impl<C: NativeClient> fmt::Debug for RedisConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnection")
            .field("mode", &self.mode)
            .field("queued", &self.pending.len())
            .field("sentinel", &self.sentinel)
            .field("closed", &self.closed)
            .finish()
    }
}

#[inline]
pub(crate) fn to_bytes(value: impl AsRef<[u8]>) -> Bytes {
    Bytes::copy_from_slice(value.as_ref())
}
