use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::{debug, instrument, warn};

use crate::core::command::Cmd;
use crate::core::config::ConnectionConfig;
use crate::core::types::RedisNode;
use crate::native::connection::Connection;
use crate::native::NativeClient;
use crate::proto::frame::Frame;
use crate::{Error, Result};

/// Byte stream a [`RespClient`] can run over (plain TCP or TLS).
trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Blocking RESP2 client for one Redis server.
///
/// Each client owns a current-thread tokio runtime and drives its socket on
/// it, so calls block the caller until the reply arrives. It must not be
/// used from inside another async runtime.
///
/// # Example
///
/// ```no_run
/// use redbridge::core::config::ConnectionConfig;
/// use redbridge::native::{NativeClient, RespClient};
/// use redbridge::core::command::Cmd;
///
/// # fn main() -> redbridge::Result<()> {
/// let config = ConnectionConfig::from_url("redis://127.0.0.1:6379")?;
/// let mut client = RespClient::connect(config)?;
/// let pong = client.execute(Cmd::new("PING"))?;
/// client.quit()?;
/// # Ok(())
/// # }
/// ```
pub struct RespClient {
    runtime: Runtime,
    connection: Connection<Box<dyn Stream>>,
    config: ConnectionConfig,
    queued: usize,
    released: bool,
    broken: bool,
}

impl RespClient {
    /// Connects and performs the AUTH / SELECT / CLIENT SETNAME handshake.
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let connection = runtime.block_on(open(&config))?;
        debug!(node = %config.node, "connected");

        Ok(Self {
            runtime,
            connection,
            config,
            queued: 0,
            released: false,
            broken: false,
        })
    }

    /// The settings this client was opened with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Number of commands waiting for [`sync`](NativeClient::sync).
    pub fn queued(&self) -> usize {
        self.queued
    }

    /// Returns true once a transport, timeout or protocol failure left the
    /// stream at an unknown position. A broken client refuses further I/O.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.released {
            return Err(Error::InvalidApiUsage {
                message: format!("connection to {} was released", self.config.node),
            });
        }
        if self.broken {
            return Err(Error::InvalidApiUsage {
                message: format!(
                    "connection to {} is broken after a failed exchange; reconnect",
                    self.config.node
                ),
            });
        }
        Ok(())
    }

    /// Replies still in flight after these errors would be read as answers to
    /// later commands.
    fn check_stream<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !matches!(
                e,
                Error::Io { .. } | Error::Timeout { .. } | Error::Protocol { .. }
            ) {
                return result;
            }
            warn!(node = %self.config.node, error = %e, "marking connection broken");
            self.broken = true;
            self.queued = 0;
        }
        result
    }
}

impl NativeClient for RespClient {
    #[instrument(skip(self, cmd), fields(command = %cmd.name()), level = "debug")]
    fn execute(&mut self, cmd: Cmd) -> Result<Frame> {
        self.ensure_usable()?;
        if self.queued > 0 {
            return Err(Error::InvalidApiUsage {
                message: format!("{} commands are queued; sync the pipeline first", self.queued),
            });
        }
        let connection = &mut self.connection;
        let reply = self.runtime.block_on(async move {
            connection.send_command(cmd.args()).await?;
            connection.read_frame().await
        });
        self.check_stream(reply)?.into_result()
    }

    fn queue(&mut self, cmd: Cmd) -> Result<()> {
        self.ensure_usable()?;
        self.connection.buffer_command(cmd.args());
        self.queued += 1;
        Ok(())
    }

    #[instrument(skip(self), fields(queued = self.queued), level = "debug")]
    fn sync(&mut self) -> Result<Vec<Result<Frame>>> {
        self.ensure_usable()?;
        let expected = std::mem::take(&mut self.queued);
        let connection = &mut self.connection;
        let replies = self.runtime.block_on(async move {
            connection.flush().await?;
            let mut replies = Vec::with_capacity(expected);
            for _ in 0..expected {
                replies.push(connection.read_frame().await?.into_result());
            }
            Ok(replies)
        });
        self.check_stream(replies)
    }

    fn quit(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.queued = 0;
        let connection = &mut self.connection;
        if self.broken {
            if let Err(e) = self.runtime.block_on(connection.shutdown()) {
                debug!(node = %self.config.node, error = %e, "shutdown of broken connection failed");
            }
            debug!(node = %self.config.node, "broken connection released");
            return Ok(());
        }
        let result = self.runtime.block_on(async move {
            connection.send_command(Cmd::new("QUIT").args()).await?;
            let reply = connection.read_frame().await;
            connection.shutdown().await?;
            reply.and_then(Frame::into_result).map(|_| ())
        });
        match &result {
            Ok(()) => debug!(node = %self.config.node, "connection released"),
            Err(e) => warn!(node = %self.config.node, error = %e, "QUIT failed"),
        }
        result
    }

    fn connect_sentinel(&self, node: &RedisNode) -> Result<Self> {
        RespClient::connect(self.config.for_sentinel(node))
    }
}

impl fmt::Debug for RespClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RespClient")
            .field("node", &self.config.node)
            .field("connection", &self.connection)
            .field("queued", &self.queued)
            .field("released", &self.released)
            .field("broken", &self.broken)
            .finish()
    }
}

async fn open(config: &ConnectionConfig) -> Result<Connection<Box<dyn Stream>>> {
    let addr = config.node.to_string();
    let tcp = match config.connect_timeout {
        Some(limit) => tokio::time::timeout(limit, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::Timeout {
                millis: limit.as_millis() as u64,
            })??,
        None => TcpStream::connect(&addr).await?,
    };
    tcp.set_nodelay(true)?;

    let stream: Box<dyn Stream> = if config.tls {
        upgrade_tls(&config.node.host, tcp).await?
    } else {
        Box::new(tcp)
    };

    let mut connection =
        Connection::new(stream).with_timeouts(config.read_timeout, config.write_timeout);
    handshake(&mut connection, config).await?;
    Ok(connection)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "tls")] {
        async fn upgrade_tls(host: &str, tcp: TcpStream) -> Result<Box<dyn Stream>> {
            let tls = crate::native::TlsConnectorInner::new().connect(host, tcp).await?;
            Ok(Box::new(tls))
        }
    } else {
        async fn upgrade_tls(_host: &str, _tcp: TcpStream) -> Result<Box<dyn Stream>> {
            Err(Error::invalid_argument(
                "rediss:// requires the `tls` feature",
            ))
        }
    }
}

async fn handshake<S>(connection: &mut Connection<S>, config: &ConnectionConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Some(password) = &config.password {
        let mut auth = Cmd::new("AUTH");
        if let Some(username) = &config.username {
            auth = auth.arg(username.clone());
        }
        let auth = auth.arg(password.clone());
        if round_trip(connection, auth).await?.is_error() {
            return Err(Error::Auth);
        }
    }

    if let Some(db) = config.database {
        round_trip(connection, Cmd::new("SELECT").int_arg(db))
            .await?
            .into_result()?;
    }

    if let Some(name) = &config.client_name {
        round_trip(connection, Cmd::new("CLIENT").arg("SETNAME").arg(name.clone()))
            .await?
            .into_result()?;
    }

    Ok(())
}

async fn round_trip<S>(connection: &mut Connection<S>, cmd: Cmd) -> Result<Frame>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    connection.send_command(cmd.args()).await?;
    connection.read_frame().await
}
