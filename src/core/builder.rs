use std::time::Duration;

use crate::core::config::{parse_node, ConnectionConfig, SentinelConfig, DEFAULT_SENTINEL_PORT};
use crate::native::{NativeClient, RespClient};
use crate::{Error, RedisConnection};

/// Builder for configuring and opening a [`RedisConnection`].
///
/// # Example
///
/// ```no_run
/// use redbridge::ConnectionBuilder;
///
/// # fn main() -> redbridge::Result<()> {
/// let conn = ConnectionBuilder::new()
///     .address("redis://localhost:6379")
///     .password("secret")
///     .database(0)
///     .sentinel("mymaster", ["10.0.0.1:26379", "10.0.0.2"])
///     .connect()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConnectionBuilder {
    address: Option<String>,
    password: Option<String>,
    username: Option<String>,
    database: Option<u8>,
    client_name: Option<String>,
    connection_timeout: Option<Duration>,
    read_timeout: Option<Option<Duration>>,
    write_timeout: Option<Duration>,
    tls: Option<bool>,
    sentinel_master: Option<String>,
    sentinel_nodes: Vec<String>,
}

impl ConnectionBuilder {
    /// Creates a new [`ConnectionBuilder`] instance.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Redis server address.
    ///
    /// # Arguments
    ///
    /// * `address` - Redis address in format `redis://host:port` or `rediss://host:port` for TLS
    #[inline]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the password for authentication, overriding one in the address.
    #[inline]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the username for ACL authentication.
    #[inline]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the Redis database number to select after connection.
    ///
    /// # Arguments
    ///
    /// * `database` - Database number (0-15)
    #[inline]
    pub fn database(mut self, database: u8) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the client connection name.
    ///
    /// # Arguments
    ///
    /// * `name` - Client name displayed in `CLIENT LIST`
    #[inline]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Sets the connection timeout.
    #[inline]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Sets the read timeout for commands.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for a response. `None` means no timeout.
    #[inline]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets the write timeout for commands.
    #[inline]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Enables or disables TLS, overriding the address scheme.
    #[inline]
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = Some(enabled);
        self
    }

    /// Registers sentinels monitoring `master_name`.
    ///
    /// # Arguments
    ///
    /// * `master_name` - Name of the monitored master
    /// * `nodes` - Sentinel addresses as `host[:port]`; the port defaults to 26379
    pub fn sentinel<I, S>(mut self, master_name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentinel_master = Some(master_name.into());
        self.sentinel_nodes.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Resolves the settings without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the address is missing or
    /// malformed, or a sentinel address cannot be parsed.
    pub fn build_config(&self) -> Result<ConnectionConfig, Error> {
        let address = self.address.as_deref().ok_or_else(|| Error::InvalidArgument {
            message: "address is required".to_string(),
        })?;
        let mut config = ConnectionConfig::from_url(address)?;

        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(database) = self.database {
            config.database = Some(database);
        }
        if let Some(name) = &self.client_name {
            config.client_name = Some(name.clone());
        }
        if let Some(timeout) = self.connection_timeout {
            config.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            config.read_timeout = timeout;
        }
        if let Some(timeout) = self.write_timeout {
            config.write_timeout = Some(timeout);
        }
        if let Some(tls) = self.tls {
            config.tls = tls;
        }

        if let Some(master) = &self.sentinel_master {
            if self.sentinel_nodes.is_empty() {
                return Err(Error::invalid_argument("sentinel needs at least one node"));
            }
            let nodes = self
                .sentinel_nodes
                .iter()
                .map(|addr| parse_node(addr, DEFAULT_SENTINEL_PORT))
                .collect::<Result<Vec<_>, _>>()?;
            config.sentinel = Some(SentinelConfig::new(master.clone(), nodes));
        }

        Ok(config)
    }

    /// Opens a connection backed by [`RespClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if address is not set.
    /// Returns [`Error::Io`] if connection fails.
    pub fn connect(self) -> Result<RedisConnection<RespClient>, Error> {
        self.connect_with(|config| RespClient::connect(config.clone()))
    }

    /// Opens a connection backed by a client produced by `open`.
    pub fn connect_with<C, F>(self, open: F) -> Result<RedisConnection<C>, Error>
    where
        C: NativeClient,
        F: FnOnce(&ConnectionConfig) -> Result<C, Error>,
    {
        let config = self.build_config()?;
        let connection = RedisConnection::new(open(&config)?);
        Ok(match config.sentinel {
            Some(sentinel) => connection.with_sentinel(sentinel),
            None => connection,
        })
    }
}
