use std::time::Duration;

use crate::core::types::RedisNode;
use crate::Error;

/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;
/// Default Redis Sentinel port.
pub const DEFAULT_SENTINEL_PORT: u16 = 26379;

/// Sentinel endpoints known to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelConfig {
    /// Name of the monitored master.
    pub master_name: String,
    /// Sentinel nodes, tried in order.
    pub nodes: Vec<RedisNode>,
}

impl SentinelConfig {
    /// Creates a sentinel configuration.
    pub fn new(master_name: impl Into<String>, nodes: Vec<RedisNode>) -> Self {
        Self {
            master_name: master_name.into(),
            nodes,
        }
    }
}

/// Everything needed to open a connection to one Redis server.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Server address.
    pub node: RedisNode,
    /// Optional ACL username.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Logical database selected after connecting.
    pub database: Option<u8>,
    /// Name registered with `CLIENT SETNAME` after connecting.
    pub client_name: Option<String>,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
    /// Deadline for each reply.
    pub read_timeout: Option<Duration>,
    /// Deadline for each write.
    pub write_timeout: Option<Duration>,
    /// Whether to use TLS.
    pub tls: bool,
    /// Sentinel endpoints, if any.
    pub sentinel: Option<SentinelConfig>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            node: RedisNode::new("127.0.0.1", DEFAULT_PORT),
            username: None,
            password: None,
            database: None,
            client_name: None,
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: None,
            tls: false,
            sentinel: None,
        }
    }
}

impl ConnectionConfig {
    /// Parses `redis://[user:pass@]host[:port][/db]` or the `rediss://`
    /// TLS variant.
    pub fn from_url(address: &str) -> crate::Result<Self> {
        let parsed = url::Url::parse(address)
            .map_err(|_| Error::invalid_argument("invalid address format"))?;

        let tls = match parsed.scheme() {
            "redis" => false,
            "rediss" => true,
            _ => {
                return Err(Error::invalid_argument(
                    "invalid scheme, expected redis:// or rediss://",
                ))
            }
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_argument("missing host in address"))?;

        let database = match parsed.path().trim_start_matches('/') {
            "" => None,
            db => Some(db.parse::<u8>().map_err(|_| {
                Error::invalid_argument(format!("invalid database number: {db}"))
            })?),
        };

        let username = Some(parsed.username())
            .filter(|u| !u.is_empty())
            .map(decode_credential)
            .transpose()?;
        let password = parsed.password().map(decode_credential).transpose()?;

        Ok(Self {
            node: RedisNode::new(host, parsed.port().unwrap_or(DEFAULT_PORT)),
            username,
            password,
            database,
            tls,
            ..Self::default()
        })
    }

    /// Returns the settings for talking to a sentinel node: credentials,
    /// TLS and timeouts carry over, database selection does not.
    pub fn for_sentinel(&self, node: &RedisNode) -> Self {
        Self {
            node: node.clone(),
            database: None,
            client_name: None,
            sentinel: None,
            ..self.clone()
        }
    }
}

/// Parses `host[:port]`, applying `default_port` when the port is absent.
pub fn parse_node(addr: &str, default_port: u16) -> crate::Result<RedisNode> {
    let addr = addr.trim();
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::invalid_argument(format!("invalid port in {addr}")))?;
            (host, port)
        }
        None => (addr, default_port),
    };
    if host.is_empty() {
        return Err(Error::invalid_argument(format!("missing host in {addr}")));
    }
    Ok(RedisNode::new(host, port))
}

/// Userinfo in a URL arrives percent-encoded.
fn decode_credential(raw: &str) -> crate::Result<String> {
    percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::invalid_argument("credentials in address are not valid UTF-8"))
}
