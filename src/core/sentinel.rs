use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::core::command::{self, Cmd};
use crate::core::types::RedisNode;
use crate::core::validate::check_not_empty;
use crate::native::NativeClient;
use crate::proto::frame::Frame;
use crate::{Error, Result};

/// A Redis server as described by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisServer {
    /// Master name (empty for replicas).
    pub name: String,
    /// Address of the server.
    pub node: RedisNode,
    /// Votes needed to agree on a failure, for monitored masters.
    pub quorum: Option<u32>,
    /// Every field reported by the sentinel, verbatim.
    pub properties: HashMap<String, String>,
}

impl RedisServer {
    /// Describes a master to register with [`SentinelConnection::monitor`].
    pub fn new(name: impl Into<String>, node: RedisNode, quorum: u32) -> Self {
        Self {
            name: name.into(),
            node,
            quorum: Some(quorum),
            properties: HashMap::new(),
        }
    }

    /// Builds a server from the flat field/value list SENTINEL replies use.
    fn from_frame(frame: Frame) -> Result<Self> {
        let properties: HashMap<String, String> = command::frame_to_hashmap(frame)?
            .into_iter()
            .map(|(k, v)| {
                (
                    String::from_utf8_lossy(&k).into_owned(),
                    String::from_utf8_lossy(&v).into_owned(),
                )
            })
            .collect();

        let host = properties
            .get("ip")
            .cloned()
            .ok_or_else(|| Error::protocol("sentinel reply without ip"))?;
        let port = properties
            .get("port")
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(|| Error::protocol("sentinel reply without a valid port"))?;

        Ok(Self {
            name: properties.get("name").cloned().unwrap_or_default(),
            node: RedisNode::new(host, port),
            quorum: properties.get("quorum").and_then(|q| q.parse().ok()),
            properties,
        })
    }
}

/// Administrative connection to one Redis Sentinel.
///
/// Obtained from
/// [`RedisConnection::get_sentinel_connection`](crate::RedisConnection::get_sentinel_connection).
/// Dropping it releases the underlying client.
pub struct SentinelConnection<C: NativeClient> {
    client: C,
    node: RedisNode,
    closed: bool,
}

impl<C: NativeClient> SentinelConnection<C> {
    pub(crate) fn new(client: C, node: RedisNode) -> Self {
        Self {
            client,
            node,
            closed: false,
        }
    }

    /// The sentinel this connection talks to.
    pub fn node(&self) -> &RedisNode {
        &self.node
    }

    /// Forces a failover of `master` without agreement from other sentinels.
    pub fn failover(&mut self, master: &str) -> Result<()> {
        let master = check_not_empty("master name", master)?;
        debug!(%master, sentinel = %self.node, "forcing failover");
        let cmd = Cmd::new("SENTINEL").arg("FAILOVER").arg(master.to_string());
        command::parse_status(self.run(cmd)?)
    }

    /// Every master this sentinel monitors.
    pub fn masters(&mut self) -> Result<Vec<RedisServer>> {
        let reply = self.run(Cmd::new("SENTINEL").arg("MASTERS"))?;
        command::frame_to_array(reply)?
            .into_iter()
            .map(RedisServer::from_frame)
            .collect()
    }

    /// Replicas of `master`.
    pub fn replicas(&mut self, master: &str) -> Result<Vec<RedisServer>> {
        let master = check_not_empty("master name", master)?;
        let reply = self.run(Cmd::new("SENTINEL").arg("SLAVES").arg(master.to_string()))?;
        command::frame_to_array(reply)?
            .into_iter()
            .map(RedisServer::from_frame)
            .collect()
    }

    /// Stops monitoring `master`.
    pub fn remove(&mut self, master: &str) -> Result<()> {
        let master = check_not_empty("master name", master)?;
        let cmd = Cmd::new("SENTINEL").arg("REMOVE").arg(master.to_string());
        command::parse_status(self.run(cmd)?)
    }

    /// Starts monitoring `server`, which needs a name and a quorum.
    pub fn monitor(&mut self, server: &RedisServer) -> Result<()> {
        let name = check_not_empty("master name", &server.name)?;
        let host = check_not_empty("host", &server.node.host)?;
        let quorum = server
            .quorum
            .ok_or_else(|| Error::invalid_argument("quorum is required to monitor a master"))?;
        let cmd = Cmd::new("SENTINEL")
            .arg("MONITOR")
            .arg(name.to_string())
            .arg(host.to_string())
            .int_arg(server.node.port)
            .int_arg(quorum);
        command::parse_status(self.run(cmd)?)
    }

    /// Releases the sentinel client. Later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client.quit()
    }

    /// Returns true once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn run(&mut self, cmd: Cmd) -> Result<Frame> {
        if self.closed {
            return Err(Error::InvalidApiUsage {
                message: format!("sentinel connection to {} is closed", self.node),
            });
        }
        self.client.execute(cmd)
    }
}

impl<C: NativeClient> Drop for SentinelConnection<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(sentinel = %self.node, error = %e, "failed to release sentinel connection");
        }
    }
}

impl<C: NativeClient> fmt::Debug for SentinelConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelConnection")
            .field("node", &self.node)
            .field("closed", &self.closed)
            .finish()
    }
}
