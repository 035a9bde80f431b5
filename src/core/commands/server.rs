use std::io;

use bytes::Bytes;
use tracing::{debug, info};

use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::to_bytes;
use crate::core::types::{Reply, ShutdownOption};
use crate::core::validate::check_not_empty;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::{Error, Result};

impl<C: NativeClient> RedisConnection<C> {
    /// Sends a PING command to the server.
    ///
    /// # Returns
    ///
    /// The server's status reply, normally `PONG`.
    pub fn ping(&mut self) -> Result<Reply<String>> {
        self.dispatch(Operation::Ping, Cmd::new("PING"), command::frame_to_string)
    }

    /// Echoes the provided message back from the server.
    pub fn echo(&mut self, message: impl AsRef<[u8]>) -> Result<Reply<Bytes>> {
        let cmd = Cmd::new("ECHO").arg(to_bytes(message));
        self.dispatch(Operation::Echo, cmd, command::frame_into_bytes)
    }

    /// Number of keys in the selected database.
    pub fn db_size(&mut self) -> Result<Reply<i64>> {
        self.dispatch(Operation::DbSize, Cmd::new("DBSIZE"), command::frame_to_int)
    }

    /// Deletes every key in the selected database.
    pub fn flush_db(&mut self) -> Result<Reply<()>> {
        self.dispatch(Operation::FlushDb, Cmd::new("FLUSHDB"), command::parse_status)
    }

    /// Selects the Redis logical database to use.
    ///
    /// Not available while pipelined.
    pub fn select(&mut self, db: u8) -> Result<()> {
        let cmd = Cmd::new("SELECT").int_arg(db);
        self.direct(Operation::Select, cmd, command::parse_status)
    }

    /// Server information, optionally restricted to one section.
    pub fn info(&mut self, section: Option<&str>) -> Result<Reply<String>> {
        let cmd = match section {
            Some(section) => Cmd::new("INFO").arg(section.to_string()),
            None => Cmd::new("INFO"),
        };
        self.dispatch(Operation::Info, cmd, command::frame_to_string)
    }

    /// Sets the name of the current connection.
    ///
    /// This name is displayed in the `CLIENT LIST` command output on the
    /// server. Not available while pipelined.
    pub fn set_client_name(&mut self, name: &str) -> Result<()> {
        let name = check_not_empty("client name", name)?;
        let cmd = Cmd::new("CLIENT").arg("SETNAME").arg(name.to_string());
        self.direct(Operation::ClientSetName, cmd, command::parse_status)
    }

    /// Name of the current connection, if one was set.
    ///
    /// Not available while pipelined.
    pub fn get_client_name(&mut self) -> Result<Option<String>> {
        let cmd = Cmd::new("CLIENT").arg("GETNAME");
        self.direct(Operation::ClientGetName, cmd, command::frame_to_opt_string)
    }

    /// Closes the connection of the client at `host:port`.
    ///
    /// Not available while pipelined.
    pub fn kill_client(&mut self, host: &str, port: u16) -> Result<()> {
        let host = check_not_empty("host", host)?;
        let cmd = command::client_kill(format!("{host}:{port}"));
        self.direct(Operation::ClientKill, cmd, command::parse_status)
    }

    /// Starts a background save.
    pub fn bg_save(&mut self) -> Result<Reply<()>> {
        self.dispatch(Operation::BgSave, Cmd::new("BGSAVE"), command::parse_status)
    }

    /// Unix time, in seconds, of the last successful save.
    pub fn last_save(&mut self) -> Result<Reply<i64>> {
        self.dispatch(Operation::LastSave, Cmd::new("LASTSAVE"), command::frame_to_int)
    }

    /// Server clock in milliseconds since the Unix epoch.
    pub fn time(&mut self) -> Result<Reply<i64>> {
        self.dispatch(Operation::Time, Cmd::new("TIME"), command::frame_to_unix_millis)
    }

    /// Stops the server.
    ///
    /// Without an option a plain `SHUTDOWN` is sent, which may be queued.
    /// With [`ShutdownOption::Save`] or [`ShutdownOption::NoSave`] the
    /// command runs as a Lua script through EVAL, which is not available
    /// while pipelined. The server dropping the connection in response
    /// counts as success.
    pub fn shutdown(&mut self, option: Option<ShutdownOption>) -> Result<Reply<()>> {
        match option {
            None => {
                info!("sending SHUTDOWN");
                let reply = self.dispatch(Operation::Shutdown, Cmd::new("SHUTDOWN"), command::parse_status);
                closed_by_server(reply, Reply::Value(()))
            }
            Some(option) => {
                let script = command::shutdown_script(option);
                info!(option = option.as_str(), "sending scripted SHUTDOWN");
                let reply = self
                    .direct_client(Operation::ShutdownScripted)?
                    .eval(&script, &[], &[])
                    .and_then(command::parse_status)
                    .map(Reply::Value);
                closed_by_server(reply, Reply::Value(()))
            }
        }
    }

    /// Makes the server a replica of `host:port`.
    ///
    /// Fails with [`Error::InvalidArgument`] for an empty host in every
    /// mode. Not available while pipelined.
    pub fn slave_of(&mut self, host: &str, port: u16) -> Result<()> {
        let host = check_not_empty("host", host)?;
        debug!(%host, port, "SLAVEOF");
        self.direct(Operation::SlaveOf, command::slaveof(host, port), command::parse_status)
    }

    /// Promotes the server to a master.
    ///
    /// Not available while pipelined.
    pub fn slave_of_no_one(&mut self) -> Result<()> {
        self.direct(Operation::SlaveOfNoOne, command::slaveof_no_one(), command::parse_status)
    }
}

fn closed_by_server<T>(result: Result<T>, fallback: T) -> Result<T> {
    match result {
        Err(Error::Io { source }) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(fallback),
        other => other,
    }
}
