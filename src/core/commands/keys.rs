use bytes::Bytes;
use tracing::debug;

use crate::core::to_bytes;
use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::scan::{self, ScanCursor, ScanOptions};
use crate::core::types::Reply;
use crate::core::validate::check_in_i32_range;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::{Error, Result};

impl<C: NativeClient> RedisConnection<C> {
    /// Removes the given keys.
    ///
    /// # Returns
    ///
    /// The number of keys that were removed.
    pub fn del<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Reply<i64>> {
        if keys.is_empty() {
            return Err(Error::invalid_argument("DEL needs at least one key"));
        }
        let cmd = Cmd::new("DEL").args_from(keys.iter().map(to_bytes));
        self.dispatch(Operation::Del, cmd, command::frame_to_int)
    }

    /// Returns true if `key` exists.
    pub fn exists(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<bool>> {
        let cmd = Cmd::new("EXISTS").arg(to_bytes(key));
        self.dispatch(Operation::Exists, cmd, command::frame_to_bool)
    }

    /// Sets a timeout on `key` in seconds.
    pub fn expire(&mut self, key: impl AsRef<[u8]>, seconds: i64) -> Result<Reply<bool>> {
        let cmd = Cmd::new("EXPIRE").arg(to_bytes(key)).int_arg(seconds);
        self.dispatch(Operation::Expire, cmd, command::frame_to_bool)
    }

    /// Sets a timeout on `key` in milliseconds.
    pub fn p_expire(&mut self, key: impl AsRef<[u8]>, millis: i64) -> Result<Reply<bool>> {
        let cmd = Cmd::new("PEXPIRE").arg(to_bytes(key)).int_arg(millis);
        self.dispatch(Operation::PExpire, cmd, command::frame_to_bool)
    }

    /// Remaining time to live of `key` in seconds (`-1` without expiry,
    /// `-2` when missing).
    pub fn ttl(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("TTL").arg(to_bytes(key));
        self.dispatch(Operation::Ttl, cmd, command::frame_to_int)
    }

    /// Removes the expiry of `key`.
    pub fn persist(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<bool>> {
        let cmd = Cmd::new("PERSIST").arg(to_bytes(key));
        self.dispatch(Operation::Persist, cmd, command::frame_to_bool)
    }

    /// Renames `key` to `new_key`.
    pub fn rename(
        &mut self,
        key: impl AsRef<[u8]>,
        new_key: impl AsRef<[u8]>,
    ) -> Result<Reply<()>> {
        let cmd = Cmd::new("RENAME").arg(to_bytes(key)).arg(to_bytes(new_key));
        self.dispatch(Operation::Rename, cmd, command::parse_status)
    }

    /// Type of the value stored at `key` (`string`, `set`, `none`, ...).
    pub fn key_type(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<String>> {
        let cmd = Cmd::new("TYPE").arg(to_bytes(key));
        self.dispatch(Operation::Type, cmd, command::frame_to_string)
    }

    /// Serialized form of the value at `key`, or `None` if it does not exist.
    pub fn dump(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Option<Bytes>>> {
        let cmd = Cmd::new("DUMP").arg(to_bytes(key));
        self.dispatch(Operation::Dump, cmd, command::frame_to_bytes)
    }

    /// Creates `key` from a value produced by [`dump`](Self::dump).
    ///
    /// # Arguments
    ///
    /// * `key` - The key to create.
    /// * `ttl_millis` - Expiry in milliseconds, `0` for none. Must fit in an
    ///   `i32`.
    /// * `serialized` - The dumped value.
    pub fn restore(
        &mut self,
        key: impl AsRef<[u8]>,
        ttl_millis: i64,
        serialized: impl AsRef<[u8]>,
    ) -> Result<Reply<()>> {
        let ttl = check_in_i32_range("ttl", ttl_millis)?;
        let cmd = command::restore(to_bytes(key), ttl, to_bytes(serialized));
        self.dispatch(Operation::Restore, cmd, command::parse_status)
    }

    /// Starts iterating over the keyspace with SCAN.
    ///
    /// The cursor borrows this connection until it is dropped. Dropping or
    /// closing the cursor closes this connection.
    pub fn scan(&mut self, options: ScanOptions) -> Result<ScanCursor<'_, C, Bytes>> {
        self.direct_client(Operation::Scan)?;
        debug!(?options, "opening SCAN cursor");
        Ok(ScanCursor::new(
            self,
            scan::fetch_keys::<C>,
            Bytes::new(),
            options,
        ))
    }
}
