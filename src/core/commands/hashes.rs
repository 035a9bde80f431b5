use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::scan::{self, ScanCursor, ScanOptions};
use crate::core::to_bytes;
use crate::core::types::Reply;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::{Error, Result};

impl<C: NativeClient> RedisConnection<C> {
    /// Sets `field` in the hash at `key`.
    ///
    /// # Returns
    ///
    /// `true` if the field was new, `false` if it was updated.
    pub fn h_set(
        &mut self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<Reply<bool>> {
        let cmd = Cmd::new("HSET")
            .arg(to_bytes(key))
            .arg(to_bytes(field))
            .arg(to_bytes(value));
        self.dispatch(Operation::HSet, cmd, command::frame_to_bool)
    }

    /// Value of `field`, or `None` if the field or hash is missing.
    pub fn h_get(
        &mut self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
    ) -> Result<Reply<Option<Bytes>>> {
        let cmd = Cmd::new("HGET").arg(to_bytes(key)).arg(to_bytes(field));
        self.dispatch(Operation::HGet, cmd, command::frame_to_bytes)
    }

    /// Removes fields, returning how many existed.
    pub fn h_del<F: AsRef<[u8]>>(&mut self, key: impl AsRef<[u8]>, fields: &[F]) -> Result<Reply<i64>> {
        if fields.is_empty() {
            return Err(Error::invalid_argument("HDEL needs at least one field"));
        }
        let cmd = Cmd::new("HDEL")
            .arg(to_bytes(key))
            .args_from(fields.iter().map(to_bytes));
        self.dispatch(Operation::HDel, cmd, command::frame_to_int)
    }

    /// Returns true if `field` exists in the hash.
    pub fn h_exists(
        &mut self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
    ) -> Result<Reply<bool>> {
        let cmd = Cmd::new("HEXISTS").arg(to_bytes(key)).arg(to_bytes(field));
        self.dispatch(Operation::HExists, cmd, command::frame_to_bool)
    }

    /// Number of fields in the hash.
    pub fn h_len(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("HLEN").arg(to_bytes(key));
        self.dispatch(Operation::HLen, cmd, command::frame_to_int)
    }

    /// All field names.
    pub fn h_keys(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Vec<Bytes>>> {
        let cmd = Cmd::new("HKEYS").arg(to_bytes(key));
        self.dispatch(Operation::HKeys, cmd, command::frame_to_vec_bytes)
    }

    /// All values.
    pub fn h_vals(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Vec<Bytes>>> {
        let cmd = Cmd::new("HVALS").arg(to_bytes(key));
        self.dispatch(Operation::HVals, cmd, command::frame_to_vec_bytes)
    }

    /// Every field and value of the hash.
    pub fn h_get_all(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<HashMap<Bytes, Bytes>>> {
        let cmd = Cmd::new("HGETALL").arg(to_bytes(key));
        self.dispatch(Operation::HGetAll, cmd, command::frame_to_hashmap)
    }

    /// Increments the integer at `field` by `delta`, returning the result.
    pub fn h_incr_by(
        &mut self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        delta: i64,
    ) -> Result<Reply<i64>> {
        let cmd = Cmd::new("HINCRBY")
            .arg(to_bytes(key))
            .arg(to_bytes(field))
            .int_arg(delta);
        self.dispatch(Operation::HIncrBy, cmd, command::frame_to_int)
    }

    /// Starts iterating over the entries of the hash at `key` with HSCAN.
    ///
    /// Dropping or closing the cursor closes this connection.
    pub fn h_scan(
        &mut self,
        key: impl AsRef<[u8]>,
        options: ScanOptions,
    ) -> Result<ScanCursor<'_, C, (Bytes, Bytes)>> {
        self.direct_client(Operation::HScan)?;
        let key = to_bytes(key);
        debug!(key = ?key, ?options, "opening HSCAN cursor");
        Ok(ScanCursor::new(self, scan::fetch_hash_entries::<C>, key, options))
    }
}
