use bytes::Bytes;

use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::to_bytes;
use crate::core::types::Reply;
use crate::core::validate::check_in_i32_range;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::Result;

impl<C: NativeClient> RedisConnection<C> {
    /// Gets the value associated with the specified key.
    ///
    /// # Returns
    ///
    /// `Some(Bytes)` if the key exists, or `None` if it does not.
    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Option<Bytes>>> {
        let cmd = Cmd::new("GET").arg(to_bytes(key));
        self.dispatch(Operation::Get, cmd, command::frame_to_bytes)
    }

    /// Sets the string value of a key.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<Reply<()>> {
        let cmd = Cmd::new("SET").arg(to_bytes(key)).arg(to_bytes(value));
        self.dispatch(Operation::Set, cmd, command::parse_status)
    }

    /// Sets the value of a key with an expiration time (SETEX).
    ///
    /// # Arguments
    ///
    /// * `key` - The key to set.
    /// * `seconds` - The expiration in seconds. Must fit in an `i32`.
    /// * `value` - The value to set.
    pub fn set_ex(
        &mut self,
        key: impl AsRef<[u8]>,
        seconds: i64,
        value: impl AsRef<[u8]>,
    ) -> Result<Reply<()>> {
        let seconds = check_in_i32_range("seconds", seconds)?;
        let cmd = Cmd::new("SETEX")
            .arg(to_bytes(key))
            .int_arg(seconds)
            .arg(to_bytes(value));
        self.dispatch(Operation::SetEx, cmd, command::parse_status)
    }

    /// Sets the value of a key with an expiration time in milliseconds.
    pub fn p_set_ex(
        &mut self,
        key: impl AsRef<[u8]>,
        millis: i64,
        value: impl AsRef<[u8]>,
    ) -> Result<Reply<()>> {
        let cmd = Cmd::new("PSETEX")
            .arg(to_bytes(key))
            .int_arg(millis)
            .arg(to_bytes(value));
        self.dispatch(Operation::PSetEx, cmd, command::parse_status)
    }

    /// Sets `key` only if it does not exist yet.
    ///
    /// # Returns
    ///
    /// `true` if the value was set.
    pub fn set_nx(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<Reply<bool>> {
        let cmd = Cmd::new("SETNX").arg(to_bytes(key)).arg(to_bytes(value));
        self.dispatch(Operation::SetNx, cmd, command::frame_to_bool)
    }

    /// Returns the substring between `start` and `end` (inclusive).
    ///
    /// Both offsets must fit in an `i32`.
    pub fn get_range(
        &mut self,
        key: impl AsRef<[u8]>,
        start: i64,
        end: i64,
    ) -> Result<Reply<Bytes>> {
        let start = check_in_i32_range("start", start)?;
        let end = check_in_i32_range("end", end)?;
        let cmd = Cmd::new("GETRANGE")
            .arg(to_bytes(key))
            .int_arg(start)
            .int_arg(end);
        self.dispatch(Operation::GetRange, cmd, |frame| {
            command::frame_to_bytes(frame).map(Option::unwrap_or_default)
        })
    }

    /// Appends `value` to the string at `key`, returning the new length.
    pub fn append(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("APPEND").arg(to_bytes(key)).arg(to_bytes(value));
        self.dispatch(Operation::Append, cmd, command::frame_to_int)
    }

    /// Length of the string at `key`.
    pub fn strlen(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("STRLEN").arg(to_bytes(key));
        self.dispatch(Operation::StrLen, cmd, command::frame_to_int)
    }

    /// Increments the number stored at key by one.
    ///
    /// # Returns
    ///
    /// The value of the key after the increment.
    pub fn incr(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("INCR").arg(to_bytes(key));
        self.dispatch(Operation::Incr, cmd, command::frame_to_int)
    }

    /// Increments the number stored at key by the specified amount.
    pub fn incr_by(&mut self, key: impl AsRef<[u8]>, amount: i64) -> Result<Reply<i64>> {
        let cmd = Cmd::new("INCRBY").arg(to_bytes(key)).int_arg(amount);
        self.dispatch(Operation::IncrBy, cmd, command::frame_to_int)
    }

    /// Decrements the number stored at key by one.
    pub fn decr(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("DECR").arg(to_bytes(key));
        self.dispatch(Operation::Decr, cmd, command::frame_to_int)
    }

    /// Decrements the number stored at key by the specified amount.
    pub fn decr_by(&mut self, key: impl AsRef<[u8]>, amount: i64) -> Result<Reply<i64>> {
        let cmd = Cmd::new("DECRBY").arg(to_bytes(key)).int_arg(amount);
        self.dispatch(Operation::DecrBy, cmd, command::frame_to_int)
    }
}
