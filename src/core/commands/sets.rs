use bytes::Bytes;
use tracing::debug;

use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::scan::{self, ScanCursor, ScanOptions};
use crate::core::to_bytes;
use crate::core::types::Reply;
use crate::core::validate::check_in_i32_range;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::{Error, Result};

impl<C: NativeClient> RedisConnection<C> {
    /// Adds members to the set at `key`, returning how many were new.
    pub fn s_add<M: AsRef<[u8]>>(&mut self, key: impl AsRef<[u8]>, members: &[M]) -> Result<Reply<i64>> {
        if members.is_empty() {
            return Err(Error::invalid_argument("SADD needs at least one member"));
        }
        let cmd = Cmd::new("SADD")
            .arg(to_bytes(key))
            .args_from(members.iter().map(to_bytes));
        self.dispatch(Operation::SAdd, cmd, command::frame_to_int)
    }

    /// Removes members from the set at `key`, returning how many were removed.
    pub fn s_rem<M: AsRef<[u8]>>(&mut self, key: impl AsRef<[u8]>, members: &[M]) -> Result<Reply<i64>> {
        if members.is_empty() {
            return Err(Error::invalid_argument("SREM needs at least one member"));
        }
        let cmd = Cmd::new("SREM")
            .arg(to_bytes(key))
            .args_from(members.iter().map(to_bytes));
        self.dispatch(Operation::SRem, cmd, command::frame_to_int)
    }

    /// All members of the set at `key`.
    pub fn s_members(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Vec<Bytes>>> {
        let cmd = Cmd::new("SMEMBERS").arg(to_bytes(key));
        self.dispatch(Operation::SMembers, cmd, command::frame_to_vec_bytes)
    }

    /// Returns true if `member` belongs to the set at `key`.
    pub fn s_is_member(
        &mut self,
        key: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Reply<bool>> {
        let cmd = Cmd::new("SISMEMBER").arg(to_bytes(key)).arg(to_bytes(member));
        self.dispatch(Operation::SIsMember, cmd, command::frame_to_bool)
    }

    /// Number of members in the set at `key`.
    pub fn s_card(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("SCARD").arg(to_bytes(key));
        self.dispatch(Operation::SCard, cmd, command::frame_to_int)
    }

    /// One random member, or `None` for an empty set.
    pub fn s_rand_member(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<Option<Bytes>>> {
        let cmd = Cmd::new("SRANDMEMBER").arg(to_bytes(key));
        self.dispatch(Operation::SRandMember, cmd, command::frame_to_bytes)
    }

    /// Up to `count` random members. A negative count allows repeats.
    ///
    /// `count` must fit in an `i32`.
    pub fn s_rand_member_count(
        &mut self,
        key: impl AsRef<[u8]>,
        count: i64,
    ) -> Result<Reply<Vec<Bytes>>> {
        let count = check_in_i32_range("count", count)?;
        let cmd = Cmd::new("SRANDMEMBER").arg(to_bytes(key)).int_arg(count);
        self.dispatch(Operation::SRandMember, cmd, command::frame_to_vec_bytes)
    }

    /// Starts iterating over the members of the set at `key` with SSCAN.
    ///
    /// Dropping or closing the cursor closes this connection.
    pub fn s_scan(
        &mut self,
        key: impl AsRef<[u8]>,
        options: ScanOptions,
    ) -> Result<ScanCursor<'_, C, Bytes>> {
        self.direct_client(Operation::SScan)?;
        let key = to_bytes(key);
        debug!(key = ?key, ?options, "opening SSCAN cursor");
        Ok(ScanCursor::new(self, scan::fetch_set_members::<C>, key, options))
    }
}
