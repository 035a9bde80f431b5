use bytes::Bytes;
use tracing::debug;

use crate::core::command::{self, Cmd};
use crate::core::mode::Operation;
use crate::core::scan::{self, ScanCursor, ScanOptions};
use crate::core::to_bytes;
use crate::core::types::{Reply, ScoredMember};
use crate::core::validate::check_in_i32_range;
use crate::core::RedisConnection;
use crate::native::NativeClient;
use crate::{Error, Result};

impl<C: NativeClient> RedisConnection<C> {
    /// Adds `member` with `score`, or updates its score.
    ///
    /// # Returns
    ///
    /// `true` if the member was new.
    pub fn z_add(
        &mut self,
        key: impl AsRef<[u8]>,
        score: f64,
        member: impl AsRef<[u8]>,
    ) -> Result<Reply<bool>> {
        let cmd = Cmd::new("ZADD")
            .arg(to_bytes(key))
            .arg(format_score(score))
            .arg(to_bytes(member));
        self.dispatch(Operation::ZAdd, cmd, command::frame_to_bool)
    }

    /// Removes members, returning how many were present.
    pub fn z_rem<M: AsRef<[u8]>>(&mut self, key: impl AsRef<[u8]>, members: &[M]) -> Result<Reply<i64>> {
        if members.is_empty() {
            return Err(Error::invalid_argument("ZREM needs at least one member"));
        }
        let cmd = Cmd::new("ZREM")
            .arg(to_bytes(key))
            .args_from(members.iter().map(to_bytes));
        self.dispatch(Operation::ZRem, cmd, command::frame_to_int)
    }

    /// Score of `member`, or `None` if it is not in the set.
    pub fn z_score(
        &mut self,
        key: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Reply<Option<f64>>> {
        let cmd = Cmd::new("ZSCORE").arg(to_bytes(key)).arg(to_bytes(member));
        self.dispatch(Operation::ZScore, cmd, command::frame_to_float)
    }

    /// Number of members in the sorted set at `key`.
    pub fn z_card(&mut self, key: impl AsRef<[u8]>) -> Result<Reply<i64>> {
        let cmd = Cmd::new("ZCARD").arg(to_bytes(key));
        self.dispatch(Operation::ZCard, cmd, command::frame_to_int)
    }

    /// Adds `increment` to the score of `member`, returning the new score.
    pub fn z_incr_by(
        &mut self,
        key: impl AsRef<[u8]>,
        increment: f64,
        member: impl AsRef<[u8]>,
    ) -> Result<Reply<f64>> {
        let cmd = Cmd::new("ZINCRBY")
            .arg(to_bytes(key))
            .arg(format_score(increment))
            .arg(to_bytes(member));
        self.dispatch(Operation::ZIncrBy, cmd, |frame| {
            command::frame_to_float(frame)?
                .ok_or_else(|| Error::protocol("ZINCRBY returned null"))
        })
    }

    /// Members between ranks `start` and `stop` (inclusive), lowest score
    /// first.
    pub fn z_range(
        &mut self,
        key: impl AsRef<[u8]>,
        start: i64,
        stop: i64,
    ) -> Result<Reply<Vec<Bytes>>> {
        let cmd = Cmd::new("ZRANGE")
            .arg(to_bytes(key))
            .int_arg(start)
            .int_arg(stop);
        self.dispatch(Operation::ZRange, cmd, command::frame_to_vec_bytes)
    }

    /// Like [`z_range`](Self::z_range), including each member's score.
    pub fn z_range_with_scores(
        &mut self,
        key: impl AsRef<[u8]>,
        start: i64,
        stop: i64,
    ) -> Result<Reply<Vec<ScoredMember>>> {
        let cmd = Cmd::new("ZRANGE")
            .arg(to_bytes(key))
            .int_arg(start)
            .int_arg(stop)
            .arg("WITHSCORES");
        self.dispatch(Operation::ZRange, cmd, command::frame_to_scored)
    }

    /// Members with a score between `min` and `max` (inclusive).
    ///
    /// # Arguments
    ///
    /// * `key` - The sorted set.
    /// * `min`, `max` - Score bounds; infinities map to `-inf` / `+inf`.
    /// * `limit` - Optional `(offset, count)` page. Both must fit in an
    ///   `i32`.
    pub fn z_range_by_score(
        &mut self,
        key: impl AsRef<[u8]>,
        min: f64,
        max: f64,
        limit: Option<(i64, i64)>,
    ) -> Result<Reply<Vec<Bytes>>> {
        let limit = match limit {
            Some((offset, count)) => Some((
                check_in_i32_range("offset", offset)?,
                check_in_i32_range("count", count)?,
            )),
            None => None,
        };
        let cmd = command::zrangebyscore(
            to_bytes(key),
            &format_score(min),
            &format_score(max),
            limit,
        );
        self.dispatch(Operation::ZRangeByScore, cmd, command::frame_to_vec_bytes)
    }

    /// Starts iterating over the sorted set at `key` with ZSCAN.
    ///
    /// Dropping or closing the cursor closes this connection.
    pub fn z_scan(
        &mut self,
        key: impl AsRef<[u8]>,
        options: ScanOptions,
    ) -> Result<ScanCursor<'_, C, ScoredMember>> {
        self.direct_client(Operation::ZScan)?;
        let key = to_bytes(key);
        debug!(key = ?key, ?options, "opening ZSCAN cursor");
        Ok(ScanCursor::new(self, scan::fetch_scored_members::<C>, key, options))
    }
}

/// Formats a score the way Redis parses it.
fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(1.5), "1.5");
        assert_eq!(format_score(3.0), "3");
        assert_eq!(format_score(f64::INFINITY), "+inf");
        assert_eq!(format_score(f64::NEG_INFINITY), "-inf");
    }
}
