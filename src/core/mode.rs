//! Direct versus pipelined execution.

/// How a [`RedisConnection`](crate::RedisConnection) runs commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Every command is sent and its reply read immediately.
    #[default]
    Direct,
    /// Commands are queued and resolved together by `close_pipeline`.
    Pipelined,
}

/// Whether an operation may be queued while pipelined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSupport {
    /// The command is queued and resolved later.
    Queued,
    /// The operation fails with `UnsupportedOperation`.
    Unsupported,
}

/// Every operation the connection exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    // keys
    Del,
    Exists,
    Expire,
    PExpire,
    Ttl,
    Persist,
    Rename,
    Type,
    Dump,
    Restore,
    Scan,
    // strings
    Get,
    Set,
    SetEx,
    PSetEx,
    SetNx,
    GetRange,
    Append,
    StrLen,
    Incr,
    IncrBy,
    Decr,
    DecrBy,
    // sets
    SAdd,
    SRem,
    SMembers,
    SIsMember,
    SCard,
    SRandMember,
    SScan,
    // sorted sets
    ZAdd,
    ZRem,
    ZScore,
    ZCard,
    ZIncrBy,
    ZRange,
    ZRangeByScore,
    ZScan,
    // hashes
    HSet,
    HGet,
    HDel,
    HExists,
    HLen,
    HKeys,
    HVals,
    HGetAll,
    HIncrBy,
    HScan,
    // server
    Ping,
    Echo,
    DbSize,
    FlushDb,
    Select,
    Info,
    ClientSetName,
    ClientGetName,
    ClientKill,
    BgSave,
    LastSave,
    Time,
    Shutdown,
    ShutdownScripted,
    SlaveOf,
    SlaveOfNoOne,
    Execute,
}

impl Operation {
    /// Name used in error messages and logs.
    pub fn name(self) -> &'static str {
        use Operation::*;
        match self {
            Del => "DEL",
            Exists => "EXISTS",
            Expire => "EXPIRE",
            PExpire => "PEXPIRE",
            Ttl => "TTL",
            Persist => "PERSIST",
            Rename => "RENAME",
            Type => "TYPE",
            Dump => "DUMP",
            Restore => "RESTORE",
            Scan => "SCAN",
            Get => "GET",
            Set => "SET",
            SetEx => "SETEX",
            PSetEx => "PSETEX",
            SetNx => "SETNX",
            GetRange => "GETRANGE",
            Append => "APPEND",
            StrLen => "STRLEN",
            Incr => "INCR",
            IncrBy => "INCRBY",
            Decr => "DECR",
            DecrBy => "DECRBY",
            SAdd => "SADD",
            SRem => "SREM",
            SMembers => "SMEMBERS",
            SIsMember => "SISMEMBER",
            SCard => "SCARD",
            SRandMember => "SRANDMEMBER",
            SScan => "SSCAN",
            ZAdd => "ZADD",
            ZRem => "ZREM",
            ZScore => "ZSCORE",
            ZCard => "ZCARD",
            ZIncrBy => "ZINCRBY",
            ZRange => "ZRANGE",
            ZRangeByScore => "ZRANGEBYSCORE",
            ZScan => "ZSCAN",
            HSet => "HSET",
            HGet => "HGET",
            HDel => "HDEL",
            HExists => "HEXISTS",
            HLen => "HLEN",
            HKeys => "HKEYS",
            HVals => "HVALS",
            HGetAll => "HGETALL",
            HIncrBy => "HINCRBY",
            HScan => "HSCAN",
            Ping => "PING",
            Echo => "ECHO",
            DbSize => "DBSIZE",
            FlushDb => "FLUSHDB",
            Select => "SELECT",
            Info => "INFO",
            ClientSetName => "CLIENT SETNAME",
            ClientGetName => "CLIENT GETNAME",
            ClientKill => "CLIENT KILL",
            BgSave => "BGSAVE",
            LastSave => "LASTSAVE",
            Time => "TIME",
            Shutdown => "SHUTDOWN",
            ShutdownScripted => "SHUTDOWN with save option",
            SlaveOf => "SLAVEOF",
            SlaveOfNoOne => "SLAVEOF NO ONE",
            Execute => "custom command",
        }
    }

    /// Decides whether the operation can be queued while pipelined.
    ///
    /// No wildcard arm: every new operation must be classified here.
    pub fn pipeline_support(self) -> PipelineSupport {
        use Operation::*;
        match self {
            Del | Exists | Expire | PExpire | Ttl | Persist | Rename | Type | Dump | Restore
            | Get | Set | SetEx | PSetEx | SetNx | GetRange | Append | StrLen | Incr | IncrBy
            | Decr | DecrBy | SAdd | SRem | SMembers | SIsMember | SCard | SRandMember
            | ZAdd | ZRem | ZScore | ZCard | ZIncrBy | ZRange | ZRangeByScore | HSet | HGet
            | HDel | HExists | HLen | HKeys | HVals | HGetAll | HIncrBy | Ping | Echo
            | DbSize | FlushDb | Info | BgSave | LastSave | Time | Shutdown | Execute => {
                PipelineSupport::Queued
            }

            // Scripted shutdown goes through EVAL, whose reply never arrives.
            ShutdownScripted => PipelineSupport::Unsupported,

            // Cursors need each reply before the next request.
            Scan | SScan | HScan | ZScan => PipelineSupport::Unsupported,

            // Connection state must take effect before later commands run.
            Select | ClientSetName => PipelineSupport::Unsupported,

            ClientKill | ClientGetName | SlaveOf | SlaveOfNoOne => PipelineSupport::Unsupported,
        }
    }

    /// Shorthand for `pipeline_support() == PipelineSupport::Queued`.
    pub fn is_pipelinable(self) -> bool {
        self.pipeline_support() == PipelineSupport::Queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_direct() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Direct);
    }

    #[test]
    fn test_restricted_operations() {
        for op in [
            Operation::ShutdownScripted,
            Operation::ClientKill,
            Operation::ClientGetName,
            Operation::SlaveOf,
            Operation::SlaveOfNoOne,
            Operation::Scan,
            Operation::SScan,
            Operation::HScan,
            Operation::ZScan,
        ] {
            assert_eq!(op.pipeline_support(), PipelineSupport::Unsupported, "{}", op.name());
        }
    }

    #[test]
    fn test_plain_shutdown_is_queued() {
        assert!(Operation::Shutdown.is_pipelinable());
        assert!(!Operation::ShutdownScripted.is_pipelinable());
    }

    #[test]
    fn test_data_commands_are_queued() {
        for op in [Operation::Get, Operation::HGetAll, Operation::ZRangeByScore, Operation::Execute] {
            assert!(op.is_pipelinable(), "{}", op.name());
        }
    }
}
