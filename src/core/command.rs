use std::collections::HashMap;

use bytes::Bytes;

use crate::core::scan::ScanOptions;
use crate::core::types::{ScoredMember, ShutdownOption, Value};
use crate::native::ScanPage;
use crate::proto::frame::Frame;
use crate::Error;

/// A command ready to be handed to a native client.
///
/// # Example
///
/// ```
/// use redbridge::core::command::Cmd;
///
/// let cmd = Cmd::new("SET").arg("key").arg("value");
/// assert_eq!(cmd.name(), "SET");
/// assert_eq!(cmd.args().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    args: Vec<Bytes>,
}

impl Cmd {
    /// Creates a new command with the given name.
    #[inline]
    pub fn new(name: impl Into<Bytes>) -> Self {
        Self {
            args: vec![name.into()],
        }
    }

    /// Appends an argument to the command.
    #[inline]
    pub fn arg<T: Into<Bytes>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends an integer argument in its decimal form.
    #[inline]
    pub fn int_arg(self, value: impl ToString) -> Self {
        self.arg(value.to_string())
    }

    /// Appends every argument yielded by the iterator.
    #[inline]
    pub fn args_from<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        self.args.extend(items.into_iter().map(Into::into));
        self
    }

    /// Command name (first argument) as text.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.args[0]).into_owned()
    }

    /// All arguments including the command name.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Converts the command to a RESP array frame.
    #[inline]
    pub fn into_frame(self) -> Frame {
        Frame::Array(self.args.into_iter().map(Frame::bulk).collect())
    }
}

/// Creates an EVAL command for `script` with the given keys and arguments.
pub fn eval(script: &[u8], keys: &[Bytes], args: &[Bytes]) -> Cmd {
    Cmd::new("EVAL")
        .arg(Bytes::copy_from_slice(script))
        .int_arg(keys.len())
        .args_from(keys.iter().cloned())
        .args_from(args.iter().cloned())
}

/// Script body that shuts the server down with an explicit save mode.
pub fn shutdown_script(option: ShutdownOption) -> Vec<u8> {
    format!("return redis.call('SHUTDOWN','{}')", option.as_str()).into_bytes()
}

/// Creates a SCAN command.
pub fn scan(cursor: &str, options: &ScanOptions) -> Cmd {
    Cmd::new("SCAN")
        .arg(cursor.to_string())
        .args_from(options.to_args())
}

/// Creates an SSCAN, HSCAN or ZSCAN command for `key`.
pub fn key_scan(name: &'static str, key: &[u8], cursor: &str, options: &ScanOptions) -> Cmd {
    Cmd::new(name)
        .arg(Bytes::copy_from_slice(key))
        .arg(cursor.to_string())
        .args_from(options.to_args())
}

/// Creates a ZRANGEBYSCORE command, with a LIMIT clause when paging.
pub fn zrangebyscore(
    key: Bytes,
    min: &str,
    max: &str,
    limit: Option<(i32, i32)>,
) -> Cmd {
    let cmd = Cmd::new("ZRANGEBYSCORE")
        .arg(key)
        .arg(min.to_string())
        .arg(max.to_string());
    match limit {
        Some((offset, count)) => cmd.arg("LIMIT").int_arg(offset).int_arg(count),
        None => cmd,
    }
}

/// Creates a RESTORE command.
pub fn restore(key: Bytes, ttl_millis: i32, serialized: Bytes) -> Cmd {
    Cmd::new("RESTORE").arg(key).int_arg(ttl_millis).arg(serialized)
}

/// Creates a CLIENT KILL command for `addr` (`host:port`).
pub fn client_kill(addr: String) -> Cmd {
    Cmd::new("CLIENT").arg("KILL").arg(addr)
}

/// Creates a SLAVEOF command.
pub fn slaveof(host: &str, port: u16) -> Cmd {
    Cmd::new("SLAVEOF").arg(host.to_string()).int_arg(port)
}

/// Creates a SLAVEOF NO ONE command.
pub fn slaveof_no_one() -> Cmd {
    Cmd::new("SLAVEOF").arg("NO").arg("ONE")
}

fn unexpected(frame: &Frame, expected: &str) -> Error {
    match frame {
        Frame::Error(e) => Error::server(e),
        _ => Error::protocol(format!("expected {expected}, got {frame:?}")),
    }
}

/// Accepts any non-error reply.
#[inline]
pub fn parse_status(frame: Frame) -> Result<(), Error> {
    frame.into_result().map(|_| ())
}

/// Converts a frame to optional bytes.
#[inline]
pub fn frame_to_bytes(frame: Frame) -> Result<Option<Bytes>, Error> {
    match frame {
        Frame::BulkString(b) => Ok(b),
        Frame::SimpleString(s) => Ok(Some(Bytes::from(s))),
        Frame::Null => Ok(None),
        other => Err(unexpected(&other, "bulk string")),
    }
}

/// Converts a frame to bytes, treating null as a protocol error.
#[inline]
pub fn frame_into_bytes(frame: Frame) -> Result<Bytes, Error> {
    frame_to_bytes(frame)?.ok_or_else(|| Error::protocol("unexpected null element"))
}

/// Converts a frame to an integer.
#[inline]
pub fn frame_to_int(frame: Frame) -> Result<i64, Error> {
    match frame {
        Frame::Integer(i) => Ok(i),
        Frame::BulkString(Some(b)) => parse_number(&b),
        other => Err(unexpected(&other, "integer")),
    }
}

/// Converts an integer reply to a boolean.
#[inline]
pub fn frame_to_bool(frame: Frame) -> Result<bool, Error> {
    frame_to_int(frame).map(|i| i != 0)
}

/// Converts a frame to an optional float.
#[inline]
pub fn frame_to_float(frame: Frame) -> Result<Option<f64>, Error> {
    match frame_to_bytes(frame)? {
        Some(b) => parse_number(&b).map(Some),
        None => Ok(None),
    }
}

/// Converts a frame to a string.
#[inline]
pub fn frame_to_string(frame: Frame) -> Result<String, Error> {
    frame_to_opt_string(frame).map(Option::unwrap_or_default)
}

/// Converts a frame to an optional string.
#[inline]
pub fn frame_to_opt_string(frame: Frame) -> Result<Option<String>, Error> {
    match frame {
        Frame::Integer(i) => Ok(Some(i.to_string())),
        other => Ok(frame_to_bytes(other)?.map(|b| String::from_utf8_lossy(&b).into_owned())),
    }
}

/// Converts an array reply to its elements.
#[inline]
pub fn frame_to_array(frame: Frame) -> Result<Vec<Frame>, Error> {
    match frame {
        Frame::Array(items) => Ok(items),
        Frame::Null => Ok(Vec::new()),
        other => Err(unexpected(&other, "array")),
    }
}

/// Converts an array reply to a vector of bytes.
#[inline]
pub fn frame_to_vec_bytes(frame: Frame) -> Result<Vec<Bytes>, Error> {
    frame_to_array(frame)?
        .into_iter()
        .map(frame_into_bytes)
        .collect()
}

/// Converts a flat field/value array (HGETALL) to a map.
pub fn frame_to_hashmap(frame: Frame) -> Result<HashMap<Bytes, Bytes>, Error> {
    pairs(frame_to_array(frame)?)?.into_iter().collect()
}

/// Converts a flat member/score array (WITHSCORES) to scored members.
pub fn frame_to_scored(frame: Frame) -> Result<Vec<ScoredMember>, Error> {
    pairs(frame_to_array(frame)?)?
        .into_iter()
        .map(|pair| {
            let (member, score) = pair?;
            Ok(ScoredMember::new(member, parse_number(&score)?))
        })
        .collect()
}

/// Converts a TIME reply to milliseconds since the epoch.
pub fn frame_to_unix_millis(frame: Frame) -> Result<i64, Error> {
    let parts = frame_to_array(frame)?;
    if parts.len() != 2 {
        return Err(Error::protocol("TIME reply must have 2 elements"));
    }
    let mut parts = parts.into_iter();
    let (Some(secs), Some(micros)) = (parts.next(), parts.next()) else {
        return Err(Error::protocol("TIME reply must have 2 elements"));
    };
    let (secs, micros) = (frame_to_int(secs)?, frame_to_int(micros)?);
    secs.checked_mul(1000)
        .and_then(|millis| millis.checked_add(micros / 1000))
        .ok_or_else(|| Error::protocol("TIME reply out of range"))
}

/// Converts any reply to a [`Value`] without knowing the command.
pub fn frame_to_value(frame: Frame) -> Result<Value, Error> {
    match frame {
        Frame::SimpleString(s) if s == b"OK" => Ok(Value::Ok),
        Frame::SimpleString(s) => Ok(Value::Text(String::from_utf8_lossy(&s).into_owned())),
        Frame::Error(e) => Err(Error::server(&e)),
        Frame::Integer(i) => Ok(Value::Int(i)),
        Frame::BulkString(Some(b)) => Ok(Value::Bytes(b)),
        Frame::BulkString(None) | Frame::Null => Ok(Value::Nil),
        Frame::Array(items) => items
            .into_iter()
            .map(frame_to_value)
            .collect::<Result<_, _>>()
            .map(Value::Array),
    }
}

/// Splits a SCAN-family reply into its cursor token and raw elements.
pub fn split_scan_reply(frame: Frame) -> Result<(String, Vec<Frame>), Error> {
    let mut parts = frame_to_array(frame)?.into_iter();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(cursor), Some(items), None) => {
            let cursor = frame_to_string(cursor)?;
            if cursor.is_empty() {
                return Err(Error::protocol("empty scan cursor"));
            }
            Ok((cursor, frame_to_array(items)?))
        }
        _ => Err(Error::protocol("SCAN response must have 2 elements")),
    }
}

/// Parses a SCAN or SSCAN page.
pub fn frame_to_value_page(frame: Frame) -> Result<ScanPage<Bytes>, Error> {
    let (cursor, items) = split_scan_reply(frame)?;
    let items = items
        .into_iter()
        .map(frame_into_bytes)
        .collect::<Result<_, _>>()?;
    Ok(ScanPage { cursor, items })
}

/// Parses an HSCAN page into field/value entries.
pub fn frame_to_entry_page(frame: Frame) -> Result<ScanPage<(Bytes, Bytes)>, Error> {
    let (cursor, items) = split_scan_reply(frame)?;
    let items = pairs(items)?.into_iter().collect::<Result<_, _>>()?;
    Ok(ScanPage { cursor, items })
}

/// Parses a ZSCAN page into scored members.
pub fn frame_to_scored_page(frame: Frame) -> Result<ScanPage<ScoredMember>, Error> {
    let (cursor, items) = split_scan_reply(frame)?;
    let items = frame_to_scored(Frame::Array(items))?;
    Ok(ScanPage { cursor, items })
}

fn pairs(items: Vec<Frame>) -> Result<Vec<Result<(Bytes, Bytes), Error>>, Error> {
    if items.len() % 2 != 0 {
        return Err(Error::protocol("expected an even number of elements"));
    }
    let mut out = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
        out.push(frame_into_bytes(k).and_then(|k| Ok((k, frame_into_bytes(v)?))));
    }
    Ok(out)
}

fn parse_number<T: std::str::FromStr>(raw: &[u8]) -> Result<T, Error> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .ok_or_else(|| {
            Error::protocol(format!(
                "invalid number: {}",
                String::from_utf8_lossy(raw)
            ))
        })
}
