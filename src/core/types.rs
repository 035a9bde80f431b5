//! Value types shared by the command API.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

/// Save behaviour requested from `SHUTDOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOption {
    /// Persist the dataset before shutting down.
    Save,
    /// Skip persistence.
    NoSave,
}

impl ShutdownOption {
    /// Argument spelling used by the server.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownOption::Save => "SAVE",
            ShutdownOption::NoSave => "NOSAVE",
        }
    }
}

/// A sorted-set member together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    /// Member value.
    pub member: Bytes,
    /// Score of the member.
    pub score: f64,
}

impl ScoredMember {
    /// Creates a new scored member.
    pub fn new(member: impl Into<Bytes>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// Address of a Redis or Sentinel server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedisNode {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl RedisNode {
    /// Creates a node address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for RedisNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A resolved command result, as returned by `close_pipeline`.
///
/// Typed operations convert into this with `From`, so a queued reply resolves
/// to the same value its direct counterpart would have returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (missing key, null reply).
    Nil,
    /// Status reply without payload.
    Ok,
    /// Boolean reply.
    Bool(bool),
    /// Integer reply.
    Int(i64),
    /// Floating point reply.
    Float(f64),
    /// Binary reply.
    Bytes(Bytes),
    /// Textual reply.
    Text(String),
    /// Sorted-set member with score.
    Scored(ScoredMember),
    /// Field/value pairs.
    Map(Vec<(Bytes, Bytes)>),
    /// Multiple values.
    Array(Vec<Value>),
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Ok
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<ScoredMember> for Value {
    fn from(v: ScoredMember) -> Self {
        Value::Scored(v)
    }
}

impl From<HashMap<Bytes, Bytes>> for Value {
    fn from(v: HashMap<Bytes, Bytes>) -> Self {
        Value::Map(v.into_iter().collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Position of a queued command's result in the list returned by
/// `close_pipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedReply {
    index: usize,
}

impl QueuedReply {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    /// Index of the resolved value.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Outcome of a command: a value in direct mode, a placeholder when
/// pipelined.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Reply<T> {
    /// The command ran and produced a value.
    Value(T),
    /// The command was queued; its value arrives with `close_pipeline`.
    Queued(QueuedReply),
}

impl<T> Reply<T> {
    /// Returns the direct value, failing if the command was queued.
    pub fn value(self) -> crate::Result<T> {
        match self {
            Reply::Value(v) => Ok(v),
            Reply::Queued(q) => Err(crate::Error::InvalidApiUsage {
                message: format!(
                    "reply {} is queued; read it from close_pipeline",
                    q.index()
                ),
            }),
        }
    }

    /// Returns the direct value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Reply::Value(v) => Some(v),
            Reply::Queued(_) => None,
        }
    }

    /// Returns true if the command was queued.
    pub fn is_queued(&self) -> bool {
        matches!(self, Reply::Queued(_))
    }

    /// Returns the queue slot of a pipelined command.
    pub fn queued(&self) -> Option<QueuedReply> {
        match self {
            Reply::Value(_) => None,
            Reply::Queued(q) => Some(*q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(()), Value::Ok);
        assert_eq!(Value::from(None::<Bytes>), Value::Nil);
        assert_eq!(
            Value::from(Some(Bytes::from("v"))),
            Value::Bytes(Bytes::from("v"))
        );
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_reply_value_of_queued_fails() {
        let reply: Reply<i64> = Reply::Queued(QueuedReply::new(3));
        assert!(reply.is_queued());
        assert_eq!(reply.queued().map(|q| q.index()), Some(3));
        let err = reply.value().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidApiUsage);
    }

    #[test]
    fn test_node_display() {
        assert_eq!(RedisNode::new("127.0.0.1", 1001).to_string(), "127.0.0.1:1001");
    }
}
