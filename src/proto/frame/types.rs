use bytes::Bytes;

/// A RESP2 reply or request frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Simple string (+OK).
    SimpleString(Vec<u8>),
    /// Error (-ERR).
    Error(Vec<u8>),
    /// Integer (:1000).
    Integer(i64),
    /// Bulk string ($6\r\nfoobar). `None` is the RESP2 null bulk string.
    BulkString(Option<Bytes>),
    /// Array (*2\r\n...).
    Array(Vec<Frame>),
    /// Null array (*-1).
    Null,
}

impl Frame {
    /// Builds a bulk string frame.
    #[inline]
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Frame::BulkString(Some(data.into()))
    }

    /// Builds a simple string frame.
    #[inline]
    pub fn simple(data: &str) -> Self {
        Frame::SimpleString(data.as_bytes().to_vec())
    }

    /// The `+OK` status reply.
    #[inline]
    pub fn ok() -> Self {
        Frame::simple("OK")
    }

    /// Returns true for both null representations.
    pub fn is_null(&self) -> bool {
        matches!(self, Frame::Null | Frame::BulkString(None))
    }

    /// Returns true if this frame is a server error.
    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error(_))
    }

    /// Converts an error frame into [`crate::Error::Server`], passing every
    /// other frame through.
    pub fn into_result(self) -> crate::Result<Frame> {
        match self {
            Frame::Error(e) => Err(crate::Error::server(&e)),
            other => Ok(other),
        }
    }
}
