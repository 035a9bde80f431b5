use bytes::{BufMut, Bytes, BytesMut};

use crate::proto::frame::Frame;

/// A RESP encoder that accumulates frames in an internal buffer.
///
/// Several commands can be encoded back to back before the buffer is taken,
/// which is how pipelined commands are batched into a single write.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use redbridge::proto::codec::Encoder;
///
/// let mut encoder = Encoder::new();
/// encoder.encode_command(&[Bytes::from("PING")]);
/// assert_eq!(encoder.take().as_ref(), b"*1\r\n$4\r\nPING\r\n");
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Creates a new encoder with an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Encodes a command as an array of bulk strings.
    pub fn encode_command(&mut self, args: &[Bytes]) {
        self.put_header(b'*', args.len() as i64);
        for arg in args {
            self.put_bulk(arg);
        }
    }

    /// Encodes an arbitrary frame.
    pub fn encode(&mut self, frame: &Frame) {
        match frame {
            Frame::SimpleString(s) => self.put_line(b'+', s),
            Frame::Error(e) => self.put_line(b'-', e),
            Frame::Integer(n) => self.put_header(b':', *n),
            Frame::BulkString(Some(data)) => self.put_bulk(data),
            Frame::BulkString(None) => self.put_header(b'$', -1),
            Frame::Array(items) => {
                self.put_header(b'*', items.len() as i64);
                for item in items {
                    self.encode(item);
                }
            }
            Frame::Null => self.put_header(b'*', -1),
        }
    }

    /// Number of encoded bytes waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Takes the encoded data from the buffer, leaving it empty.
    pub fn take(&mut self) -> BytesMut {
        self.buf.split()
    }

    fn put_bulk(&mut self, data: &[u8]) {
        self.put_header(b'$', data.len() as i64);
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
    }

    fn put_header(&mut self, marker: u8, n: i64) {
        self.buf.put_u8(marker);
        self.buf.extend_from_slice(n.to_string().as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    fn put_line(&mut self, marker: u8, line: &[u8]) {
        self.buf.put_u8(marker);
        self.buf.extend_from_slice(line);
        self.buf.extend_from_slice(b"\r\n");
    }
}
