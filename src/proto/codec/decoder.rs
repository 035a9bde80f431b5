use bytes::{Buf, Bytes, BytesMut};

use crate::proto::frame::Frame;

const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024; // 512 MB default

/// Arrays nested deeper than this are rejected as malformed.
const MAX_DEPTH: usize = 64;

/// A streaming RESP decoder.
///
/// Call [`append`](Decoder::append) as bytes arrive and
/// [`decode`](Decoder::decode) to pull complete frames. Nothing is consumed
/// from the buffer until a whole frame, including every nested element, is
/// available. Elements already parsed out of an unfinished array are kept
/// between calls, so a large reply arriving in many reads is only scanned
/// once.
///
/// # Example
///
/// ```
/// use redbridge::proto::codec::Decoder;
/// use redbridge::proto::frame::Frame;
///
/// let mut decoder = Decoder::new();
/// decoder.append(b"+OK\r\n");
/// let frame = decoder.decode().unwrap().unwrap();
/// assert_eq!(frame, Frame::SimpleString(b"OK".to_vec()));
/// ```
#[derive(Debug)]
pub struct Decoder {
    buf: BytesMut,
    max_frame_size: usize,
    /// Offset of the next unparsed byte of the frame in progress.
    pos: usize,
    /// Arrays opened but not yet filled, innermost last.
    open: Vec<PartialArray>,
}

#[derive(Debug)]
struct PartialArray {
    remaining: usize,
    items: Vec<Frame>,
}

enum Parsed {
    Value(Frame),
    ArrayStart(usize),
}

impl Decoder {
    /// Creates a new decoder with an empty buffer.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Creates a new decoder with a custom maximum frame size.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_frame_size,
            pos: 0,
            open: Vec::new(),
        }
    }

    /// Appends raw bytes received from the network.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Attempts to decode one frame.
    ///
    /// Returns `Ok(None)` when more data is needed and an error string when
    /// the data is malformed.
    pub fn decode(&mut self) -> Result<Option<Frame>, String> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        if self.buf.len() > self.max_frame_size {
            return Err("Buffer size exceeded maximum frame size".to_string());
        }

        let result = self.resume();
        if result.is_err() {
            self.pos = 0;
            self.open.clear();
        }
        result
    }

    /// Continues the frame in progress from `self.pos`.
    fn resume(&mut self) -> Result<Option<Frame>, String> {
        loop {
            let (parsed, next) = match self.parse_one(self.pos)? {
                Some(found) => found,
                None => return Ok(None),
            };
            self.pos = next;

            let mut value = match parsed {
                Parsed::Value(frame) => frame,
                Parsed::ArrayStart(len) => {
                    if self.open.len() >= MAX_DEPTH {
                        return Err(format!("arrays nested deeper than {MAX_DEPTH} levels"));
                    }
                    self.open.push(PartialArray {
                        remaining: len,
                        items: Vec::with_capacity(len.min(1024)),
                    });
                    continue;
                }
            };

            loop {
                let Some(top) = self.open.last_mut() else {
                    self.buf.advance(self.pos);
                    self.pos = 0;
                    return Ok(Some(value));
                };
                top.items.push(value);
                top.remaining -= 1;
                if top.remaining > 0 {
                    break;
                }
                let done = self.open.pop().map(|a| a.items).unwrap_or_default();
                value = Frame::Array(done);
            }
        }
    }

    /// Parses one header at `pos`, returning either a complete scalar frame
    /// or the length of a non-empty array whose elements follow.
    fn parse_one(&self, pos: usize) -> Result<Option<(Parsed, usize)>, String> {
        let (line, next) = match self.line_at(pos) {
            Some(found) => found,
            None => return Ok(None),
        };
        if line.is_empty() {
            return Err("empty frame header".to_string());
        }
        let body = &line[1..];

        let frame = match line[0] {
            b'+' => Frame::SimpleString(body.to_vec()),
            b'-' => Frame::Error(body.to_vec()),
            b':' => Frame::Integer(parse_int(body)?),
            b'$' => {
                let len = parse_int(body)?;
                if len < 0 {
                    return Ok(Some((Parsed::Value(Frame::BulkString(None)), next)));
                }
                let len = len as usize;
                if len > self.max_frame_size {
                    return Err("Bulk string length exceeds maximum frame size".to_string());
                }
                if self.buf.len() < next + len + 2 {
                    return Ok(None);
                }
                let data = Bytes::copy_from_slice(&self.buf[next..next + len]);
                return Ok(Some((
                    Parsed::Value(Frame::BulkString(Some(data))),
                    next + len + 2,
                )));
            }
            b'*' => {
                let len = parse_int(body)?;
                if len < 0 {
                    return Ok(Some((Parsed::Value(Frame::Null), next)));
                }
                let len = len as usize;
                // Assume minimum 16 bytes per item
                if len > self.max_frame_size / 16 {
                    return Err("Array length exceeds reasonable maximum".to_string());
                }
                if len == 0 {
                    return Ok(Some((Parsed::Value(Frame::Array(Vec::new())), next)));
                }
                return Ok(Some((Parsed::ArrayStart(len), next)));
            }
            other => return Err(format!("unknown frame type: {}", other as char)),
        };
        Ok(Some((Parsed::Value(frame), next)))
    }

    /// Finds the CRLF-terminated line starting at `pos`.
    fn line_at(&self, pos: usize) -> Option<(&[u8], usize)> {
        let rest = self.buf.get(pos..)?;
        let end = rest.windows(2).position(|w| w == b"\r\n")?;
        Some((&rest[..end], pos + end + 2))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_int(raw: &[u8]) -> Result<i64, String> {
    std::str::from_utf8(raw)
        .map_err(|e| e.to_string())?
        .parse::<i64>()
        .map_err(|e| e.to_string())
}
