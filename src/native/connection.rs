use std::fmt;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::proto::codec::{Decoder, Encoder};
use crate::proto::frame::Frame;

/// A framed RESP connection over an async byte stream.
///
/// Commands are encoded into an internal buffer; [`send_command`] flushes
/// immediately while [`buffer_command`] only appends, so a batch of
/// pipelined commands leaves in one write on the next [`flush`].
///
/// [`send_command`]: Connection::send_command
/// [`buffer_command`]: Connection::buffer_command
/// [`flush`]: Connection::flush
pub struct Connection<S> {
    stream: S,
    decoder: Decoder,
    encoder: Encoder,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection with the given stream and no timeouts.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: Decoder::new(),
            encoder: Encoder::new(),
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Configures read and write timeouts for this connection.
    pub fn with_timeouts(
        mut self,
        read_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
    ) -> Self {
        self.read_timeout = read_timeout;
        self.write_timeout = write_timeout;
        self
    }

    /// Encodes a command into the write buffer without sending it.
    pub fn buffer_command(&mut self, args: &[Bytes]) {
        self.encoder.encode_command(args);
    }

    /// Encodes a command and writes everything buffered so far.
    pub async fn send_command(&mut self, args: &[Bytes]) -> crate::Result<()> {
        self.buffer_command(args);
        self.flush().await
    }

    /// Writes all buffered commands to the stream.
    pub async fn flush(&mut self) -> crate::Result<()> {
        if self.encoder.pending() == 0 {
            return Ok(());
        }
        let data = self.encoder.take();
        let limit = self.write_timeout;
        let write = async {
            self.stream.write_all(&data).await?;
            self.stream.flush().await
        };
        match limit {
            Some(limit) => tokio::time::timeout(limit, write)
                .await
                .map_err(|_| timeout_error(limit))??,
            None => write.await?,
        }
        Ok(())
    }

    /// Reads one complete reply frame, honouring the read timeout.
    pub async fn read_frame(&mut self) -> crate::Result<Frame> {
        let limit = self.read_timeout;
        match limit {
            Some(limit) => tokio::time::timeout(limit, self.read_frame_inner())
                .await
                .map_err(|_| timeout_error(limit))?,
            None => self.read_frame_inner().await,
        }
    }

    async fn read_frame_inner(&mut self) -> crate::Result<Frame> {
        let mut buf = [0u8; 4096];
        loop {
            if let Some(frame) = self.decoder.decode().map_err(crate::Error::protocol)? {
                return Ok(frame);
            }
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by server");
                return Err(eof.into());
            }
            self.decoder.append(&buf[..n]);
        }
    }

    /// Shuts down the write half of the stream.
    pub async fn shutdown(&mut self) -> crate::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn timeout_error(limit: Duration) -> crate::Error {
    crate::Error::Timeout {
        millis: limit.as_millis() as u64,
    }
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending_bytes", &self.encoder.pending())
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}
