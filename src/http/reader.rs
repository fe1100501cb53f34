use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Initial capacity of the per-connection read buffer
const BUFFER_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The peer closed the stream before the requested data arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Buffered reader over a single client connection.
///
/// Bytes pulled off the stream but not yet handed out stay in the buffer,
/// so a header read that over-fetches into the body does not lose data.
pub struct ConnectionReader<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S> ConnectionReader<S>
where
    S: AsyncRead + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(BUFFER_SIZE),
        }
    }

    /// Reads one line terminated by `\n`.
    ///
    /// The terminator and a preceding `\r`, if any, are stripped. Bytes that
    /// are not valid UTF-8 are replaced rather than rejected.
    ///
    /// Returns `ReadError::ConnectionClosed` if the stream ends before a
    /// terminator is seen, even when a partial line was buffered.
    pub async fn read_line(&mut self) -> Result<String, ReadError> {
        let mut scanned = 0;

        loop {
            if let Some(pos) = self.buffer[scanned..].iter().position(|b| *b == b'\n') {
                let line = self.buffer.split_to(scanned + pos + 1);
                let mut content = &line[..line.len() - 1];
                if content.last() == Some(&b'\r') {
                    content = &content[..content.len() - 1];
                }
                return Ok(String::from_utf8_lossy(content).into_owned());
            }

            scanned = self.buffer.len();
            self.fill().await?;
        }
    }

    /// Reads exactly `n` bytes, waiting for as many stream reads as needed.
    pub async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        while self.buffer.len() < n {
            self.fill().await?;
        }

        let mut body = vec![0u8; n];
        self.buffer.copy_to_slice(&mut body);
        Ok(body)
    }

    /// Number of bytes read off the stream but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Access to the underlying stream, e.g. to write the response.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    async fn fill(&mut self) -> Result<(), ReadError> {
        let n = self.stream.read_buf(&mut self.buffer).await?;

        if n == 0 {
            return Err(ReadError::ConnectionClosed);
        }

        Ok(())
    }
}
