use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{is_framing_header, Response};

/// Serializes a response into its exact wire form.
///
/// Layout: status line, stored headers in order, `Content-Length` computed
/// from the encoded body, `Content-Encoding` when the body is encoded, a
/// blank line, then the body.
pub fn serialize_response(resp: &Response) -> std::io::Result<Vec<u8>> {
    let body = resp.encoding.encode(&resp.body)?;
    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers.iter().filter(|(k, _)| !is_framing_header(k)) {
        write_header(&mut buf, k, v);
    }
    write_header(&mut buf, "Content-Length", &body.len().to_string());
    if let Some(encoding) = resp.encoding.header_value() {
        write_header(&mut buf, "Content-Encoding", encoding);
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&body);

    Ok(buf)
}

fn write_header(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> std::io::Result<Self> {
        Ok(Self {
            buffer: serialize_response(response)?,
            written: 0,
        })
    }

    /// Writes the whole response, flushes, then shuts down the write half.
    ///
    /// A failed write is not retried.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        stream.shutdown().await?;

        Ok(())
    }
}
