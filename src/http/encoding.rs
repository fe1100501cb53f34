//! Response body encodings.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// How a response body is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    /// Body bytes are sent as-is
    #[default]
    Identity,
    /// Body is gzip-compressed and `Content-Encoding: gzip` is sent
    Gzip,
}

impl ContentEncoding {
    /// Picks an encoding from an `Accept-Encoding` header value.
    ///
    /// Any occurrence of `gzip` in the value selects gzip; q-values are not
    /// interpreted.
    pub fn negotiate(accept_encoding: Option<&str>) -> Self {
        match accept_encoding {
            Some(value) if value.contains("gzip") => ContentEncoding::Gzip,
            _ => ContentEncoding::Identity,
        }
    }

    /// Value of the `Content-Encoding` header, if one is sent.
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            ContentEncoding::Identity => None,
            ContentEncoding::Gzip => Some("gzip"),
        }
    }

    pub fn encode(&self, body: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Identity => Ok(body.to_vec()),
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}
