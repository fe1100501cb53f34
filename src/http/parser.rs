use std::collections::HashMap;

use tokio::io::AsyncRead;

use crate::http::reader::{ConnectionReader, ReadError};
use crate::http::request::{Method, Request};
use crate::http::response::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Request line did not split into exactly method, target and version.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("missing or invalid Content-Length")]
    MalformedContentLength,

    #[error("body shorter than Content-Length of {expected} bytes")]
    BodyReadShort {
        expected: usize,
        #[source]
        source: ReadError,
    },

    /// The connection failed before the request head was complete.
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl ParseError {
    /// Status to answer with, or `None` when the connection is unusable and
    /// should simply be closed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ParseError::MalformedRequestLine(_) => Some(StatusCode::BadRequest),
            ParseError::MalformedContentLength => Some(StatusCode::BadRequest),
            ParseError::BodyReadShort { .. } => Some(StatusCode::InternalServerError),
            ParseError::Read(_) => None,
        }
    }
}

/// Splits a request line on whitespace into method, target and version.
pub fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        [method, target, version] => Ok((
            Method::from_token(method),
            target.to_string(),
            version.to_string(),
        )),
        _ => Err(ParseError::MalformedRequestLine(line.to_string())),
    }
}

/// Splits a header line on the first `": "`.
///
/// Returns `None` for lines without the separator; callers skip those.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Reads the request line and headers off the connection.
///
/// The body is left unread in the connection buffer; only body-bearing
/// routes consume it through [`read_body`].
pub async fn parse_request<S>(reader: &mut ConnectionReader<S>) -> Result<Request, ParseError>
where
    S: AsyncRead + Unpin,
{
    let request_line = reader.read_line().await?;
    let (method, target, version) = parse_request_line(&request_line)?;

    // Headers
    let mut headers = HashMap::new();

    loop {
        let line = reader.read_line().await?;
        let line = line.trim();

        if line.is_empty() {
            break;
        }

        match parse_header_line(line) {
            Some((key, value)) => {
                headers.insert(key.to_string(), value.to_string());
            }
            None => {
                tracing::trace!(line = %line, "Skipping malformed header line");
            }
        }
    }

    Ok(Request {
        method,
        target,
        version,
        headers,
        body: None,
    })
}

/// Reads exactly `Content-Length` bytes and attaches them as the body.
pub async fn read_body<S>(
    reader: &mut ConnectionReader<S>,
    request: Request,
) -> Result<Request, ParseError>
where
    S: AsyncRead + Unpin,
{
    let expected = request
        .content_length()
        .ok_or(ParseError::MalformedContentLength)?;

    let body = reader
        .read_exact(expected)
        .await
        .map_err(|source| ParseError::BodyReadShort { expected, source })?;

    Ok(request.with_body(body))
}
