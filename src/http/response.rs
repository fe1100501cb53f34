use crate::http::encoding::ContentEncoding;

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): Request successful
/// - `Created` (201): File written
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `MethodNotAllowed` (405): Method/route combination not routed
/// - `InternalServerError` (500): Body or file I/O failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pylon::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pylon::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete HTTP response ready to be serialized.
///
/// `headers` keeps insertion order. `Content-Length` and `Content-Encoding`
/// are never stored here; the writer derives them from `body` and
/// `encoding` at serialization time.
#[derive(Debug)]
pub struct Response {
    /// Version token echoed in the status line
    pub version: String,
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    /// Unencoded body bytes
    pub body: Vec<u8>,
    pub encoding: ContentEncoding,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/octet-stream")
///     .body(bytes)
///     .build();
/// ```
pub struct ResponseBuilder {
    version: String,
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    encoding: ContentEncoding,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            headers: Vec::new(),
            body: Vec::new(),
            encoding: ContentEncoding::Identity,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds a header, or replaces the value of an existing header with the
    /// same name in place.
    ///
    /// Framing headers (`Content-Length`, `Content-Encoding`) are ignored.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        if is_framing_header(&key) {
            return self;
        }

        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn encoding(mut self, encoding: ContentEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn build(self) -> Response {
        Response {
            version: self.version,
            status: self.status,
            headers: self.headers,
            body: self.body,
            encoding: self.encoding,
        }
    }
}

impl Response {
    /// A `text/plain` response with the given body.
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> ResponseBuilder {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(body)
    }

    /// A `text/plain` response with an empty body.
    pub fn status(status: StatusCode) -> ResponseBuilder {
        Self::text(status, Vec::new())
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::text(StatusCode::Ok, body).build()
    }

    pub fn bad_request() -> Self {
        Self::status(StatusCode::BadRequest).build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::status(StatusCode::NotFound).build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::status(StatusCode::InternalServerError).build()
    }

    /// Looks up a stored header by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) fn is_framing_header(key: &str) -> bool {
    key.eq_ignore_ascii_case("Content-Length") || key.eq_ignore_ascii_case("Content-Encoding")
}
