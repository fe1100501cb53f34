use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::handlers;
use crate::http::parser::{parse_request, read_body, ParseError};
use crate::http::reader::ConnectionReader;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::Route;

/// Version used when the request line could not be parsed.
const FALLBACK_VERSION: &str = "HTTP/1.1";

/// One client connection, handled for exactly one request.
pub struct Connection<S> {
    reader: ConnectionReader<S>,
    config: Arc<Config>,
    state: ConnectionState,
}

pub enum ConnectionState {
    /// Reading the request line and headers
    Reading,
    /// Resolving the route, reading the body if needed, running the handler
    Dispatching(Request),
    Writing(ResponseWriter),
    Closed,
}

impl ConnectionState {
    fn name(&self) -> &'static str {
        match self {
            ConnectionState::Reading => "reading",
            ConnectionState::Dispatching(_) => "dispatching",
            ConnectionState::Writing(_) => "writing",
            ConnectionState::Closed => "closed",
        }
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        Self {
            reader: ConnectionReader::new(stream),
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection until it is closed.
    ///
    /// Socket errors while writing are returned; nothing more is sent.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            trace!(state = self.state.name(), "Connection state");

            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => self.read_request().await,

                ConnectionState::Dispatching(request) => self.dispatch(request).await,

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(self.reader.get_mut()).await?;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request(&mut self) -> ConnectionState {
        match parse_request(&mut self.reader).await {
            Ok(request) => ConnectionState::Dispatching(request),
            Err(e) => Self::reject(e, FALLBACK_VERSION),
        }
    }

    async fn dispatch(&mut self, request: Request) -> ConnectionState {
        let route = Route::resolve(&request.method, &request.target);

        let request = if route.requires_body() {
            let version = request.version.clone();
            match read_body(&mut self.reader, request).await {
                Ok(request) => request,
                Err(e) => return Self::reject(e, &version),
            }
        } else {
            request
        };

        let response =
            handlers::dispatch(&route, &request, self.config.directory.as_deref()).await;

        debug!(
            method = %request.method,
            target = %request.target,
            route = route.name(),
            status = response.status.as_u16(),
            unread = self.reader.buffered(),
            "Request handled"
        );

        Self::respond(&response)
    }

    /// Turns a parse failure into an error response, or closes outright when
    /// the socket is no longer usable.
    fn reject(error: ParseError, version: &str) -> ConnectionState {
        match error.status() {
            Some(status) => {
                warn!(error = %error, status = status.as_u16(), "Rejecting request");
                let response = Response::status(status).version(version).build();
                Self::respond(&response)
            }
            None => {
                debug!(error = %error, "Connection closed before request completed");
                ConnectionState::Closed
            }
        }
    }

    fn respond(response: &Response) -> ConnectionState {
        match ResponseWriter::new(response) {
            Ok(writer) => ConnectionState::Writing(writer),
            Err(e) => {
                warn!(error = %e, "Failed to encode response body");
                ConnectionState::Closed
            }
        }
    }
}
