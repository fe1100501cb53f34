//! Maps a request's method and target onto one of the fixed routes.

use crate::http::request::Method;

const ECHO_PREFIX: &str = "/echo/";
const FILES_PREFIX: &str = "/files/";

/// A resolved route. Path suffixes are taken verbatim from the target, with
/// no percent-decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /`
    RootProbe,
    /// `GET /echo/{message}`
    Echo(String),
    /// `GET /user-agent`
    UserAgent,
    /// `GET /files/{name}`
    FileRead(String),
    /// `POST /files/{name}`
    FileWrite(String),
    /// Any other GET target
    NotFound,
    /// Any other method, or a POST outside `/files/`
    MethodNotAllowed,
}

impl Route {
    /// Resolves a route. Rules are checked in order and the first match wins.
    ///
    /// # Example
    ///
    /// ```
    /// # use pylon::http::request::Method;
    /// # use pylon::router::Route;
    /// assert_eq!(Route::resolve(&Method::GET, "/"), Route::RootProbe);
    /// assert_eq!(Route::resolve(&Method::GET, "/echo/hi"), Route::Echo("hi".to_string()));
    /// assert_eq!(Route::resolve(&Method::PATCH, "/"), Route::MethodNotAllowed);
    /// ```
    pub fn resolve(method: &Method, target: &str) -> Self {
        match method {
            Method::GET => {
                if target == "/" {
                    Route::RootProbe
                } else if let Some(message) = target.strip_prefix(ECHO_PREFIX) {
                    Route::Echo(message.to_string())
                } else if target == "/user-agent" {
                    Route::UserAgent
                } else if let Some(name) = target.strip_prefix(FILES_PREFIX) {
                    Route::FileRead(name.to_string())
                } else {
                    Route::NotFound
                }
            }
            Method::POST => match target.strip_prefix(FILES_PREFIX) {
                Some(name) => Route::FileWrite(name.to_string()),
                None => Route::MethodNotAllowed,
            },
            _ => Route::MethodNotAllowed,
        }
    }

    /// Whether the request body must be read before handling.
    pub fn requires_body(&self) -> bool {
        matches!(self, Route::FileWrite(_))
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Route::RootProbe => "root",
            Route::Echo(_) => "echo",
            Route::UserAgent => "user-agent",
            Route::FileRead(_) => "file-read",
            Route::FileWrite(_) => "file-write",
            Route::NotFound => "not-found",
            Route::MethodNotAllowed => "method-not-allowed",
        }
    }
}
