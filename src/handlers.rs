//! Route handlers.
//!
//! Each handler turns a parsed request into a [`Response`]. File handlers
//! resolve names against the serving directory and never let a name climb
//! out of it.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::http::encoding::ContentEncoding;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::router::Route;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("no serving directory configured")]
    NoDirectory,

    #[error("empty file name")]
    EmptyName,

    #[error("file name {0:?} escapes the serving directory")]
    Escapes(String),
}

/// Runs the handler for `route`.
///
/// Body-bearing routes expect `request.body` to have been read already.
pub async fn dispatch(route: &Route, request: &Request, directory: Option<&Path>) -> Response {
    match route {
        Route::RootProbe => root_probe(request),
        Route::Echo(message) => echo(request, message),
        Route::UserAgent => user_agent(request),
        Route::FileRead(name) => file_read(request, directory, name).await,
        Route::FileWrite(name) => file_write(request, directory, name).await,
        Route::NotFound => not_found(request),
        Route::MethodNotAllowed => method_not_allowed(request),
    }
}

pub fn root_probe(request: &Request) -> Response {
    Response::text(StatusCode::Ok, "OK")
        .version(&request.version)
        .build()
}

/// Echoes `message` back, gzip-encoded when the client accepts it.
pub fn echo(request: &Request, message: &str) -> Response {
    let encoding = ContentEncoding::negotiate(request.header("Accept-Encoding"));

    Response::text(StatusCode::Ok, message)
        .version(&request.version)
        .encoding(encoding)
        .build()
}

pub fn user_agent(request: &Request) -> Response {
    match request.header("User-Agent") {
        Some(agent) if !agent.is_empty() => Response::text(StatusCode::Ok, agent)
            .version(&request.version)
            .build(),
        _ => status_only(request, StatusCode::BadRequest),
    }
}

/// Reads a whole file from the serving directory.
///
/// Every failure (missing file, directory, permissions, rejected name) is
/// answered with 404.
pub async fn file_read(request: &Request, directory: Option<&Path>, name: &str) -> Response {
    let path = match resolve_file_path(directory, name) {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "Rejected file read");
            return status_only(request, StatusCode::NotFound);
        }
    };

    match tokio::fs::read(&path).await {
        Ok(contents) => {
            debug!(path = %path.display(), bytes = contents.len(), "Serving file");
            ResponseBuilder::new(StatusCode::Ok)
                .version(&request.version)
                .header("Content-Type", "application/octet-stream")
                .body(contents)
                .build()
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "File not readable");
            status_only(request, StatusCode::NotFound)
        }
    }
}

/// Writes the request body to a file, creating or truncating it.
pub async fn file_write(request: &Request, directory: Option<&Path>, name: &str) -> Response {
    let Some(body) = request.body.as_deref() else {
        return status_only(request, StatusCode::BadRequest);
    };

    let path = match resolve_file_path(directory, name) {
        Ok(path) => path,
        Err(PathError::NoDirectory) => {
            warn!("File write without a serving directory");
            return status_only(request, StatusCode::InternalServerError);
        }
        Err(PathError::EmptyName) => {
            warn!("File write without a file name");
            return status_only(request, StatusCode::InternalServerError);
        }
        Err(e) => {
            warn!(error = %e, "Rejected file write");
            return status_only(request, StatusCode::BadRequest);
        }
    };

    match tokio::fs::write(&path, body).await {
        Ok(()) => {
            debug!(path = %path.display(), bytes = body.len(), "File written");
            status_only(request, StatusCode::Created)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "File write failed");
            status_only(request, StatusCode::InternalServerError)
        }
    }
}

pub fn not_found(request: &Request) -> Response {
    status_only(request, StatusCode::NotFound)
}

pub fn method_not_allowed(request: &Request) -> Response {
    status_only(request, StatusCode::MethodNotAllowed)
}

/// Joins `name` onto the serving directory.
///
/// Only plain name components are accepted; `..`, absolute paths and
/// drive prefixes are rejected so the result always stays under
/// `directory`.
pub fn resolve_file_path(directory: Option<&Path>, name: &str) -> Result<PathBuf, PathError> {
    let directory = directory.ok_or(PathError::NoDirectory)?;
    if name.is_empty() {
        return Err(PathError::EmptyName);
    }

    let relative = Path::new(name);

    let confined = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if !confined {
        return Err(PathError::Escapes(name.to_string()));
    }

    Ok(directory.join(relative))
}

fn status_only(request: &Request, status: StatusCode) -> Response {
    Response::status(status).version(&request.version).build()
}
