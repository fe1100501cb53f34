use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use pylon::handlers::{self, PathError};
use pylon::http::encoding::ContentEncoding;
use pylon::http::request::{Method, Request, RequestBuilder};
use pylon::http::response::StatusCode;
use pylon::router::Route;

fn get(target: &str) -> RequestBuilder {
    RequestBuilder::new().method(Method::GET).target(target)
}

fn post(target: &str, body: &[u8]) -> Request {
    RequestBuilder::new()
        .method(Method::POST)
        .target(target)
        .header("Content-Length", body.len().to_string())
        .body(body.to_vec())
        .build()
        .unwrap()
}

#[test]
fn test_root_probe() {
    let req = get("/").header("User-Agent", "x").build().unwrap();
    let response = handlers::root_probe(&req);

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"OK".to_vec());
}

#[test]
fn test_root_probe_echoes_version() {
    let req = get("/").version("HTTP/1.0").build().unwrap();

    assert_eq!(handlers::root_probe(&req).version, "HTTP/1.0");
}

#[test]
fn test_echo_plain() {
    let req = get("/echo/abc").build().unwrap();
    let response = handlers::echo(&req, "abc");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"abc".to_vec());
    assert_eq!(response.encoding, ContentEncoding::Identity);
}

#[test]
fn test_echo_gzip_round_trip() {
    let req = get("/echo/hello")
        .header("Accept-Encoding", "br, gzip")
        .build()
        .unwrap();
    let response = handlers::echo(&req, "hello");

    assert_eq!(response.encoding, ContentEncoding::Gzip);

    let encoded = response.encoding.encode(&response.body).unwrap();
    let mut decoded = String::new();
    GzDecoder::new(encoded.as_slice()).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, "hello");
}

#[test]
fn test_user_agent() {
    let req = get("/user-agent").header("User-Agent", "foo/1.0").build().unwrap();
    let response = handlers::user_agent(&req);

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"foo/1.0".to_vec());
}

#[test]
fn test_user_agent_missing_or_empty() {
    let missing = get("/user-agent").build().unwrap();
    assert_eq!(handlers::user_agent(&missing).status, StatusCode::BadRequest);

    let empty = get("/user-agent").header("User-Agent", "").build().unwrap();
    assert_eq!(handlers::user_agent(&empty).status, StatusCode::BadRequest);
    assert!(handlers::user_agent(&empty).body.is_empty());
}

#[tokio::test]
async fn test_file_read() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.bin"), [1u8, 2, 3]).unwrap();

    let req = get("/files/data.bin").build().unwrap();
    let response = handlers::file_read(&req, Some(dir.path()), "data.bin").await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(response.body, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_file_read_missing() {
    let dir = tempfile::tempdir().unwrap();
    let req = get("/files/doesnotexist").build().unwrap();

    let response = handlers::file_read(&req, Some(dir.path()), "doesnotexist").await;
    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_file_read_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let req = get("/files/sub").build().unwrap();

    let response = handlers::file_read(&req, Some(dir.path()), "sub").await;
    assert_eq!(response.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_file_read_without_directory() {
    let req = get("/files/a").build().unwrap();

    let response = handlers::file_read(&req, None, "a").await;
    assert_eq!(response.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_file_read_rejects_traversal() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(outer.path().join("secret"), b"x").unwrap();

    let req = get("/files/../secret").build().unwrap();
    let response = handlers::file_read(&req, Some(&root), "../secret").await;
    assert_eq!(response.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_file_write_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let req = post("/files/test.txt", b"hello");

    let response = handlers::file_write(&req, Some(dir.path()), "test.txt").await;

    assert_eq!(response.status, StatusCode::Created);
    assert!(response.body.is_empty());
    assert_eq!(std::fs::read(dir.path().join("test.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_file_write_truncates_existing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f"), b"a much longer original").unwrap();
    let req = post("/files/f", b"short");

    let response = handlers::file_write(&req, Some(dir.path()), "f").await;

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(std::fs::read(dir.path().join("f")).unwrap(), b"short");
}

#[tokio::test]
async fn test_file_write_missing_parent() {
    let dir = tempfile::tempdir().unwrap();
    let req = post("/files/no/such/dir.txt", b"x");

    let response = handlers::file_write(&req, Some(dir.path()), "no/such/dir.txt").await;
    assert_eq!(response.status, StatusCode::InternalServerError);
}

#[tokio::test]
async fn test_file_write_without_directory() {
    let req = post("/files/a", b"x");

    let response = handlers::file_write(&req, None, "a").await;
    assert_eq!(response.status, StatusCode::InternalServerError);
}

#[tokio::test]
async fn test_file_write_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let req = post("/files/", b"hi");

    let response = handlers::file_write(&req, Some(dir.path()), "").await;

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert!(response.body.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_file_write_rejects_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let req = post("/files/../escape", b"x");

    let response = handlers::file_write(&req, Some(dir.path()), "../escape").await;
    assert_eq!(response.status, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_file_write_without_body() {
    let dir = tempfile::tempdir().unwrap();
    let req = RequestBuilder::new()
        .method(Method::POST)
        .target("/files/a")
        .build()
        .unwrap();

    let response = handlers::file_write(&req, Some(dir.path()), "a").await;
    assert_eq!(response.status, StatusCode::BadRequest);
    assert!(!dir.path().join("a").exists());
}

#[tokio::test]
async fn test_dispatch_fallbacks() {
    let req = get("/nope").build().unwrap();
    assert_eq!(
        handlers::dispatch(&Route::NotFound, &req, None).await.status,
        StatusCode::NotFound
    );

    let req = RequestBuilder::new()
        .method(Method::PATCH)
        .target("/")
        .build()
        .unwrap();
    assert_eq!(
        handlers::dispatch(&Route::MethodNotAllowed, &req, None).await.status,
        StatusCode::MethodNotAllowed
    );
}

#[test]
fn test_resolve_file_path() {
    let root = Path::new("/srv/files");

    assert_eq!(
        handlers::resolve_file_path(Some(root), "a.txt").unwrap(),
        root.join("a.txt")
    );
    assert_eq!(
        handlers::resolve_file_path(Some(root), "nested/a.txt").unwrap(),
        root.join("nested/a.txt")
    );
    assert_eq!(
        handlers::resolve_file_path(None, "a.txt"),
        Err(PathError::NoDirectory)
    );
    assert_eq!(
        handlers::resolve_file_path(Some(root), ""),
        Err(PathError::EmptyName)
    );
    assert!(matches!(
        handlers::resolve_file_path(Some(root), "../etc/passwd"),
        Err(PathError::Escapes(_))
    ));
    assert!(matches!(
        handlers::resolve_file_path(Some(root), "a/../../b"),
        Err(PathError::Escapes(_))
    ));
    assert!(matches!(
        handlers::resolve_file_path(Some(root), "/etc/passwd"),
        Err(PathError::Escapes(_))
    ));
}
