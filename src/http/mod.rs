//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per connection, no
//! keep-alive, no chunked transfer encoding.
//!
//! # Architecture
//!
//! - **`reader`**: Buffers bytes from the socket; reads lines and exact-length bodies
//! - **`parser`**: Turns the request line and headers into a [`request::Request`]
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`encoding`**: Identity or gzip body encoding
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: The per-connection state machine tying it all together
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Request line + headers
//!        └──────┬──────┘
//!               │ Head parsed          (EOF / socket error → Closed)
//!               ▼                      (bad request line → Writing 400)
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Route, read body if needed, run handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response, shut down write half
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod encoding;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
