//! Pylon - minimal HTTP/1.1 server
//!
//! Core library: wire protocol, routing, handlers and the accept loop.

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
