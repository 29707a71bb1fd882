//! minihttpd - embeddable HTTP/1.x server engine
//!
//! Incremental request parsing, regex route resolution with a default
//! fallback table, and keep-alive connections served on a fixed worker pool.

pub mod config;
pub mod error;
pub mod http;
pub mod router;
pub mod server;
