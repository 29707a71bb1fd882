//! Error types
//!
//! Library code reports failures through these enums; the binary and the
//! server start-up path wrap them in `anyhow`.

use std::io;

use thiserror::Error;

/// Failure to turn buffered bytes into a request head.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The header terminator has not arrived yet.
    #[error("incomplete request head")]
    Incomplete,

    /// The request line does not match `METHOD SP PATH SP HTTP/VERSION`.
    #[error("malformed request line: {0:?}")]
    InvalidRequestLine(String),

    #[error("invalid Content-Length value: {0:?}")]
    InvalidContentLength(String),

    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
}

/// Reasons a connection is torn down.
///
/// None of these are answered with a response; the connection is simply
/// closed and sibling connections are unaffected.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[source] ParseError),

    #[error("request head exceeds {limit} bytes")]
    HeadersTooLarge { limit: usize },

    #[error("declared body of {length} bytes exceeds {limit}")]
    BodyTooLarge { length: usize, limit: usize },

    #[error("connection ended after {received} of {expected} body bytes")]
    IncompleteBody { expected: usize, received: usize },

    #[error("read timed out")]
    ReadTimeout,

    #[error("connection closed while writing")]
    WriteZero,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ParseError> for ConnectionError {
    fn from(err: ParseError) -> Self {
        ConnectionError::MalformedRequest(err)
    }
}

/// Registration failures.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("port must be in 1..=65535, got {0}")]
    InvalidPort(u32),

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}
