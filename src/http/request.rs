use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::buf::Reader;
use bytes::{Buf, Bytes};

/// Header carrying the exact body length. Looked up with an exact key match.
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONNECTION: &str = "Connection";

/// HTTP protocol version as `major.minor`, one digit each.
///
/// Ordering is numeric, so `1.1 > 1.0` and `2.0 > 1.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
    pub const HTTP_11: Version = Version { major: 1, minor: 1 };
}

impl Default for Version {
    fn default() -> Self {
        Version::HTTP_11
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = ();

    /// Parses the token after `HTTP/`, e.g. `"1.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
                Ok(Version {
                    major: u16::from(major - b'0'),
                    minor: u16::from(minor - b'0'),
                })
            }
            _ => Err(()),
        }
    }
}

/// Capture groups produced by matching the winning route pattern against the
/// request path.
///
/// Group 0 is always the whole path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    groups: Vec<Option<String>>,
    names: Vec<Option<String>>,
}

impl PathMatch {
    pub fn from_captures(regex: &regex::Regex, caps: &regex::Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let names = regex
            .capture_names()
            .map(|name| name.map(str::to_string))
            .collect();
        Self { groups, names }
    }

    /// Positional capture, `None` if the group did not participate.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Named capture, e.g. `(?P<id>\d+)`.
    pub fn name(&self, name: &str) -> Option<&str> {
        let index = self
            .names
            .iter()
            .position(|n| n.as_deref() == Some(name))?;
        self.get(index)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Populated by the parser, given a body by the body reader when a
/// `Content-Length` was declared, and handed read-only to the route handler.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Method token exactly as sent (`GET`, `POST`, ...)
    pub method: String,
    /// Request target as sent, query string included
    pub path: String,
    pub version: Version,
    /// Header names are kept as written; a repeated name keeps the last value
    pub headers: HashMap<String, String>,
    /// Present only when the request declared a body length
    pub body: Option<Bytes>,
    /// Captures of the route pattern that matched `path`
    pub path_match: PathMatch,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Version,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version,
            headers: self.headers,
            body: self.body,
            path_match: PathMatch::default(),
        })
    }
}

impl Request {
    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Declared body length, `None` if the header is absent or not a number.
    pub fn content_length(&self) -> Option<usize> {
        self.header(CONTENT_LENGTH)?.trim().parse().ok()
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// An explicit `Connection: close` or `Connection: keep-alive` wins;
    /// otherwise versions above 1.0 keep the connection alive.
    pub fn keep_alive(&self) -> bool {
        match self.header(CONNECTION).map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version > Version::HTTP_10,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Readable view over the body; empty when no body was sent.
    pub fn body_reader(&self) -> Reader<Bytes> {
        self.body.clone().unwrap_or_default().reader()
    }

    /// Writes the request line and headers back out in wire format.
    pub fn serialize_head(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(
            format!("{} {} HTTP/{}\r\n", self.method, self.path, self.version).as_bytes(),
        );
        for (key, value) in &self.headers {
            buf.extend_from_slice(key.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");
        buf
    }
}
