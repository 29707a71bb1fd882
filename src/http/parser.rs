use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::http::request::{CONTENT_LENGTH, PathMatch, Request, Version};

static REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^ ]+) ([^ ]+) HTTP/([0-9]\.[0-9])$").expect("request line grammar compiles")
});

static HEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]*): ?(.*)$").expect("header grammar compiles"));

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parses a request head from the front of `buf`.
///
/// Returns the request and the number of bytes consumed, terminator included.
/// Bytes past the terminator belong to the body or to the next pipelined
/// request and are left for the caller. `ParseError::Incomplete` means the
/// terminator has not arrived yet.
pub fn parse_request_head(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let head_end = find_head_end(buf).ok_or(ParseError::Incomplete)?;
    let head = std::str::from_utf8(&buf[..head_end]).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let caps = REQUEST_LINE
        .captures(request_line)
        .ok_or_else(|| ParseError::InvalidRequestLine(request_line.to_string()))?;
    let version: Version = caps[3]
        .parse()
        .map_err(|_| ParseError::InvalidRequestLine(request_line.to_string()))?;

    // Headers, up to the first line that is not `Name: value`
    let mut headers = HashMap::new();
    for line in lines {
        let Some(header) = HEADER_LINE.captures(line) else {
            break;
        };
        headers.insert(header[1].to_string(), header[2].to_string());
    }

    if let Some(length) = headers.get(CONTENT_LENGTH) {
        if length.trim().parse::<usize>().is_err() {
            return Err(ParseError::InvalidContentLength(length.clone()));
        }
    }

    let request = Request {
        method: caps[1].to_string(),
        path: caps[2].to_string(),
        version,
        headers,
        body: None,
        path_match: PathMatch::default(),
    };

    Ok((request, head_end + HEAD_TERMINATOR.len()))
}

/// Offset of the `\r\n\r\n` that ends the head, if buffered.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}
