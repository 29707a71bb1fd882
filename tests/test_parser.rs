use minihttpd::error::ParseError;
use minihttpd::http::parser::parse_request_head;
use minihttpd::http::request::Version;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, "GET");
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, Version::HTTP_11);
    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert!(parsed.body.is_none());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.headers.len(), 3);
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.path, "/search?q=rust");
}

#[test]
fn test_parse_arbitrary_method_token() {
    let req = b"PURGE /cache HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, "PURGE");
}

#[test]
fn test_parse_http10_version() {
    let req = b"GET / HTTP/1.0\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.version, Version::HTTP_10);
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";

    assert_eq!(parse_request_head(req).unwrap_err(), ParseError::Incomplete);
}

#[test]
fn test_parse_malformed_request_line() {
    for req in [
        &b"GARBAGE\r\n\r\n"[..],
        b"GET /\r\n\r\n",
        b"GET / HTTP/x.y\r\n\r\n",
        b"GET / HTTP/1.01\r\n\r\n",
        b"GET / HTTP/01.1\r\n\r\n",
        b"GET  / HTTP/1.1\r\n\r\n",
        b"\r\n\r\n",
    ] {
        let result = parse_request_head(req);
        assert!(
            matches!(result, Err(ParseError::InvalidRequestLine(_))),
            "{:?} parsed as {:?}",
            String::from_utf8_lossy(req),
            result
        );
    }
}

#[test]
fn test_parse_header_space_is_optional() {
    let req = b"GET / HTTP/1.1\r\nX-A:tight\r\nX-B:  padded\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.header("X-A"), Some("tight"));
    // Only one leading space is stripped
    assert_eq!(parsed.header("X-B"), Some(" padded"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Token: first\r\nX-Token: second\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.header("X-Token"), Some("second"));
}

#[test]
fn test_parse_stops_at_first_non_header_line() {
    let req = b"GET / HTTP/1.1\r\nHost: a\r\nBrokenHeader\r\nAfter: b\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("a"));
    assert_eq!(parsed.header("After"), None);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_header_case_preservation() {
    let req = b"GET / HTTP/1.1\r\ncontent-type: application/json\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert!(parsed.headers.contains_key("content-type"));
    assert!(!parsed.headers.contains_key("Content-Type"));
}

#[test]
fn test_parse_leaves_pipelined_bytes() {
    let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    let (first, consumed) = parse_request_head(req).unwrap();
    let (second, _) = parse_request_head(&req[consumed..]).unwrap();

    assert_eq!(first.path, "/a");
    assert_eq!(second.path, "/b");
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n";

    assert_eq!(
        parse_request_head(req).unwrap_err(),
        ParseError::InvalidContentLength("ten".to_string())
    );
}

#[test]
fn test_parse_non_utf8_head() {
    let req = b"GET /\xff HTTP/1.1\r\n\r\n";

    assert_eq!(parse_request_head(req).unwrap_err(), ParseError::InvalidEncoding);
}

#[test]
fn test_reserialized_head_parses_to_same_fields() {
    let req = b"PUT /items/7?x=1 HTTP/1.1\r\nHost: example.com\r\nX-Empty:\r\nAccept: text/html, */*\r\nContent-Length: 0\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    let again = parsed.serialize_head();
    let (reparsed, consumed) = parse_request_head(&again).unwrap();

    assert_eq!(consumed, again.len());
    assert_eq!(reparsed.method, parsed.method);
    assert_eq!(reparsed.path, parsed.path);
    assert_eq!(reparsed.version, parsed.version);
    assert_eq!(reparsed.headers, parsed.headers);
    assert_eq!(reparsed.header("X-Empty"), Some(""));
}

#[test]
fn test_reserialized_version_token_is_unchanged() {
    for version in ["0.9", "1.0", "1.1", "2.0"] {
        let req = format!("GET / HTTP/{version}\r\nHost: x\r\n\r\n");
        let (parsed, _) = parse_request_head(req.as_bytes()).unwrap();

        assert_eq!(parsed.serialize_head(), req.as_bytes());
    }

    // Leading zeros would not survive re-serialization, so they are refused.
    let result = parse_request_head(b"GET / HTTP/1.01\r\nHost: x\r\n\r\n");
    assert!(matches!(result, Err(ParseError::InvalidRequestLine(_))));
}
