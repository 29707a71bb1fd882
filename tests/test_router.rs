use minihttpd::error::RouteError;
use minihttpd::http::request::{Request, RequestBuilder};
use minihttpd::http::response::Response;
use minihttpd::router::{Resolution, RouteTable, RouteTableBuilder};

fn reply(text: &'static str) -> impl Fn(&mut Response, &Request) + Send + Sync + 'static {
    move |res, _req| {
        res.set_body(text);
    }
}

/// Resolves and runs the winning handler, returning its body.
fn call(table: &RouteTable, method: &str, path: &str) -> Option<String> {
    match table.resolve(path, method) {
        Resolution::Found {
            handler,
            path_match,
            ..
        } => {
            let mut request = RequestBuilder::new().method(method).path(path).build().unwrap();
            request.path_match = path_match;
            let mut response = Response::default();
            (handler.as_ref())(&mut response, &request);
            Some(String::from_utf8(response.body).unwrap())
        }
        Resolution::NotFound => None,
    }
}

#[test]
fn test_resolve_exact_route() {
    let mut builder = RouteTableBuilder::new();
    builder.resource("^/hello$", "GET", reply("hi")).unwrap();
    let table = builder.build();

    assert_eq!(call(&table, "GET", "/hello").as_deref(), Some("hi"));
    assert!(matches!(table.resolve("/other", "GET"), Resolution::NotFound));
}

#[test]
fn test_pattern_must_match_whole_path() {
    let mut builder = RouteTableBuilder::new();
    builder.resource("/api", "GET", reply("api")).unwrap();
    let table = builder.build();

    assert!(call(&table, "GET", "/api").is_some());
    assert!(call(&table, "GET", "/api/users").is_none());
    assert!(call(&table, "GET", "/v1/api").is_none());
}

#[test]
fn test_method_mismatch_falls_through_to_later_pattern() {
    let mut builder = RouteTableBuilder::new();
    builder
        .resource("^/items/.*$", "POST", reply("create"))
        .unwrap()
        .resource("^/items/([0-9]+)$", "GET", reply("show"))
        .unwrap();
    let table = builder.build();

    assert_eq!(call(&table, "GET", "/items/7").as_deref(), Some("show"));
    assert_eq!(call(&table, "POST", "/items/7").as_deref(), Some("create"));
}

#[test]
fn test_method_mismatch_everywhere_is_not_found() {
    let mut builder = RouteTableBuilder::new();
    builder.resource("^/items$", "GET", reply("list")).unwrap();
    let table = builder.build();

    assert!(matches!(table.resolve("/items", "DELETE"), Resolution::NotFound));
}

#[test]
fn test_default_resources_come_after_resources() {
    let mut builder = RouteTableBuilder::new();
    // Registered first, but still consulted last
    builder.default_resource("^/?(.*)$", "GET", reply("fallback")).unwrap();
    builder.resource("^/hello$", "GET", reply("hi")).unwrap();
    let table = builder.build();

    assert_eq!(table.routes()[0].pattern(), "^/hello$");
    assert_eq!(table.routes()[1].pattern(), "^/?(.*)$");
    assert_eq!(call(&table, "GET", "/hello").as_deref(), Some("hi"));
    assert_eq!(call(&table, "GET", "/anything").as_deref(), Some("fallback"));
}

#[test]
fn test_first_matching_resource_wins() {
    let mut builder = RouteTableBuilder::new();
    builder
        .resource("^/a/.*$", "GET", reply("wide"))
        .unwrap()
        .resource("^/a/b$", "GET", reply("narrow"))
        .unwrap();
    let table = builder.build();

    assert_eq!(call(&table, "GET", "/a/b").as_deref(), Some("wide"));
}

#[test]
fn test_same_pattern_merges_methods() {
    let mut builder = RouteTableBuilder::new();
    builder
        .resource("^/thing$", "GET", reply("get"))
        .unwrap()
        .resource("^/thing$", "PUT", reply("put"))
        .unwrap()
        .resource("^/thing$", "GET", reply("get again"))
        .unwrap();
    let table = builder.build();

    assert_eq!(table.len(), 1);
    assert_eq!(call(&table, "PUT", "/thing").as_deref(), Some("put"));
    assert_eq!(call(&table, "GET", "/thing").as_deref(), Some("get again"));
}

#[test]
fn test_captures_are_attached() {
    let mut builder = RouteTableBuilder::new();
    builder
        .resource(r"^/users/(?P<id>\d+)/posts/(\w+)$", "GET", |res, req| {
            let id = req.path_match.name("id").unwrap_or_default();
            let slug = req.path_match.get(2).unwrap_or_default();
            res.set_body(format!("{id}:{slug}"));
        })
        .unwrap();
    let table = builder.build();

    assert_eq!(call(&table, "GET", "/users/42/posts/intro").as_deref(), Some("42:intro"));

    match table.resolve("/users/42/posts/intro", "GET") {
        Resolution::Found { path_match, .. } => {
            assert_eq!(path_match.get(0), Some("/users/42/posts/intro"));
            assert_eq!(path_match.len(), 3);
        }
        Resolution::NotFound => panic!("expected a match"),
    }
}

#[test]
fn test_optional_group_that_did_not_participate() {
    let mut builder = RouteTableBuilder::new();
    builder.resource(r"^/page(/(\d+))?$", "GET", reply("page")).unwrap();
    let table = builder.build();

    match table.resolve("/page", "GET") {
        Resolution::Found { path_match, .. } => assert_eq!(path_match.get(2), None),
        Resolution::NotFound => panic!("expected a match"),
    }
}

#[test]
fn test_invalid_pattern_rejected_at_registration() {
    let mut builder = RouteTableBuilder::new();
    let err = builder.resource("^/broken(", "GET", reply("x")).unwrap_err();

    assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == "^/broken("));
    assert!(builder.build().is_empty());
}
