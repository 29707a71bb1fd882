use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use minihttpd::config::Config;
use minihttpd::http::request::Request;
use minihttpd::http::response::{Response, StatusCode};
use minihttpd::server::Server;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let mut server = Server::new(cfg.server.clone());

    server
        .resource("^/string/?$", "POST", echo_body)?
        .resource("^/match/([0-9a-zA-Z]+)/?$", "GET", echo_match)?
        .resource("^/info/?$", "GET", request_info)?;

    let root = cfg
        .static_files
        .map(|s| s.root)
        .unwrap_or_else(|| PathBuf::from("web"));
    server.default_resource("^/?(.*)$", "GET", move |res, req| serve_file(&root, res, req))?;

    server.run()
}

fn echo_body(res: &mut Response, req: &Request) {
    let mut body = Vec::new();
    if let Err(e) = req.body_reader().read_to_end(&mut body) {
        tracing::warn!(error = %e, "failed to read request body");
    }
    res.set_body(body);
}

fn echo_match(res: &mut Response, req: &Request) {
    let name = req.path_match.get(1).unwrap_or_default();
    res.set_body(name.as_bytes().to_vec());
}

fn request_info(res: &mut Response, req: &Request) {
    let mut headers: Vec<_> = req.headers.iter().collect();
    headers.sort();

    let _ = writeln!(res, "<h1>Request:</h1>");
    let _ = writeln!(res, "{} {} HTTP/{}<br>", req.method, req.path, req.version);
    for (key, value) in headers {
        let _ = writeln!(res, "{key}: {value}<br>");
    }
    res.set_header("Content-Type", "text/html");
}

fn serve_file(root: &Path, res: &mut Response, req: &Request) {
    let requested = req.path_match.get(1).unwrap_or_default();
    let requested = requested.split('?').next().unwrap_or_default();

    let relative = Path::new(requested);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        res.set_status(StatusCode::Forbidden).set_body("403 Forbidden");
        return;
    }

    let mut path = root.join(relative);
    if path.is_dir() {
        path.push("index.html");
    }

    match std::fs::read(&path) {
        Ok(contents) => {
            res.set_body(contents);
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "static file not served");
            res.set_status(StatusCode::NotFound).set_body("404 Not Found");
        }
    }
}
