use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::config::ServerConfig;
use crate::error::{ConnectionError, ParseError};
use crate::http::body::{read_body, read_some};
use crate::http::parser::parse_request_head;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::{Resolution, RouteTable};

const INITIAL_BUFFER: usize = 4096;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Bound on every wait for request bytes, `None` waits forever
    pub read_timeout: Option<Duration>,
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ServerConfig::default().into()
    }
}

impl From<ServerConfig> for ConnectionSettings {
    fn from(cfg: ServerConfig) -> Self {
        Self {
            read_timeout: cfg.read_timeout(),
            max_header_bytes: cfg.max_header_bytes,
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

/// One connection's request/response state machine.
///
/// The connection owns its stream and read buffer exclusively; requests are
/// handled one at a time in arrival order, so pipelined requests are answered
/// in order.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    routes: Arc<RouteTable>,
    settings: ConnectionSettings,
    state: ConnectionState,
    released: bool,
}

#[derive(Debug)]
pub enum ConnectionState {
    ReadingHeaders,
    ReadingBody(Request, usize),
    Dispatching(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, routes: Arc<RouteTable>, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER),
            routes,
            settings,
            state: ConnectionState::ReadingHeaders,
            released: false,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Serves requests until the connection closes.
    ///
    /// A clean close (peer hung up between requests, or the last response
    /// did not keep the connection alive) is `Ok`. Anything else is returned
    /// after the stream has been shut down.
    pub async fn run(&mut self) -> Result<(), ConnectionError> {
        let result = self.drive().await;
        self.close().await;
        result
    }

    async fn drive(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Errors leave the state at Closed.
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::ReadingHeaders => {
                    self.state = match self.read_head().await? {
                        Some(request) => match request.content_length() {
                            Some(length) if length > self.settings.max_body_bytes => {
                                return Err(ConnectionError::BodyTooLarge {
                                    length,
                                    limit: self.settings.max_body_bytes,
                                });
                            }
                            Some(length) => ConnectionState::ReadingBody(request, length),
                            None => ConnectionState::Dispatching(request),
                        },
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::ReadingBody(mut request, length) => {
                    let body = read_body(
                        &mut self.stream,
                        &mut self.buffer,
                        length,
                        self.settings.read_timeout,
                    )
                    .await?;
                    request.body = Some(body);
                    self.state = ConnectionState::Dispatching(request);
                }

                ConnectionState::Dispatching(request) => {
                    let wants_keep_alive = request.keep_alive();
                    let response = self.dispatch(request);
                    let keep_alive = wants_keep_alive && !response.closes_connection();
                    let writer = ResponseWriter::new(&response, keep_alive);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        self.state = ConnectionState::ReadingHeaders; // go back for next request
                    }
                }

                ConnectionState::Closed => return Ok(()),
            }
        }
    }

    /// Buffers bytes until a full request head is available.
    ///
    /// `Ok(None)` means the peer closed before sending anything more.
    async fn read_head(&mut self) -> Result<Option<Request>, ConnectionError> {
        loop {
            // Try parsing whatever we already have
            match parse_request_head(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    if self.buffer.len() >= self.settings.max_header_bytes {
                        return Err(ConnectionError::HeadersTooLarge {
                            limit: self.settings.max_header_bytes,
                        });
                    }
                }

                Err(e) => return Err(e.into()),
            }

            let n = read_some(&mut self.stream, &mut self.buffer, self.settings.read_timeout).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ParseError::Incomplete.into());
            }
        }
    }

    fn dispatch(&self, mut request: Request) -> Response {
        match self.routes.resolve(&request.path, &request.method) {
            Resolution::Found {
                handler,
                path_match,
                pattern,
            } => {
                debug!(method = %request.method, path = %request.path, pattern, "dispatching request");
                request.path_match = path_match;

                let mut response = Response::default();
                (handler.as_ref())(&mut response, &request);
                response
            }
            Resolution::NotFound => {
                debug!(method = %request.method, path = %request.path, "no route matched");
                Response::not_found()
            }
        }
    }

    /// Shuts the stream down. Calling it again is a no-op.
    pub async fn close(&mut self) {
        self.state = ConnectionState::Closed;
        if self.released {
            return;
        }
        self.released = true;

        if let Err(e) = self.stream.shutdown().await {
            trace!(error = %e, "shutdown after close failed");
        }
    }
}
