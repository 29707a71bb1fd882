use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::error::ConnectionError;
use crate::http::connection::{Connection, ConnectionSettings};
use crate::router::RouteTable;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A way of accepting connections, e.g. plain TCP or TLS.
pub trait Transport: Send + 'static {
    /// Accepts connections until the transport fails, spawning one
    /// [`Connection`] task per accepted stream.
    fn accept_loop(
        self,
        routes: Arc<RouteTable>,
        settings: ConnectionSettings,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Plain TCP transport.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    async fn accept_loop(
        self,
        routes: Arc<RouteTable>,
        settings: ConnectionSettings,
    ) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            tokio::spawn(serve_connection(socket, peer, Arc::clone(&routes), settings));
        }
    }
}

async fn serve_connection(
    socket: TcpStream,
    peer: SocketAddr,
    routes: Arc<RouteTable>,
    settings: ConnectionSettings,
) {
    if let Err(e) = socket.set_nodelay(true) {
        debug!(%peer, error = %e, "failed to set TCP_NODELAY");
    }

    let mut conn = Connection::new(socket, routes, settings);
    match conn.run().await {
        Ok(()) => debug!(%peer, "connection closed"),
        Err(ConnectionError::Io(e)) => warn!(%peer, error = %e, "connection error"),
        Err(e) => debug!(%peer, error = %e, "connection dropped"),
    }
}
