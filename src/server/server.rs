use std::sync::Arc;

use tracing::info;

use crate::config::ServerConfig;
use crate::error::RouteError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::router::RouteTableBuilder;
use crate::server::listener::{TcpTransport, Transport};

/// Route registration plus start-up.
///
/// Routes are registered on a `Server` and frozen when it starts serving.
/// Starting consumes the server, so nothing can be registered afterwards.
///
/// ```no_run
/// use std::io::Write;
/// use minihttpd::config::ServerConfig;
/// use minihttpd::server::Server;
///
/// let mut server = Server::new(ServerConfig::default());
/// server.resource("^/hello$", "GET", |res, _req| {
///     let _ = write!(res, "hi");
/// })?;
/// server.run()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    routes: RouteTableBuilder,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: RouteTableBuilder::new(),
        }
    }

    /// Registers an application route. See [`RouteTableBuilder::resource`].
    pub fn resource<F>(&mut self, pattern: &str, method: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.routes.resource(pattern, method, handler)?;
        Ok(self)
    }

    /// Registers a fallback route, tried after every application route.
    pub fn default_resource<F>(
        &mut self,
        pattern: &str,
        method: &str,
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.routes.default_resource(pattern, method, handler)?;
        Ok(self)
    }

    /// Freezes the routes and serves connections from `transport` on the
    /// current runtime.
    pub async fn serve<T: Transport>(self, transport: T) -> anyhow::Result<()> {
        self.config.validate()?;

        let routes = Arc::new(self.routes.build());
        info!(routes = routes.len(), "route table frozen");

        transport.accept_loop(routes, self.config.into()).await
    }

    /// Builds a runtime with `workers` worker threads, listens on
    /// `0.0.0.0:port` and serves until Ctrl-C.
    pub fn run(self) -> anyhow::Result<()> {
        self.config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .thread_name("minihttpd-worker")
            .enable_all()
            .build()?;
        info!(workers = self.config.workers, "worker pool started");

        runtime.block_on(async move {
            let transport = TcpTransport::bind(("0.0.0.0", self.config.port)).await?;

            tokio::select! {
                res = self.serve(transport) => res,

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    Ok(())
                }
            }
        })
    }
}
