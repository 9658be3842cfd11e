//! HTTP server for the render protocol.
//!
//! # Architecture
//!
//! The server:
//! - Listens on a TCP socket for incoming HTTP connections
//! - Spawns a tokio task per connection
//! - Hands each request to the [`RenderRouter`]
//! - Streams the encoded render output back as the response body

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use arbor_common::Result;
use arbor_engine::{RenderOptions, Renderer};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::http_router::RenderRouter;

/// HTTP server for the render protocol engine.
pub struct HttpServer {
    router: Arc<RenderRouter>,
}

impl HttpServer {
    /// Creates a server driving `renderer` under the given render options.
    ///
    /// # Arguments
    ///
    /// * `renderer` - The render dispatcher handling every request
    /// * `options` - Per-deployment rendering mode (export flag, client
    ///   entry resolver)
    pub fn new(renderer: Arc<Renderer>, options: RenderOptions) -> Self {
        let router = Arc::new(RenderRouter::new(renderer, options));
        Self { router }
    }

    /// Runs the accept loop on the specified address.
    ///
    /// Each connection is served on its own tokio task; connection-level
    /// errors are logged and do not take down the loop.
    ///
    /// # Arguments
    ///
    /// * `addr` - The socket address to bind to
    ///
    /// # Returns
    ///
    /// Only returns on a bind or accept failure.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Render server listening on {}", listener.local_addr()?);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let router = Arc::clone(&self.router);

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { Ok::<_, Infallible>(router.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::error!("Error serving connection: {err}");
                }
            });
        }
    }
}
