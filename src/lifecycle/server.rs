//! Background HTTP server tasks owned by a service handle.
//!
//! Each in-process service binds its listeners up front (so bind failures
//! surface synchronously as startup errors), then hands them to a tokio task
//! running `axum::serve` with graceful shutdown. Stopping triggers the
//! shutdown signal and awaits the task, so the port is free again once
//! [`ServerTask::stop`] returns.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::lifecycle::shutdown::Shutdown;

/// A running axum server bound to one address.
#[derive(Debug)]
pub struct ServerTask {
    name: &'static str,
    addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerTask {
    /// Serve `router` on an already-bound listener.
    pub fn spawn(name: &'static str, listener: TcpListener, router: Router) -> std::io::Result<Self> {
        let addr = listener.local_addr()?;
        let shutdown = Shutdown::new();
        let signal = shutdown.signalled();
        let app = router.layer(TraceLayer::new_for_http());

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });

        tracing::debug!(server = name, address = %addr, "Server task spawned");
        Ok(Self {
            name,
            addr,
            shutdown,
            task,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal the server and wait until it has released its listener.
    pub async fn stop(self) -> Result<(), String> {
        self.shutdown.trigger();
        match self.task.await {
            Ok(Ok(())) => {
                tracing::debug!(server = self.name, address = %self.addr, "Server task stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(format!("{} server exited with error: {}", self.name, e)),
            Err(e) => Err(format!("{} server task failed: {}", self.name, e)),
        }
    }
}
