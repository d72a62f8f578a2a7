//! Storage node lifecycle.

use alloy::primitives::{hex, keccak256};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

use crate::config::StorageConfig;
use crate::error::{StartupError, StopError};
use crate::lifecycle::ServerTask;
use crate::orchestrator::state::ServiceName;
use crate::storage::api::{self, NodeState};
use crate::storage::blocks::BlockStore;

/// A running, isolated storage node.
#[derive(Debug)]
pub struct StorageService {
    api: ServerTask,
    gateway: ServerTask,
    node_id: String,
}

impl StorageService {
    /// Open the block store and bind both the API and gateway endpoints.
    pub async fn start(config: &StorageConfig) -> Result<Self, StartupError> {
        if !config.bootstrap.is_empty() {
            return Err(StartupError::Config {
                service: ServiceName::Storage,
                reason: "bootstrap peers are not supported by the local node".to_string(),
            });
        }

        tracing::info!(data_dir = %config.data_dir.display(), "Starting storage node");

        let blocks = BlockStore::open(&config.data_dir)
            .await
            .map_err(|source| StartupError::DataDir {
                service: ServiceName::Storage,
                path: config.data_dir.clone(),
                source,
            })?;
        let node_id = hex::encode(keccak256(config.data_dir.to_string_lossy().as_bytes()));
        let state = NodeState {
            blocks,
            node_id: node_id.clone(),
        };

        let api_listener = bind(config.api_port).await?;
        let gateway_listener = bind(config.gateway_port).await?;

        let api = spawn("storage-api", api_listener, api::api_router(state.clone()))?;
        let gateway = spawn("storage-gateway", gateway_listener, api::gateway_router(state))?;

        tracing::info!(
            api_port = config.api_port,
            gateway_port = config.gateway_port,
            "Started storage node"
        );

        Ok(Self {
            api,
            gateway,
            node_id,
        })
    }

    pub fn api_addr(&self) -> SocketAddr {
        self.api.local_addr()
    }

    pub fn gateway_addr(&self) -> SocketAddr {
        self.gateway.local_addr()
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Release both endpoints. Both are stopped even if the first fails;
    /// the first failure is returned.
    pub async fn stop(self) -> Result<(), StopError> {
        let api = self.api.stop().await;
        let gateway = self.gateway.stop().await;
        api.and(gateway).map_err(|reason| StopError {
            service: ServiceName::Storage,
            reason,
        })?;

        tracing::info!("Storage node stopped");
        Ok(())
    }
}

async fn bind(port: u16) -> Result<TcpListener, StartupError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind {
            service: ServiceName::Storage,
            addr,
            source,
        })
}

fn spawn(name: &'static str, listener: TcpListener, router: axum::Router) -> Result<ServerTask, StartupError> {
    let addr = listener.local_addr().unwrap_or_else(|_| SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)));
    ServerTask::spawn(name, listener, router).map_err(|source| StartupError::Bind {
        service: ServiceName::Storage,
        addr,
        source,
    })
}
