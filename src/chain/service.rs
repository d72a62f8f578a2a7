//! Chain emulator lifecycle.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::chain::accounts::{derive_accounts, ether_to_wei};
use crate::chain::rpc::{self, Ledger, RpcState};
use crate::chain::store::{ChainState, ChainStore, DiskStore, MemoryStore};
use crate::config::ChainConfig;
use crate::error::{StartupError, StopError};
use crate::lifecycle::ServerTask;
use crate::orchestrator::state::ServiceName;

/// Per-start overrides for the chain service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainOptions {
    /// Use an ephemeral in-memory store instead of the data directory.
    pub in_memory: bool,
}

/// A running chain emulator.
#[derive(Debug)]
pub struct ChainService {
    server: ServerTask,
    ledger: Arc<Mutex<Ledger>>,
}

impl ChainService {
    /// Prepare the backing store, derive accounts, and bind the RPC port.
    pub async fn start(config: &ChainConfig, options: ChainOptions) -> Result<Self, StartupError> {
        let mut store: Box<dyn ChainStore> = if options.in_memory {
            Box::new(MemoryStore)
        } else {
            let store = DiskStore::open(&config.data_dir).map_err(|source| StartupError::DataDir {
                service: ServiceName::Chain,
                path: config.data_dir.clone(),
                source,
            })?;
            Box::new(store)
        };

        let state = match store.load().map_err(|source| StartupError::DataDir {
            service: ServiceName::Chain,
            path: config.data_dir.clone(),
            source,
        })? {
            Some(state) => {
                tracing::debug!(block_number = state.block_number, "Restored chain snapshot");
                state
            }
            None => {
                let accounts = derive_accounts(&config.mnemonic, config.total_accounts).map_err(|e| {
                    StartupError::Config {
                        service: ServiceName::Chain,
                        reason: format!("cannot derive accounts from mnemonic: {}", e),
                    }
                })?;
                ChainState::genesis(&accounts, ether_to_wei(config.default_balance_ether))
            }
        };

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind {
                service: ServiceName::Chain,
                addr,
                source,
            })?;

        let backend = store.kind();
        let ledger = Arc::new(Mutex::new(Ledger::new(state, store)));
        let router = rpc::router(RpcState {
            ledger: Arc::clone(&ledger),
            network_id: config.network_id,
        });
        let server = ServerTask::spawn("chain", listener, router).map_err(|source| StartupError::Bind {
            service: ServiceName::Chain,
            addr,
            source,
        })?;

        tracing::info!(
            port = config.port,
            network_id = config.network_id,
            backend,
            "Chain listening on port {}",
            config.port
        );

        Ok(Self { server, ledger })
    }

    /// Address the RPC endpoint is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Stop serving, release the port, and flush the backing store.
    pub async fn stop(self) -> Result<(), StopError> {
        let stop_error = |reason: String| StopError {
            service: ServiceName::Chain,
            reason,
        };

        self.server.stop().await.map_err(stop_error)?;

        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| stop_error("ledger lock poisoned".to_string()))?;
        ledger
            .flush()
            .map_err(|e| stop_error(format!("failed to flush chain state: {}", e)))?;

        tracing::info!("Chain stopped");
        Ok(())
    }
}
