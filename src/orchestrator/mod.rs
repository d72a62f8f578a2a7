//! Dev stack orchestration.
//!
//! # Data Flow
//! ```text
//! Orchestrator::start(StartConfig)
//!     → chain    (probe port → external | start + track)
//!     → deploy   (every time it is requested)
//!     → storage  (probe API port → external | start + track)
//!     → populate (once, needs a live storage API)
//!     → extra    (once, result retained)
//!     → ShutdownHandle
//! ```
//!
//! # Design Decisions
//! - Steps run strictly in order; a failing step aborts the rest of the call
//! - The whole call holds the state lock, so concurrent `start` calls queue
//!   instead of racing on the same service
//! - Services found already running are recorded but never owned

pub mod handle;
pub mod request;
pub mod state;

pub use handle::ShutdownHandle;
pub use request::{ExtraHook, StartConfig};
pub use state::{LifecycleState, ServiceName, ServiceStatus, StackStatus};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::chain::{ChainOptions, ChainService};
use crate::config::StackConfig;
use crate::contracts::ContractDeployer;
use crate::error::{StackError, StackResult, StartupError};
use crate::fixtures::{FixturePopulator, FixtureUpload, PopulateOptions};
use crate::net::is_port_in_use;
use crate::storage::StorageService;
use state::Tracked;

/// Coordinates the local dev stack. Construct one per process and share it.
#[derive(Debug)]
pub struct Orchestrator {
    config: StackConfig,
    state: Arc<Mutex<LifecycleState>>,
}

impl Orchestrator {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(LifecycleState::default())),
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Bring up whatever `request` asks for that is not already up.
    pub async fn start(&self, request: StartConfig) -> StackResult<ShutdownHandle> {
        let mut state = self.state.lock().await;

        if let Some(options) = request.chain {
            self.ensure_chain(&mut state, options).await?;
        }

        if request.deploy_contracts {
            self.deploy_contracts().await?;
        }

        if request.storage {
            let api_port = self.ensure_storage(&mut state).await?;
            if request.populate_fixtures {
                match api_port {
                    Some(port) => self.ensure_populated(&mut state, port).await?,
                    None => tracing::warn!("Storage node was shut down, skipping fixture population"),
                }
            }
        } else if request.populate_fixtures {
            tracing::warn!("Fixture population requested without storage, skipping");
        }

        if let Some(hook) = request.extra {
            if state.extras_result.is_none() {
                tracing::debug!("Running extra hook");
                let value = hook.run().await.map_err(|e| StackError::Extra(e.to_string()))?;
                state.extras_result = Some(Arc::new(value));
            } else {
                tracing::debug!("Extra hook already ran, reusing its result");
            }
        }

        Ok(ShutdownHandle::new(
            Arc::clone(&self.state),
            state.extras_result.clone(),
        ))
    }

    /// Current status of every service.
    pub async fn status(&self) -> StackStatus {
        self.state.lock().await.status()
    }

    /// Fixtures uploaded by this orchestrator, if population has run.
    pub async fn populated(&self) -> Option<Vec<FixtureUpload>> {
        self.state.lock().await.populated.clone()
    }

    async fn ensure_chain(&self, state: &mut LifecycleState, options: ChainOptions) -> StackResult<()> {
        match state.chain {
            Tracked::NotTracked => {}
            Tracked::Stopped => {
                tracing::warn!("Chain was already started and shut down once, not restarting");
                return Ok(());
            }
            _ => return Ok(()),
        }

        let port = self.config.chain.port;
        if is_port_in_use(port).await {
            tracing::info!(port, "Chain already started");
            state.chain = Tracked::ExternallyPresent;
            return Ok(());
        }

        let service = within(
            ServiceName::Chain,
            self.config.timeouts.service_start(),
            ChainService::start(&self.config.chain, options),
        )
        .await?;
        state.chain = Tracked::StartedByUs(service);
        Ok(())
    }

    async fn deploy_contracts(&self) -> StackResult<()> {
        ContractDeployer::new(&self.config.contracts)
            .with_timeout(self.config.timeouts.deploy())
            .deploy()
            .await?;
        Ok(())
    }

    /// Returns the port of a live storage API, or `None` if the node we
    /// started has since been shut down.
    async fn ensure_storage(&self, state: &mut LifecycleState) -> StackResult<Option<u16>> {
        let configured = self.config.storage.api_port;
        match &state.storage {
            Tracked::NotTracked => {}
            Tracked::ExternallyPresent => return Ok(Some(configured)),
            Tracked::StartedByUs(service) => return Ok(Some(service.api_addr().port())),
            Tracked::Stopped => {
                tracing::warn!("Storage node was already started and shut down once, not restarting");
                return Ok(None);
            }
        }

        if is_port_in_use(configured).await {
            tracing::info!(port = configured, "Storage node already started");
            state.storage = Tracked::ExternallyPresent;
            return Ok(Some(configured));
        }

        let service = within(
            ServiceName::Storage,
            self.config.timeouts.service_start(),
            StorageService::start(&self.config.storage),
        )
        .await?;
        let port = service.api_addr().port();
        state.storage = Tracked::StartedByUs(service);
        Ok(Some(port))
    }

    async fn ensure_populated(&self, state: &mut LifecycleState, api_port: u16) -> StackResult<()> {
        if state.populated.is_some() {
            tracing::debug!("Fixtures already populated");
            return Ok(());
        }

        let populator = FixturePopulator::new(&self.config.fixtures.dir, api_port)?;
        let uploads = populator
            .populate(PopulateOptions {
                log_files: self.config.fixtures.log_files,
                timeout: self.config.timeouts.populate(),
            })
            .await?;
        state.populated = Some(uploads);
        Ok(())
    }
}

async fn within<T, F>(service: ServiceName, limit: Option<Duration>, start: F) -> Result<T, StartupError>
where
    F: Future<Output = Result<T, StartupError>>,
{
    match limit {
        Some(after) => tokio::time::timeout(after, start)
            .await
            .map_err(|_| StartupError::TimedOut { service, after })?,
        None => start.await,
    }
}
