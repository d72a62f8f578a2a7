//! Shutdown handle returned by `Orchestrator::start`.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::StackResult;
use crate::orchestrator::state::{LifecycleState, Tracked};

/// Stops every service the orchestrator started, and carries the extra
/// hook's retained result.
///
/// Services found already running are never touched. Calling
/// [`ShutdownHandle::shutdown`] again after a successful call is a no-op.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    state: Arc<Mutex<LifecycleState>>,
    extras_result: Option<Arc<Value>>,
}

impl ShutdownHandle {
    pub(crate) fn new(state: Arc<Mutex<LifecycleState>>, extras_result: Option<Arc<Value>>) -> Self {
        Self {
            state,
            extras_result,
        }
    }

    /// Result of the extra hook, if one has run in this process.
    pub fn extras_result(&self) -> Option<&Value> {
        self.extras_result.as_deref()
    }

    /// Shared reference to the retained extra result.
    pub fn extras_result_arc(&self) -> Option<Arc<Value>> {
        self.extras_result.clone()
    }

    /// Stop the chain, then the storage node. The first failure is returned
    /// and later services are left running.
    pub async fn shutdown(&self) -> StackResult<()> {
        let mut state = self.state.lock().await;

        match std::mem::take(&mut state.chain) {
            Tracked::StartedByUs(chain) => {
                state.chain = Tracked::Stopped;
                tracing::info!("Stopping chain");
                chain.stop().await?;
            }
            other => state.chain = other,
        }

        match std::mem::take(&mut state.storage) {
            Tracked::StartedByUs(storage) => {
                state.storage = Tracked::Stopped;
                tracing::info!("Stopping storage node");
                storage.stop().await?;
            }
            other => state.storage = other,
        }

        Ok(())
    }
}

