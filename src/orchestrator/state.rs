//! Lifecycle bookkeeping for the orchestrator.
//!
//! # State Machine (per service)
//! ```text
//! NotTracked ──probe: in use──▶ ExternallyPresent   (never stopped by us)
//!     │
//!     └──────probe: free────▶ StartedByUs(handle) ──shutdown──▶ Stopped
//! ```
//! Once an entry leaves `NotTracked` it never returns there, so a service is
//! started at most once per orchestrator.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::chain::ChainService;
use crate::fixtures::FixtureUpload;
use crate::storage::StorageService;

/// Services the orchestrator sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Chain,
    Storage,
    Populate,
    Extra,
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceName::Chain => "chain",
            ServiceName::Storage => "storage",
            ServiceName::Populate => "populate",
            ServiceName::Extra => "extra",
        };
        f.write_str(name)
    }
}

/// Tracking entry for a port-owning service.
#[derive(Debug)]
pub enum Tracked<H> {
    NotTracked,
    /// Port was already bound by someone else; not ours to stop.
    ExternallyPresent,
    /// Started by this orchestrator and eligible for shutdown.
    StartedByUs(H),
    /// Started by us and since shut down.
    Stopped,
}

impl<H> Default for Tracked<H> {
    fn default() -> Self {
        Tracked::NotTracked
    }
}

impl<H> Tracked<H> {
    pub fn status(&self) -> ServiceStatus {
        match self {
            Tracked::NotTracked => ServiceStatus::NotRequested,
            Tracked::ExternallyPresent => ServiceStatus::ExternallyPresent,
            Tracked::StartedByUs(_) => ServiceStatus::StartedByUs,
            Tracked::Stopped => ServiceStatus::Stopped,
        }
    }
}

/// Observable state of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    NotRequested,
    ExternallyPresent,
    StartedByUs,
    Stopped,
    /// One-shot step (populate, extra) that has completed.
    Done,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ServiceStatus::NotRequested => "not requested",
            ServiceStatus::ExternallyPresent => "already running (external)",
            ServiceStatus::StartedByUs => "started",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Done => "done",
        };
        f.write_str(status)
    }
}

/// Snapshot of every service's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackStatus {
    pub chain: ServiceStatus,
    pub storage: ServiceStatus,
    pub populate: ServiceStatus,
    pub extra: ServiceStatus,
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chain: {}, storage: {}, populate: {}, extra: {}",
            self.chain, self.storage, self.populate, self.extra
        )
    }
}

/// Everything the orchestrator owns for the lifetime of the process.
#[derive(Debug, Default)]
pub struct LifecycleState {
    pub chain: Tracked<ChainService>,
    pub storage: Tracked<StorageService>,
    pub populated: Option<Vec<FixtureUpload>>,
    pub extras_result: Option<Arc<Value>>,
}

impl LifecycleState {
    pub fn status(&self) -> StackStatus {
        let done = |finished: bool| {
            if finished {
                ServiceStatus::Done
            } else {
                ServiceStatus::NotRequested
            }
        };
        StackStatus {
            chain: self.chain.status(),
            storage: self.storage.status(),
            populate: done(self.populated.is_some()),
            extra: done(self.extras_result.is_some()),
        }
    }
}
