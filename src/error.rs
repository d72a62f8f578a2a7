//! Error taxonomy for the dev stack.
//!
//! Every step of an orchestration run has its own error type; all of them
//! fold into [`StackError`], which is what `Orchestrator::start` and the
//! shutdown handle return.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::orchestrator::state::ServiceName;

/// A service failed to bind its endpoints or prepare its resources.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{service} failed to bind {addr}: {source}")]
    Bind {
        service: ServiceName,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} could not prepare data directory {}: {source}", path.display())]
    DataDir {
        service: ServiceName,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} has invalid configuration: {reason}")]
    Config {
        service: ServiceName,
        reason: String,
    },

    #[error("{service} did not start within {}s", after.as_secs())]
    TimedOut {
        service: ServiceName,
        after: Duration,
    },
}

/// The migration executable could not be run or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("migration exited with {}", exit_description(*code))]
    Exit { code: Option<i32> },

    #[error("migration did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// A fixture could not be discovered, read, or uploaded.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("failed to walk fixture directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read fixture {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload fixture {path}: {reason}")]
    Upload { path: String, reason: String },

    #[error("failed to build storage client: {0}")]
    Client(String),

    #[error("fixture population did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// A service owned by the orchestrator failed to stop cleanly.
#[derive(Debug, Error)]
#[error("{service} failed to stop: {reason}")]
pub struct StopError {
    pub service: ServiceName,
    pub reason: String,
}

/// Any failure surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum StackError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    #[error(transparent)]
    Populate(#[from] PopulateError),

    #[error(transparent)]
    Stop(#[from] StopError),

    #[error("extra hook failed: {0}")]
    Extra(String),
}

impl StackError {
    /// The service the failure belongs to. Deployment runs against the chain
    /// but is not a tracked service of its own.
    pub fn service(&self) -> Option<ServiceName> {
        match self {
            StackError::Startup(
                StartupError::Bind { service, .. }
                | StartupError::DataDir { service, .. }
                | StartupError::Config { service, .. }
                | StartupError::TimedOut { service, .. },
            ) => Some(*service),
            StackError::Stop(e) => Some(e.service),
            StackError::Populate(_) => Some(ServiceName::Populate),
            StackError::Extra(_) => Some(ServiceName::Extra),
            StackError::Deployment(_) => None,
        }
    }
}

pub type StackResult<T> = Result<T, StackError>;
