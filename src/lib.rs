//! Local development stack orchestrator.
//!
//! Brings up a local chain emulator and a content-addressed storage node,
//! deploys contracts, seeds fixtures, and tears down exactly what it started.

pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod orchestrator;
pub mod storage;

pub use config::StackConfig;
pub use error::{StackError, StackResult};
pub use orchestrator::{ExtraHook, Orchestrator, ShutdownHandle, StartConfig};
