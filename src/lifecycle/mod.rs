//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Service start:
//!     bind listeners → server.rs (spawn axum task with shutdown hook)
//!
//! Service stop (shutdown.rs):
//!     trigger → server drains → task joins → listener released
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → CLI runs the orchestrator's shutdown handle
//! ```

pub mod server;
pub mod shutdown;
pub mod signals;

pub use server::ServerTask;
pub use shutdown::Shutdown;
