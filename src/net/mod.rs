//! Network helpers.
//!
//! # Data Flow
//! ```text
//! Orchestrator wants a service on a fixed port
//!     → probe.rs (transient bind on 0.0.0.0:port)
//!     → in use: service is externally present, never owned
//!     → free:   service is started and owned by the orchestrator
//! ```

pub mod probe;

pub use probe::is_port_in_use;
