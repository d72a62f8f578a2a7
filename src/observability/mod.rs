//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (port, path, cid, ...)
//!     → logging.rs subscriber (EnvFilter + fmt) → stdout
//! ```

pub mod logging;
