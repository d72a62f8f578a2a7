//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → StackConfig (validated, immutable)
//!     → owned by the Orchestrator, slices handed to each service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; an empty file is the standard local stack
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChainConfig, ContractsConfig, FixturesConfig, ObservabilityConfig, StackConfig,
    StorageConfig, TimeoutConfig,
};
