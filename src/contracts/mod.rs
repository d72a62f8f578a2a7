//! Contract deployment.
//!
//! # Data Flow
//! ```text
//! ContractsConfig (project dir, executable, "migrate --reset")
//!     → deployer.rs (spawn child, inherit stdio/env, await exit)
//!     → Ok(()) on status 0, DeploymentError otherwise
//! ```

pub mod deployer;

pub use deployer::ContractDeployer;
