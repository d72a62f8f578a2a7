//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev stack.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file yields the standard local stack.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the local development stack.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct StackConfig {
    /// Local chain emulator settings.
    pub chain: ChainConfig,

    /// Local content-addressed storage node settings.
    pub storage: StorageConfig,

    /// Contract migration settings.
    pub contracts: ContractsConfig,

    /// Fixture population settings.
    pub fixtures: FixturesConfig,

    /// Optional per-step timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain emulator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC listen port.
    pub port: u16,

    /// Directory for the durable backing store.
    pub data_dir: PathBuf,

    /// Network identifier reported by `net_version` and `eth_chainId`.
    pub network_id: u64,

    /// Number of pre-funded accounts derived from the mnemonic.
    pub total_accounts: u32,

    /// Starting balance of every derived account, in ether.
    pub default_balance_ether: u64,

    /// Recovery phrase the test accounts are derived from.
    pub mnemonic: String,
}

pub const DEFAULT_MNEMONIC: &str =
    "candy maple cake sugar pudding cream honey rich smooth crumble sweet treat";

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            port: 8545,
            data_dir: PathBuf::from("data/db"),
            network_id: 999,
            total_accounts: 5,
            default_balance_ether: 100,
            mnemonic: DEFAULT_MNEMONIC.to_string(),
        }
    }
}

/// Storage node configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// API endpoint port (uploads, node info).
    pub api_port: u16,

    /// Gateway endpoint port (content retrieval).
    pub gateway_port: u16,

    /// Directory for stored blocks.
    pub data_dir: PathBuf,

    /// Peer bootstrap list. The node is isolated, so this must stay empty.
    pub bootstrap: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            api_port: 5002,
            gateway_port: 8080,
            data_dir: PathBuf::from("data/ipfs"),
            bootstrap: Vec::new(),
        }
    }
}

/// Contract migration configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ContractsConfig {
    /// Contracts project root; the migration runs with this as its working directory.
    pub project_dir: PathBuf,

    /// Migration executable, resolved relative to `project_dir` when relative.
    pub executable: String,

    /// Arguments passed to the executable ("reset and redeploy").
    pub args: Vec<String>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("../contracts"),
            executable: "./node_modules/.bin/truffle".to_string(),
            args: vec!["migrate".to_string(), "--reset".to_string()],
        }
    }
}

/// Fixture population configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FixturesConfig {
    /// Root of the fixture tree uploaded into the storage node.
    pub dir: PathBuf,

    /// Log every uploaded file's identifier and path.
    pub log_files: bool,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("../origin-js/test/fixtures"),
            log_files: false,
        }
    }
}

/// Timeout configuration. Every timeout is disabled unless set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum time to wait for a service to bind its endpoints.
    pub service_start_secs: Option<u64>,

    /// Maximum time to wait for the migration executable to exit.
    pub deploy_secs: Option<u64>,

    /// Maximum time to upload the whole fixture tree.
    pub populate_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn service_start(&self) -> Option<Duration> {
        self.service_start_secs.map(Duration::from_secs)
    }

    pub fn deploy(&self) -> Option<Duration> {
        self.deploy_secs.map(Duration::from_secs)
    }

    pub fn populate(&self) -> Option<Duration> {
        self.populate_secs.map(Duration::from_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_stack() {
        let config = StackConfig::default();
        assert_eq!(config.chain.port, 8545);
        assert_eq!(config.chain.network_id, 999);
        assert_eq!(config.chain.total_accounts, 5);
        assert_eq!(config.chain.data_dir, PathBuf::from("data/db"));
        assert_eq!(config.storage.api_port, 5002);
        assert_eq!(config.storage.gateway_port, 8080);
        assert!(config.storage.bootstrap.is_empty());
        assert_eq!(config.contracts.args, vec!["migrate", "--reset"]);
        assert!(config.timeouts.deploy().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: StackConfig = toml::from_str(
            r#"
            [chain]
            port = 9545

            [timeouts]
            deploy_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.port, 9545);
        assert_eq!(config.chain.network_id, 999);
        assert_eq!(config.storage.api_port, 5002);
        assert_eq!(config.timeouts.deploy(), Some(Duration::from_secs(30)));
        assert!(config.timeouts.populate().is_none());
    }
}
