//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports non-zero, at least one account)
//! - Detect endpoints that would collide with each other
//! - Keep the storage node isolated (no bootstrap peers)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StackConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::StackConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be 0")]
    ZeroPort { field: &'static str },

    #[error("port {port} is assigned to both {first} and {second}")]
    DuplicatePort {
        port: u16,
        first: &'static str,
        second: &'static str,
    },

    #[error("chain.total_accounts must be at least 1")]
    NoAccounts,

    #[error("chain.mnemonic must not be empty")]
    EmptyMnemonic,

    #[error("storage.bootstrap must be empty, the local node does not peer")]
    BootstrapPeers,

    #[error("contracts.executable must not be empty")]
    EmptyExecutable,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &StackConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let ports = [
        ("chain.port", config.chain.port),
        ("storage.api_port", config.storage.api_port),
        ("storage.gateway_port", config.storage.gateway_port),
    ];

    for (field, port) in ports {
        if port == 0 {
            errors.push(ValidationError::ZeroPort { field });
        }
    }

    for (i, (first, a)) in ports.iter().enumerate() {
        for (second, b) in &ports[i + 1..] {
            if *a != 0 && a == b {
                errors.push(ValidationError::DuplicatePort {
                    port: *a,
                    first,
                    second,
                });
            }
        }
    }

    if config.chain.total_accounts == 0 {
        errors.push(ValidationError::NoAccounts);
    }
    if config.chain.mnemonic.trim().is_empty() {
        errors.push(ValidationError::EmptyMnemonic);
    }
    if !config.storage.bootstrap.is_empty() {
        errors.push(ValidationError::BootstrapPeers);
    }
    if config.contracts.executable.trim().is_empty() {
        errors.push(ValidationError::EmptyExecutable);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&StackConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = StackConfig::default();
        config.chain.port = 0;
        config.storage.gateway_port = config.storage.api_port;
        config.chain.total_accounts = 0;
        config.storage.bootstrap.push("/ip4/1.2.3.4/tcp/4001".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroPort { field: "chain.port" }));
        assert!(errors.contains(&ValidationError::DuplicatePort {
            port: 5002,
            first: "storage.api_port",
            second: "storage.gateway_port",
        }));
        assert!(errors.contains(&ValidationError::NoAccounts));
        assert!(errors.contains(&ValidationError::BootstrapPeers));
    }
}
