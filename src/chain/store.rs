//! Chain state and its persistence backends.
//!
//! # Backends
//! - [`MemoryStore`]: ephemeral, state dies with the service
//! - [`DiskStore`]: JSON snapshot in the data directory, reloaded on start
//!
//! The backend is chosen once per start; the ledger never switches.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the on-disk snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "chain.json";

/// Balance entry of a single account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: Address,
    pub balance: U256,
}

/// Everything the emulator remembers between requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainState {
    pub block_number: u64,
    pub accounts: Vec<AccountBalance>,
}

impl ChainState {
    /// Genesis state: block 0, every account funded with `balance`.
    pub fn genesis(addresses: &[Address], balance: U256) -> Self {
        Self {
            block_number: 0,
            accounts: addresses
                .iter()
                .map(|address| AccountBalance {
                    address: *address,
                    balance,
                })
                .collect(),
        }
    }

    pub fn balance_of(&self, address: &Address) -> U256 {
        self.accounts
            .iter()
            .find(|a| &a.address == address)
            .map(|a| a.balance)
            .unwrap_or(U256::ZERO)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|a| a.address).collect()
    }
}

/// Persistence backend for [`ChainState`].
pub trait ChainStore: Send + fmt::Debug {
    /// Previously persisted state, if any.
    fn load(&mut self) -> io::Result<Option<ChainState>>;

    /// Persist the current state.
    fn persist(&mut self, state: &ChainState) -> io::Result<()>;

    /// Short backend name for logs.
    fn kind(&self) -> &'static str;
}

/// Ephemeral in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStore;

impl ChainStore for MemoryStore {
    fn load(&mut self) -> io::Result<Option<ChainState>> {
        Ok(None)
    }

    fn persist(&mut self, _state: &ChainState) -> io::Result<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

/// Durable backend writing a JSON snapshot into a data directory.
#[derive(Debug)]
pub struct DiskStore {
    snapshot: PathBuf,
}

impl DiskStore {
    /// Open the store, creating `dir` if needed. An existing directory is fine.
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            snapshot: dir.join(SNAPSHOT_FILE),
        })
    }
}

impl ChainStore for DiskStore {
    fn load(&mut self) -> io::Result<Option<ChainState>> {
        let content = match fs::read_to_string(&self.snapshot) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let state = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(state))
    }

    fn persist(&mut self, state: &ChainState) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        // write-then-rename so a crash never leaves a torn snapshot
        let tmp = self.snapshot.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.snapshot)
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}
