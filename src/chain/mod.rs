//! Local chain emulator.
//!
//! # Data Flow
//! ```text
//! ChainConfig + ChainOptions
//!     → store.rs (MemoryStore, or DiskStore under data/db)
//!     → accounts.rs (derive pre-funded accounts from the mnemonic)
//!     → rpc.rs (JSON-RPC router over the ledger)
//!     → service.rs (bind port, spawn server, stop + flush)
//! ```

pub mod accounts;
pub mod rpc;
pub mod service;
pub mod store;

pub use service::{ChainOptions, ChainService};
