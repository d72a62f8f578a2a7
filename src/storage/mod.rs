//! Local content-addressed storage node.
//!
//! # Data Flow
//! ```text
//! POST /api/v0/add (API port)
//!     → blocks.rs (keccak-256 content id, one file per block under data/ipfs/blocks)
//!     → { Hash, Name, Size }
//!
//! GET /ipfs/{cid} (gateway port)
//!     → blocks.rs lookup → raw bytes | 404
//! ```
//!
//! # Design Decisions
//! - Isolated node: no bootstrap peers, no outbound connections
//! - Identifiers are deterministic, re-adding content is a no-op

pub mod api;
pub mod blocks;
pub mod service;

pub use service::StorageService;
