//! Fixture population.
//!
//! # Data Flow
//! ```text
//! fixture root
//!     → discover_files (recursive, sorted, relative `/` paths)
//!     → POST /api/v0/add?path=<relative> per file
//!     → Vec<FixtureUpload { cid, path }> (one per discovered file)
//! ```

pub mod populator;

pub use populator::{FixturePopulator, FixtureUpload, PopulateOptions};
