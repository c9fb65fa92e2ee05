//! Rule persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RuleStore::load() → Vec<RuleDescriptor> → Registry::load
//!
//! Every successful append/remove (under the registry write lock):
//!     Registry → Vec<RuleDescriptor> → RuleStore::save()
//! ```
//!
//! # Design Decisions
//! - The whole document is rewritten on every mutation; no incremental format
//! - Writes go to a temporary file and are renamed into place, so a reader
//!   never observes a torn document
//! - A failed save is reported by the caller, never rolled back

pub mod json_file;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

use crate::routing::RuleDescriptor;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors raised by rule storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read rules from {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed rule document {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot encode rules: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot write rules to {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Durable storage for the rule set.
pub trait RuleStore: Send + Sync {
    /// Read the full rule set, in order.
    fn load(&self) -> Result<Vec<RuleDescriptor>, StoreError>;

    /// Replace the stored rule set.
    fn save(&self, rules: &[RuleDescriptor]) -> Result<(), StoreError>;
}
