//! In-memory store for tests and throwaway runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{RuleStore, StoreError};
use crate::routing::RuleDescriptor;

/// Keeps the last saved rule set in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: Mutex<Vec<RuleDescriptor>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if `rules` had been saved by a previous run.
    pub fn with_rules(rules: Vec<RuleDescriptor>) -> Self {
        Self {
            rules: Mutex::new(rules),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<RuleDescriptor> {
        self.rules.lock().clone()
    }
}

impl RuleStore for MemoryStore {
    fn load(&self) -> Result<Vec<RuleDescriptor>, StoreError> {
        Ok(self.rules.lock().clone())
    }

    fn save(&self, rules: &[RuleDescriptor]) -> Result<(), StoreError> {
        *self.rules.lock() = rules.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
