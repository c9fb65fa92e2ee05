//! Rule registry.
//!
//! # Responsibilities
//! - Own the ordered rule list and the id counter
//! - Serve concurrent lookups for the dispatch path
//! - Apply management mutations and persist them
//!
//! # Design Decisions
//! - One `parking_lot::RwLock` guards both the rules and the counter; it is
//!   never held across an `.await`
//! - Writers hold the lock for the whole mutation, including the save, so
//!   the stored document always reflects a complete in-memory state
//! - Lookups are a linear scan in insertion order and the first match wins,
//!   even when a later rule has a longer base path
//! - Rules are handed out as `Arc<Rule>` so a forward never holds the lock

use std::sync::Arc;

use parking_lot::RwLock;

use crate::http::proxy::HttpClient;
use crate::observability::metrics;
use crate::routing::rule::{Route, Rule, RuleDescriptor, RuleId};
use crate::store::{RuleStore, StoreError};

struct RegistryInner {
    rules: Vec<Arc<Rule>>,
    next_id: RuleId,
}

/// Authoritative, concurrency-safe collection of rules.
pub struct Registry {
    inner: RwLock<RegistryInner>,
    store: Arc<dyn RuleStore>,
}

impl Registry {
    /// Empty registry persisting into `store`.
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                rules: Vec::new(),
                next_id: 0,
            }),
            store,
        }
    }

    /// Build the registry from the stored rule set.
    ///
    /// Entries get their position as id. An entry whose URLs do not parse is
    /// skipped and its id stays unused; new rules start after the last entry.
    pub fn load(store: Arc<dyn RuleStore>, client: &HttpClient) -> Result<Self, StoreError> {
        let descriptors = store.load()?;
        let mut rules = Vec::with_capacity(descriptors.len());

        for (id, desc) in (0..).zip(descriptors.iter()) {
            match Route::parse(&desc.from, &desc.to, client) {
                Ok(route) => rules.push(Arc::new(Rule::new(id, route))),
                Err(e) => {
                    tracing::warn!(id, from = %desc.from, to = %desc.to, error = %e, "Skipping invalid rule");
                }
            }
        }

        tracing::info!(loaded = rules.len(), stored = descriptors.len(), "Rules loaded");
        metrics::set_rule_count(rules.len());

        Ok(Self {
            inner: RwLock::new(RegistryInner {
                rules,
                next_id: descriptors.len() as RuleId,
            }),
            store,
        })
    }

    /// Snapshot of every rule, in match order.
    pub fn list(&self) -> Vec<Arc<Rule>> {
        self.inner.read().rules.clone()
    }

    /// Snapshot in durable form.
    pub fn descriptors(&self) -> Vec<RuleDescriptor> {
        self.inner.read().rules.iter().map(|r| r.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign the next id to `route`, append it, persist, and return the id.
    pub fn append(&self, route: Route) -> RuleId {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.rules.push(Arc::new(Rule::new(id, route)));
        self.persist(&inner.rules);
        id
    }

    /// Remove the rule with `id`. Persists only when a rule was removed.
    pub fn remove(&self, id: RuleId) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.rules.iter().position(|r| r.id() == id) else {
            return false;
        };
        inner.rules.remove(index);
        self.persist(&inner.rules);
        true
    }

    /// First rule, in insertion order, matching `host` and `path`.
    pub fn find_match(&self, host: &str, path: &str) -> Option<Arc<Rule>> {
        self.inner
            .read()
            .rules
            .iter()
            .find(|r| r.matches(host, path))
            .cloned()
    }

    fn persist(&self, rules: &[Arc<Rule>]) {
        metrics::set_rule_count(rules.len());
        let descriptors: Vec<RuleDescriptor> = rules.iter().map(|r| r.descriptor()).collect();
        if let Err(e) = self.store.save(&descriptors) {
            tracing::error!(error = %e, rules = descriptors.len(), "Failed to persist rules; keeping in-memory state");
        }
    }
}
