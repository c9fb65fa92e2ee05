//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → dispatch.rs (extract host/path, forward or 404)
//!     → registry.rs (read lock, first-match scan)
//!     → matcher.rs (host equality, base path prefix)
//!     → Return: matched Rule or NoMatch
//!
//! Management mutation:
//!     Route::parse (rule.rs, validates URLs, builds proxy)
//!     → registry.rs (write lock, assign id, append/remove, persist)
//! ```
//!
//! # Design Decisions
//! - Rules mutable at runtime behind a reader/writer lock
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same rule
//! - First match wins (ordered by insertion, not by specificity)

pub mod dispatch;
pub mod matcher;
pub mod registry;
pub mod rule;

pub use dispatch::Dispatcher;
pub use registry::Registry;
pub use rule::{Route, Rule, RuleDescriptor, RuleError, RuleId};
