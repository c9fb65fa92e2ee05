//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load rules → Build registry → Bind entry + management listeners → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting on both listeners → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, start_with_registry, RunningRouter, StartupError};
