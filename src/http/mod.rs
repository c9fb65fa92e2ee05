//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (extract host and request ID)
//!     → [routing::Dispatcher picks a rule]
//!     → proxy.rs (rewrite URI and headers, forward, stream response)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod server;

pub use proxy::{build_client, HttpClient, ReverseProxy};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
