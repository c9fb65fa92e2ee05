//! Request dispatch.
//!
//! # Responsibilities
//! - Extract host and path from the inbound request
//! - Look up the first matching rule
//! - Strip the base path and hand the request to the rule's proxy
//! - Map "no rule" to 404 and upstream failures to 502
//!
//! The registry read lock is released by `find_match` before forwarding starts.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::{request_host, request_id};
use crate::observability::metrics::{self, Outcome};
use crate::routing::Registry;

/// Matches requests against the registry and forwards them.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Route one request.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let request_id = request_id(&request).unwrap_or("unknown").to_string();
        let host = request_host(&request).unwrap_or_default().to_string();
        let path = request.uri().path().to_string();

        let Some(rule) = self.registry.find_match(&host, &path) else {
            tracing::debug!(request_id = %request_id, host = %host, path = %path, "No rule matched");
            metrics::record_dispatch(Outcome::NoMatch, start_time);
            return StatusCode::NOT_FOUND.into_response();
        };

        // find_match only returns rules whose prefix `path` starts with.
        let rewritten = rule.rewrite_path(&path).unwrap_or(&path);
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        tracing::debug!(
            request_id = %request_id,
            rule_id = rule.id(),
            host = %host,
            path = %path,
            upstream_path = %rewritten,
            "Rule matched"
        );

        match rule.proxy().forward(request, rewritten, client_addr).await {
            Ok(response) => {
                metrics::record_dispatch(Outcome::Forwarded, start_time);
                response
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    rule_id = rule.id(),
                    backend = %rule.backend(),
                    error = %e,
                    "Upstream error"
                );
                metrics::record_dispatch(Outcome::UpstreamError, start_time);
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }
}
