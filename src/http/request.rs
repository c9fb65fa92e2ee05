//! Request inspection helpers.
//!
//! # Responsibilities
//! - Extract the routing host (Host header, or URI authority for HTTP/2)
//! - Read the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - The port in a Host header never takes part in matching, so `Host: a.com:8080`
//!   selects a rule registered for `a.com`. Rules carry no port to compare against.

use axum::{
    body::Body,
    http::{header, Request},
};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Host the request was addressed to, without any port.
pub fn request_host(request: &Request<Body>) -> Option<&str> {
    let raw = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))?;
    Some(strip_port(raw))
}

/// Correlation ID set by `SetRequestIdLayer`, if any.
pub fn request_id(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop anything after them.
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
