//! Single-backend reverse proxy.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the backend (scheme, authority, joined path, merged query)
//! - Rewrite `Host` to the backend and add `X-Forwarded-*` headers
//! - Strip hop-by-hop headers in both directions
//! - Stream request and response bodies without buffering
//! - Relay protocol upgrades (WebSocket and friends) once the backend answers `101`
//!
//! One [`ReverseProxy`] is built per rule when the rule is created and reused for
//! every request it matches. All proxies share one pooled [`HttpClient`].

use std::net::SocketAddr;
use std::str::FromStr;

use axum::{
    body::Body,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        uri::{Authority, Scheme},
        Request, Response, StatusCode, Uri,
    },
};
use hyper::upgrade::OnUpgrade;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioIo},
};
use thiserror::Error;
use url::Url;

use crate::routing::RuleError;

/// Pooled HTTP/1.1 client shared by every rule.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the shared client.
pub fn build_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors raised while forwarding a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("cannot build upstream URI: {0}")]
    Uri(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Forwards requests to one backend origin.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    target: Url,
    authority: Authority,
    host_header: HeaderValue,
    client: HttpClient,
}

impl ReverseProxy {
    /// Build a proxy for `target`. Only plain `http` backends are supported.
    pub fn new(target: Url, client: HttpClient) -> Result<Self, RuleError> {
        let unsupported = || RuleError::UnsupportedBackend(target.to_string());
        if target.scheme() != "http" {
            return Err(unsupported());
        }
        let host = target.host_str().ok_or_else(unsupported)?;
        let authority = match target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|_| unsupported())?;
        let host_header = HeaderValue::from_str(authority.as_str()).map_err(|_| unsupported())?;

        Ok(Self {
            target,
            authority,
            host_header,
            client,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Upstream URI for a rewritten path and the inbound query string.
    pub fn upstream_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
        let mut path_and_query = join_paths(self.target.path(), path);
        let query = match (self.target.query().filter(|q| !q.is_empty()), query.filter(|q| !q.is_empty())) {
            (Some(target), Some(inbound)) => Some(format!("{target}&{inbound}")),
            (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
            (None, None) => None,
        };
        if let Some(query) = query {
            path_and_query.push('?');
            path_and_query.push_str(&query);
        }

        let uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;
        Ok(uri)
    }

    /// Forward `request` with its path replaced by `path`.
    ///
    /// An upgrade request keeps its `Upgrade` header. When the backend switches
    /// protocols, both upgraded connections are spliced together in a background task.
    pub async fn forward(
        &self,
        mut request: Request<Body>,
        path: &str,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, ProxyError> {
        let upgrade = upgrade_protocol(request.headers());
        let inbound_upgrade = upgrade.is_some().then(|| hyper::upgrade::on(&mut request));

        let (mut parts, body) = request.into_parts();
        let uri = self.upstream_uri(path, parts.uri.query())?;

        let inbound_host = parts.headers.get(header::HOST).cloned();
        strip_hop_by_hop(&mut parts.headers);

        let headers = &mut parts.headers;
        if let Some(protocol) = upgrade {
            headers.insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
            headers.insert(header::UPGRADE, protocol);
        }
        if let Some(host) = inbound_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
        if let Some(addr) = client_addr {
            append_forwarded_for(headers, addr);
        }
        headers.insert(header::HOST, self.host_header.clone());

        parts.uri = uri;
        parts.version = axum::http::Version::HTTP_11;

        tracing::debug!(upstream = %parts.uri, method = %parts.method, "Forwarding request");

        let mut response = self.client.request(Request::from_parts(parts, body)).await?;

        if response.status() == StatusCode::SWITCHING_PROTOCOLS {
            if let Some(inbound) = inbound_upgrade {
                let upstream = hyper::upgrade::on(&mut response);
                tokio::spawn(splice_upgraded(inbound, upstream));
                let (parts, body) = response.into_parts();
                return Ok(Response::from_parts(parts, Body::new(body)));
            }
        }

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Protocol named in `Upgrade` when `Connection` asks for an upgrade.
fn upgrade_protocol(headers: &HeaderMap) -> Option<HeaderValue> {
    let requested = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    if requested {
        headers.get(header::UPGRADE).cloned()
    } else {
        None
    }
}

/// Copy bytes both ways between the client and the backend until either side closes.
async fn splice_upgraded(inbound: OnUpgrade, upstream: OnUpgrade) {
    let (client, backend) = match tokio::try_join!(inbound, upstream) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(error = %e, "Protocol upgrade failed");
            return;
        }
    };

    let mut client = TokioIo::new(client);
    let mut backend = TokioIo::new(backend);
    match tokio::io::copy_bidirectional(&mut client, &mut backend).await {
        Ok((sent, received)) => {
            tracing::debug!(sent, received, "Upgraded connection closed");
        }
        Err(e) => {
            tracing::debug!(error = %e, "Upgraded connection ended with error");
        }
    }
}

/// Join two paths with exactly one `/` between them. An empty result becomes `/`.
fn join_paths(base: &str, suffix: &str) -> String {
    let joined = match (base.ends_with('/'), suffix.starts_with('/')) {
        (true, true) => format!("{}{}", base, &suffix[1..]),
        (false, false) if !suffix.is_empty() => format!("{base}/{suffix}"),
        _ => format!("{base}{suffix}"),
    };
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_str(name.trim()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let ip = addr.ip().to_string();
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{prior}, {ip}"),
        None => ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
