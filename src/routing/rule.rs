//! Routing rules and their durable form.
//!
//! A [`Route`] is a parsed `from` → `to` pair with its reverse proxy already
//! built. The [`Registry`](super::Registry) turns it into a [`Rule`] by
//! assigning an id.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::http::proxy::{HttpClient, ReverseProxy};
use crate::routing::matcher::{HostMatcher, PathPrefixMatcher};

/// Identifier assigned by the registry. Never reused while the process runs.
pub type RuleId = u64;

/// Durable and wire form of a rule.
///
/// `from` is `scheme://host/basePath/`, `to` is the backend URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    #[serde(default)]
    pub id: RuleId,
    pub from: String,
    pub to: String,
}

/// Why a `from`/`to` pair could not become a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid source URL {url:?}: {source}")]
    InvalidFrom { url: String, source: url::ParseError },

    #[error("source URL {0:?} has no host")]
    MissingHost(String),

    #[error("invalid backend URL {url:?}: {source}")]
    InvalidBackend { url: String, source: url::ParseError },

    #[error("backend URL {0:?} must be an absolute http URL with a host")]
    UnsupportedBackend(String),
}

/// A parsed rule that has not been given an id yet.
#[derive(Debug, Clone)]
pub struct Route {
    from: Url,
    host: HostMatcher,
    base_path: PathPrefixMatcher,
    proxy: ReverseProxy,
}

impl Route {
    /// Parse a `from`/`to` pair and build the reverse proxy for `to`.
    pub fn parse(from: &str, to: &str, client: &HttpClient) -> Result<Self, RuleError> {
        let mut from_url = Url::parse(from).map_err(|source| RuleError::InvalidFrom {
            url: from.to_string(),
            source,
        })?;
        let host = from_url
            .host_str()
            .ok_or_else(|| RuleError::MissingHost(from.to_string()))?
            .to_string();

        let base_path = PathPrefixMatcher::new(from_url.path());
        from_url.set_path(base_path.base_path());

        let to_url = Url::parse(to).map_err(|source| RuleError::InvalidBackend {
            url: to.to_string(),
            source,
        })?;
        let proxy = ReverseProxy::new(to_url, client.clone())?;

        Ok(Self {
            from: from_url,
            host: HostMatcher::new(host),
            base_path,
            proxy,
        })
    }
}

/// One routing rule: host + base path → backend.
#[derive(Debug)]
pub struct Rule {
    id: RuleId,
    route: Route,
}

impl Rule {
    pub fn new(id: RuleId, route: Route) -> Self {
        Self { id, route }
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn host(&self) -> &str {
        self.route.host.host()
    }

    /// Normalized base path, always ending in `/`.
    pub fn base_path(&self) -> &str {
        self.route.base_path.base_path()
    }

    pub fn backend(&self) -> &Url {
        self.route.proxy.target()
    }

    pub fn proxy(&self) -> &ReverseProxy {
        &self.route.proxy
    }

    /// True when `host` equals the rule host and `path` starts with the base path.
    pub fn matches(&self, host: &str, path: &str) -> bool {
        self.route.host.matches(host) && self.route.base_path.matches(path)
    }

    /// Path to forward once the base path has been stripped.
    pub fn rewrite_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.route.base_path.strip(path)
    }

    pub fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            id: self.id,
            from: self.route.from.to_string(),
            to: self.route.proxy.target().to_string(),
        }
    }
}
