//! Route matching logic.
//!
//! # Responsibilities
//! - Match host (exact match, case-insensitive)
//! - Match path prefix (case-sensitive, undecoded)
//! - Strip the matched prefix before forwarding
//!
//! # Design Decisions
//! - Host matching is case-insensitive
//! - Path matching is case-sensitive and purely textual: a base path of
//!   `/api/` is compared as `/api`, so `/apix` matches too
//! - No regex to guarantee O(n) matching

/// Matches the request host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_ascii_lowercase(),
        }
    }

    /// Returns true if `host` (already stripped of any port) is the expected one.
    pub fn matches(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.expected_host)
    }

    pub fn host(&self) -> &str {
        &self.expected_host
    }
}

/// Matches the request path against a base path.
///
/// The base path is kept with its trailing `/`; comparison uses it without.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    base_path: String,
}

impl PathPrefixMatcher {
    /// Create a matcher from a base path, appending a trailing `/` if absent.
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self { base_path }
    }

    /// Normalized base path, always ending in `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The prefix actually compared against request paths.
    pub fn prefix(&self) -> &str {
        &self.base_path[..self.base_path.len() - 1]
    }

    /// Returns true if the path starts with the prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Remove the prefix from `path`. `None` if the path is shorter than the
    /// prefix or does not start with it.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix())
    }
}
