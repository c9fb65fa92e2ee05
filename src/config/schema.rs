//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Root configuration for the host router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, entry and management ports).
    pub listener: ListenerConfig,

    /// Where the rule document lives.
    pub storage: StorageConfig,

    /// Management listener settings.
    pub admin: AdminConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address both listeners bind to.
    pub bind_address: String,

    /// Port serving proxied traffic.
    pub main_port: u16,

    /// Port serving the management API and UI.
    pub manage_port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            main_port: 80,
            manage_port: 8080,
        }
    }
}

impl ListenerConfig {
    /// `host:port` string for the entry listener.
    pub fn main_address(&self) -> String {
        self.address(self.main_port)
    }

    /// `host:port` string for the management listener.
    pub fn manage_address(&self) -> String {
        self.address(self.manage_port)
    }

    fn address(&self, port: u16) -> String {
        match self.bind_address.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, port).to_string(),
            Err(_) => format!("{}:{}", self.bind_address, port),
        }
    }
}

/// Rule document location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON rule document.
    pub rules_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            rules_path: "config.json".to_string(),
        }
    }
}

/// Management listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Directory holding the management UI assets.
    pub static_dir: String,

    /// Bearer token required on `/list`. `None` leaves the API open.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            static_dir: "frontend".to_string(),
            api_key: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout applied on both listeners, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        let config = RouterConfig::default();
        assert_eq!(config.listener.main_port, 80);
        assert_eq!(config.listener.manage_port, 8080);
        assert_eq!(config.storage.rules_path, "config.json");
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [listener]
            main_port = 8000

            [admin]
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.main_port, 8000);
        assert_eq!(config.listener.manage_port, 8080);
        assert_eq!(config.listener.main_address(), "0.0.0.0:8000");
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));

        let ipv6 = ListenerConfig {
            bind_address: "::".into(),
            ..ListenerConfig::default()
        };
        assert_eq!(ipv6.manage_address(), "[::]:8080");
        assert_eq!(config.timeouts.request_secs, 60);
    }
}
