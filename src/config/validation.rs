//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate port ranges and that the two listeners do not collide
//! - Validate addresses and timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::RouterConfig;

/// Highest port either listener may use.
pub const MAX_PORT: u16 = 32767;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{name} port {port} is outside 1..={}", MAX_PORT)]
    PortOutOfRange { name: &'static str, port: u16 },

    #[error("main and manage ports must differ (both {0})")]
    PortCollision(u16),

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("rules path must not be empty")]
    EmptyRulesPath,
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let listener = &config.listener;

    for (name, port) in [("main", listener.main_port), ("manage", listener.manage_port)] {
        if port == 0 || port > MAX_PORT {
            errors.push(ValidationError::PortOutOfRange { name, port });
        }
    }
    if listener.main_port == listener.manage_port {
        errors.push(ValidationError::PortCollision(listener.main_port));
    }
    if listener.bind_address.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::BindAddress(listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.storage.rules_path.trim().is_empty() {
        errors.push(ValidationError::EmptyRulesPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_same_ports_rejected() {
        let mut config = RouterConfig::default();
        config.listener.main_port = 9000;
        config.listener.manage_port = 9000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::PortCollision(9000)]);
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RouterConfig::default();
        config.listener.main_port = 0;
        config.listener.manage_port = 40000;
        config.listener.bind_address = "localhost".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::PortOutOfRange { name: "main", port: 0 }));
        assert!(errors.contains(&ValidationError::PortOutOfRange {
            name: "manage",
            port: 40000
        }));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_upper_bound_inclusive() {
        let mut config = RouterConfig::default();
        config.listener.main_port = MAX_PORT;
        assert!(validate_config(&config).is_ok());
    }
}
