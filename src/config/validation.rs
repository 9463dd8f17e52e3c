//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::ViewName;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("accounts.mount must start with '/', got '{0}'")]
    InvalidMount(String),

    #[error("{field}: invalid upstream URL '{value}': {reason}")]
    InvalidUpstream {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field}: invalid HTTP method '{value}'")]
    InvalidMethod { field: String, value: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration. Collects every error before returning.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if !config.accounts.mount.starts_with('/') {
        errors.push(ValidationError::InvalidMount(config.accounts.mount.clone()));
    }

    for view in ViewName::ALL {
        let view_config = config.views.get(view);
        let field = format!("views.{}", view);
        check_upstream(&mut errors, format!("{}.upstream", field), &view_config.upstream);

        for method in &view_config.methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    field: format!("{}.methods", field),
                    value: method.clone(),
                });
            }
        }
    }

    if config.social_auth.enabled {
        check_upstream(
            &mut errors,
            "social_auth.upstream".to_string(),
            &config.social_auth.upstream,
        );
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_upstream(errors: &mut Vec<ValidationError>, field: String, value: &str) {
    let reason = match Url::parse(value) {
        Ok(url) if url.scheme() != "http" => format!("unsupported scheme '{}'", url.scheme()),
        Ok(url) if url.host_str().is_none() => "missing host".to_string(),
        Ok(_) => return,
        Err(e) => e.to_string(),
    };

    errors.push(ValidationError::InvalidUpstream {
        field,
        value: value.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.accounts.mount = "accounts/".into();
        config.views.login.upstream = "https://idp.example.com/login/".into();
        config.views.logout.methods = vec!["GET POST".into()];
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidMount("accounts/".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("request_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUpstream { field, .. } if field == "views.login.upstream")));
    }

    #[test]
    fn test_disabled_social_auth_skips_upstream_check() {
        let mut config = GatewayConfig::default();
        config.social_auth.upstream = "::nonsense::".into();
        assert!(validate_config(&config).is_err());

        config.social_auth.enabled = false;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidAddress {
                field: "observability.metrics_address",
                value: "nowhere".into(),
            }]
        );
    }
}
