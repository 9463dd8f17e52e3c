//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::ViewName;

/// Root configuration for the accounts gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the accounts module is mounted.
    pub accounts: AccountsConfig,

    /// Upstreams serving the register, login and logout views.
    pub views: ViewsConfig,

    /// External social-authentication route table.
    pub social_auth: SocialAuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Mount point of the accounts module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Path prefix every accounts route lives under (e.g., "/accounts/").
    pub mount: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            mount: "/accounts/".to_string(),
        }
    }
}

/// One upstream per named view.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub register: ViewConfig,
    pub login: ViewConfig,
    pub logout: ViewConfig,
}

impl ViewsConfig {
    /// Configuration of a single view.
    pub fn get(&self, view: ViewName) -> &ViewConfig {
        match view {
            ViewName::Register => &self.register,
            ViewName::Login => &self.login,
            ViewName::Logout => &self.logout,
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            register: ViewConfig::new("http://127.0.0.1:8000/accounts/register/"),
            login: ViewConfig::new("http://127.0.0.1:8000/accounts/login/"),
            logout: ViewConfig::new("http://127.0.0.1:8000/accounts/logout/"),
        }
    }
}

/// Upstream for a single view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    /// Full URL the view is served from. Its path replaces the request path.
    pub upstream: String,

    /// Methods the view accepts. Empty = every method is forwarded.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ViewConfig {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            methods: Vec::new(),
        }
    }
}

/// Social-authentication delegation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SocialAuthConfig {
    /// Forward unmatched accounts paths to the social-auth upstream.
    pub enabled: bool,

    /// Label of the library serving the delegated table (logging only).
    pub provider: String,

    /// Base URL of the social-auth upstream. Request paths are appended unmodified.
    pub upstream: String,
}

impl Default for SocialAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "allauth".to_string(),
            upstream: "http://127.0.0.1:8000".to_string(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
