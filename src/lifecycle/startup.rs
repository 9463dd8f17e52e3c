//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready-to-run server
//! - Start the metrics exporter when enabled
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind last (traffic only when ready)

use std::net::SocketAddr;

use crate::config::GatewayConfig;
use crate::http::{ForwardError, Forwarder, GatewayServer};
use crate::observability::logging::LoggingError;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::views::Endpoints;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("endpoint setup failed: {0}")]
    Endpoint(#[from] ForwardError),

    #[error("invalid address '{0}'")]
    Address(String),

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Route table and upstream endpoints for `config`.
pub fn build_server(config: &GatewayConfig) -> Result<GatewayServer, StartupError> {
    let table = RouteTable::accounts(&config.accounts.mount);
    let forwarder = Forwarder::new(&config.timeouts);
    let endpoints = Endpoints::from_config(config, &forwarder)?;

    tracing::info!(
        mount = %table.mount(),
        routes = table.routes().len(),
        social_auth = config.social_auth.enabled,
        provider = %config.social_auth.provider,
        "Route table ready"
    );

    Ok(GatewayServer::new(table, endpoints))
}

/// Install the Prometheus exporter if configured.
pub fn start_metrics(config: &GatewayConfig) -> Result<(), StartupError> {
    if !config.observability.metrics_enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .observability
        .metrics_address
        .parse()
        .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
    metrics::init_metrics(addr)?;
    Ok(())
}
