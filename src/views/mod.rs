//! View and delegate endpoints.
//!
//! The route table only decides *which* endpoint gets a request. What the
//! endpoint does with it lives behind [`Endpoint`]: in production every
//! endpoint is an [`UpstreamEndpoint`] forwarding to the service that owns
//! the view or the social-auth table.

pub mod upstream;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;

use crate::config::GatewayConfig;
use crate::http::forward::{ForwardError, Forwarder};
use crate::routing::ViewName;

pub use upstream::{PathRewrite, UpstreamEndpoint};

/// Something that turns a routed request into a response.
pub trait Endpoint: Send + Sync + fmt::Debug {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response>;
}

/// Endpoints behind the route table: one per view plus the optional delegate.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    views: HashMap<ViewName, Arc<dyn Endpoint>>,
    delegate: Option<Arc<dyn Endpoint>>,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, view: ViewName, endpoint: impl Endpoint + 'static) -> Self {
        self.views.insert(view, Arc::new(endpoint));
        self
    }

    pub fn with_delegate(mut self, endpoint: impl Endpoint + 'static) -> Self {
        self.delegate = Some(Arc::new(endpoint));
        self
    }

    /// Upstream endpoints for every view and, if enabled, the social-auth table.
    pub fn from_config(config: &GatewayConfig, forwarder: &Forwarder) -> Result<Self, ForwardError> {
        let mut endpoints = Self::new();

        for view in ViewName::ALL {
            let view_config = config.views.get(view);
            let endpoint = UpstreamEndpoint::new(
                view.as_str(),
                &view_config.upstream,
                PathRewrite::Replace,
                forwarder.clone(),
            )?
            .with_methods(&view_config.methods)?;
            endpoints = endpoints.with_view(view, endpoint);
        }

        if config.social_auth.enabled {
            let endpoint = UpstreamEndpoint::new(
                &config.social_auth.provider,
                &config.social_auth.upstream,
                PathRewrite::Append,
                forwarder.clone(),
            )?;
            endpoints = endpoints.with_delegate(endpoint);
        }

        Ok(endpoints)
    }

    pub fn view(&self, view: ViewName) -> Option<&Arc<dyn Endpoint>> {
        self.views.get(&view)
    }

    pub fn delegate(&self) -> Option<&Arc<dyn Endpoint>> {
        self.delegate.as_ref()
    }
}
