//! Endpoint that forwards to an upstream HTTP service.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;

use crate::http::forward::{append_path, replace_path, ForwardError, Forwarder};
use crate::views::Endpoint;

/// How the request path maps onto the upstream URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRewrite {
    /// Use the upstream URL's path (views).
    Replace,
    /// Append the request path to the upstream base (delegated table).
    Append,
}

#[derive(Debug, Clone)]
pub struct UpstreamEndpoint {
    label: String,
    upstream: Uri,
    rewrite: PathRewrite,
    methods: Vec<Method>,
    forwarder: Forwarder,
}

impl UpstreamEndpoint {
    pub fn new(
        label: &str,
        upstream: &str,
        rewrite: PathRewrite,
        forwarder: Forwarder,
    ) -> Result<Self, ForwardError> {
        let upstream: Uri = upstream
            .parse()
            .map_err(|e| ForwardError::InvalidUri(format!("{}: {}", upstream, e)))?;

        if upstream.scheme().is_none() || upstream.authority().is_none() {
            return Err(ForwardError::InvalidUri(format!(
                "{}: scheme and host required",
                upstream
            )));
        }

        Ok(Self {
            label: label.to_string(),
            upstream,
            rewrite,
            methods: Vec::new(),
            forwarder,
        })
    }

    /// Restrict the endpoint to these methods. Empty = all methods.
    pub fn with_methods(mut self, methods: &[String]) -> Result<Self, ForwardError> {
        self.methods = methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.as_bytes())
                    .map_err(|_| ForwardError::InvalidMethod(m.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    fn target_for(&self, incoming: &Uri) -> Result<Uri, ForwardError> {
        match self.rewrite {
            PathRewrite::Replace => replace_path(&self.upstream, incoming),
            PathRewrite::Append => append_path(&self.upstream, incoming),
        }
    }

    fn method_not_allowed(&self) -> Response {
        let allow = self
            .methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(header::ALLOW, value);
        }
        response
    }
}

impl Endpoint for UpstreamEndpoint {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        if !self.allows(request.method()) {
            tracing::debug!(endpoint = %self.label, method = %request.method(), "Method not allowed");
            let response = self.method_not_allowed();
            return Box::pin(async move { response });
        }

        let target = self.target_for(request.uri());
        let forwarder = self.forwarder.clone();
        let label = self.label.clone();

        Box::pin(async move {
            let result = match target {
                Ok(target) => {
                    tracing::debug!(endpoint = %label, target = %target, "Forwarding request");
                    forwarder.forward(request, target).await
                }
                Err(e) => Err(e),
            };

            result.unwrap_or_else(|e| {
                tracing::error!(endpoint = %label, error = %e, "Upstream request failed");
                e.into_response()
            })
        })
    }
}
