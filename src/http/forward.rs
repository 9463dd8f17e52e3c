//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI and headers for the upstream
//! - Send it over the shared connection pool
//! - Relay the upstream response unchanged (minus hop-by-hop headers)
//! - Map transport failures to 502 / 504

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        uri::{PathAndQuery, Uri},
        Request, StatusCode, Version,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Errors raised while forwarding to an upstream.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    InvalidUri(String),

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::InvalidUri(_) | ForwardError::InvalidMethod(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid upstream").into_response()
            }
            ForwardError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
            ForwardError::Timeout(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "Upstream timed out").into_response()
            }
        }
    }
}

/// Shared HTTP client used by every upstream endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send `request` to `target` and return the upstream response.
    pub async fn forward(&self, request: Request<Body>, target: Uri) -> Result<Response, ForwardError> {
        let (mut parts, body) = request.into_parts();

        let client_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        prepare_headers(&mut parts.headers, &target, client_addr);

        parts.uri = target;
        // The pool speaks HTTP/1.1 to upstreams regardless of the client's version
        parts.version = Version::HTTP_11;

        let upstream_request = Request::from_parts(parts, body);
        let response = tokio::time::timeout(self.request_timeout, self.client.request(upstream_request))
            .await
            .map_err(|_| ForwardError::Timeout(self.request_timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Upstream URI for a view: the upstream's own path, the request's query.
pub fn replace_path(upstream: &Uri, incoming: &Uri) -> Result<Uri, ForwardError> {
    let path = upstream.path();
    let path_and_query = match incoming.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    with_path_and_query(upstream, &path_and_query)
}

/// Upstream URI for the delegate: the request path and query unmodified,
/// below the upstream's base path.
pub fn append_path(upstream: &Uri, incoming: &Uri) -> Result<Uri, ForwardError> {
    let base = upstream.path().trim_end_matches('/');
    let path_and_query = incoming
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");
    with_path_and_query(upstream, &format!("{}{}", base, path_and_query))
}

fn with_path_and_query(upstream: &Uri, path_and_query: &str) -> Result<Uri, ForwardError> {
    let mut parts = upstream.clone().into_parts();
    parts.path_and_query = Some(
        path_and_query
            .parse()
            .map_err(|e| ForwardError::InvalidUri(format!("{}: {}", path_and_query, e)))?,
    );
    Uri::from_parts(parts).map_err(|e| ForwardError::InvalidUri(e.to_string()))
}

fn prepare_headers(headers: &mut HeaderMap, target: &Uri, client_addr: Option<SocketAddr>) {
    strip_hop_by_hop(headers);

    if let Some(host) = headers.remove(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host);
    }
    if let Some(authority) = target.authority() {
        if let Ok(value) = HeaderValue::from_str(authority.as_str()) {
            headers.insert(header::HOST, value);
        }
    }

    if let Some(addr) = client_addr {
        let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, addr.ip()),
            None => addr.ip().to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are connection-scoped as well
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
