//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch fallback
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch requests through the route table to endpoints
//! - Record per-route metrics

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{request_id, request_span};
use crate::http::response::{healthz, not_found};
use crate::observability::metrics;
use crate::routing::{decode_path, Resolution, RouteTable};
use crate::views::Endpoints;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub endpoints: Arc<Endpoints>,
}

/// HTTP server for the accounts gateway.
pub struct GatewayServer {
    router: Router,
    table: Arc<RouteTable>,
}

impl GatewayServer {
    /// Create a server dispatching `table` onto `endpoints`.
    pub fn new(table: RouteTable, endpoints: Endpoints) -> Self {
        let table = Arc::new(table);
        let state = AppState {
            table: table.clone(),
            endpoints: Arc::new(endpoints),
        };

        Self {
            router: build_router(state),
            table,
        }
    }

    /// The axum router, for serving or for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount = %self.table.mount(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(dispatch)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Looks up the route and hands the request to its endpoint.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();

    // Match on the decoded path; the endpoint still forwards the raw URI.
    let decoded = decode_path(&path).map(Cow::into_owned);
    let resolution = match decoded.as_deref() {
        Some(decoded) => state.table.resolve(decoded),
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "Undecodable request path");
            Resolution::NotFound
        }
    };

    let (route_label, response) = match resolution {
        Resolution::View { view, route } => match state.endpoints.view(view) {
            Some(endpoint) => {
                tracing::debug!(
                    request_id = %request_id,
                    route = route.name.unwrap_or_default(),
                    pattern = %route.pattern,
                    "Routing to view"
                );
                (view.as_str(), endpoint.call(request).await)
            }
            None => {
                tracing::warn!(request_id = %request_id, view = %view, "No endpoint registered for view");
                ("none", not_found())
            }
        },
        Resolution::Delegated { remainder } => match state.endpoints.delegate() {
            Some(endpoint) => {
                tracing::debug!(request_id = %request_id, remainder = %remainder, "Delegating to social-auth table");
                ("delegate", endpoint.call(request).await)
            }
            None => {
                tracing::warn!(request_id = %request_id, path = %path, "Social-auth delegation disabled");
                ("none", not_found())
            }
        },
        Resolution::NotFound => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            ("none", not_found())
        }
    };

    metrics::record_request(route_label, method.as_str(), response.status().as_u16(), start_time);
    response
}
