//! Responses produced by the gateway itself.
//!
//! Everything else is relayed from an upstream as-is; see `forward.rs` for
//! how transport failures map to 502 / 504.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Routing miss.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Liveness probe, served outside the accounts mount.
pub async fn healthz() -> &'static str {
    "ok"
}
