//! Accounts gateway library.
//!
//! Serves the URL surface of an authentication module: `register/`,
//! `login/` and `logout/` go to their views, everything else under the
//! mount point is handed to the social-auth route table.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod views;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{urlpatterns, RouteTable, ViewName};
