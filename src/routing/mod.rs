//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → decode_path (percent-decode, reject encoded '/')
//!     → router.rs (strip mount, scan entries in order)
//!     → matcher.rs (evaluate pattern against relative path)
//!     → Return: View, Delegated or NotFound
//!
//! Table construction (at startup):
//!     urlpatterns()
//!     → mounted at accounts.mount
//!     → frozen as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes declared as a literal list, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins; explicit entries precede the include

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, PatternMatch};
pub use router::{decode_path, Resolution, Route, RouteInfo, RouteTable, RouteTableError, RouteTarget, ViewName};

/// URL patterns of the accounts module, in match order.
///
/// Everything not claimed by the three views goes to the social-auth table.
pub fn urlpatterns() -> Vec<Route> {
    vec![
        Route::view("register/", ViewName::Register, "register"),
        Route::view("login/", ViewName::Login, "login"),
        Route::view("logout/", ViewName::Logout, "logout"),
        Route::include(""),
    ]
}
