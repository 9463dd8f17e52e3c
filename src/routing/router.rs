//! Route lookup and reversal.
//!
//! # Responsibilities
//! - Store the ordered route entries under a mount point
//! - Look up the matching route for a request path
//! - Build absolute paths from route names
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; first match wins
//! - Explicit NotFound rather than silent default

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::routing::matcher::{PathPattern, PatternMatch};

/// Named view behind an explicit route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewName {
    Register,
    Login,
    Logout,
}

impl ViewName {
    pub const ALL: [ViewName; 3] = [ViewName::Register, ViewName::Login, ViewName::Logout];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::Register => "register",
            ViewName::Login => "login",
            ViewName::Logout => "logout",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a route hands the request to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewName),
    /// The external social-auth route table.
    Delegate,
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::View(view) => write!(f, "view:{}", view),
            RouteTarget::Delegate => f.write_str("delegate"),
        }
    }
}

/// A single route entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: PathPattern,
    pub target: RouteTarget,
    pub name: Option<&'static str>,
}

impl Route {
    /// Explicit route to a named view.
    pub fn view(path: &'static str, view: ViewName, name: &'static str) -> Self {
        Self {
            pattern: PathPattern::Exact(path),
            target: RouteTarget::View(view),
            name: Some(name),
        }
    }

    /// Forward everything under `prefix` to the social-auth table.
    pub fn include(prefix: &'static str) -> Self {
        Self {
            pattern: PathPattern::Include(prefix),
            target: RouteTarget::Delegate,
            name: None,
        }
    }
}

/// Result of looking up a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// An explicit route matched.
    View { view: ViewName, route: &'a Route },
    /// The path belongs to the delegated table.
    Delegated { remainder: &'a str },
    /// Outside the mount point, or no entry matched.
    NotFound,
}

/// Printable description of one entry, as listed by `accounts-gateway routes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub pattern: String,
    pub path: String,
    pub target: String,
    pub name: Option<&'static str>,
}

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("route name '{0}' is declared more than once")]
    DuplicateName(&'static str),

    #[error("route '{route}' can never match: include '{include}' is declared before it")]
    Shadowed {
        route: &'static str,
        include: &'static str,
    },
}

/// Ordered, immutable route table mounted at a path prefix.
#[derive(Debug, Clone)]
pub struct RouteTable {
    mount: String,
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table, checking name uniqueness and entry ordering.
    pub fn new(mount: &str, routes: Vec<Route>) -> Result<Self, RouteTableError> {
        let mut names = HashSet::new();
        for route in &routes {
            if let Some(name) = route.name {
                if !names.insert(name) {
                    return Err(RouteTableError::DuplicateName(name));
                }
            }
        }

        for (i, route) in routes.iter().enumerate() {
            if let PathPattern::Exact(literal) = route.pattern {
                let shadowing = routes[..i].iter().find(|earlier| {
                    matches!(earlier.pattern, PathPattern::Include(_)) && earlier.pattern.covers(literal)
                });
                if let Some(earlier) = shadowing {
                    return Err(RouteTableError::Shadowed {
                        route: literal,
                        include: earlier.pattern.as_str(),
                    });
                }
            }
        }

        Ok(Self {
            mount: normalize_mount(mount),
            routes,
        })
    }

    /// The accounts table mounted at `mount`.
    pub fn accounts(mount: &str) -> Self {
        Self {
            mount: normalize_mount(mount),
            routes: crate::routing::urlpatterns(),
        }
    }

    /// Normalized mount point, always with leading and trailing slash.
    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route for an absolute request path.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Resolution<'a> {
        let Some(relative) = path.strip_prefix(self.mount.as_str()) else {
            return Resolution::NotFound;
        };

        for route in &self.routes {
            let Some(matched) = route.pattern.matches(relative) else {
                continue;
            };

            return match route.target {
                RouteTarget::View(view) => Resolution::View { view, route },
                RouteTarget::Delegate => Resolution::Delegated {
                    remainder: match matched {
                        PatternMatch::Include { remainder } => remainder,
                        PatternMatch::Exact => "",
                    },
                },
            };
        }

        Resolution::NotFound
    }

    /// One description per entry, in match order.
    pub fn describe(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|route| RouteInfo {
                pattern: route.pattern.to_string(),
                path: format!("{}{}", self.mount, route.pattern),
                target: route.target.to_string(),
                name: route.name,
            })
            .collect()
    }

    /// Absolute path of a named route.
    pub fn reverse(&self, name: &str) -> Option<String> {
        self.routes
            .iter()
            .find(|route| route.name == Some(name))
            .map(|route| format!("{}{}", self.mount, route.pattern.as_str()))
    }
}

/// Percent-decode a request path before matching.
///
/// Returns `None` when the decoded bytes are not UTF-8, or when an encoded
/// `/` would add a segment boundary the raw path does not have.
pub fn decode_path(raw: &str) -> Option<Cow<'_, str>> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.matches('/').count() != raw.matches('/').count() {
        return None;
    }
    Some(decoded)
}

fn normalize_mount(mount: &str) -> String {
    let trimmed = mount.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of(resolution: Resolution<'_>) -> Option<ViewName> {
        match resolution {
            Resolution::View { view, .. } => Some(view),
            _ => None,
        }
    }

    #[test]
    fn test_explicit_routes_resolve_to_their_view() {
        let table = RouteTable::accounts("/accounts/");

        assert_eq!(view_of(table.resolve("/accounts/register/")), Some(ViewName::Register));
        assert_eq!(view_of(table.resolve("/accounts/login/")), Some(ViewName::Login));
        assert_eq!(view_of(table.resolve("/accounts/logout/")), Some(ViewName::Logout));
    }

    #[test]
    fn test_other_paths_are_delegated() {
        let table = RouteTable::accounts("/accounts/");

        assert_eq!(
            table.resolve("/accounts/google/login/"),
            Resolution::Delegated { remainder: "google/login/" }
        );
        // Near-misses of the explicit entries go to the delegate too
        assert_eq!(
            table.resolve("/accounts/login"),
            Resolution::Delegated { remainder: "login" }
        );
        assert_eq!(
            table.resolve("/accounts/"),
            Resolution::Delegated { remainder: "" }
        );
    }

    #[test]
    fn test_outside_mount_is_not_found() {
        let table = RouteTable::accounts("/accounts/");

        assert_eq!(table.resolve("/login/"), Resolution::NotFound);
        assert_eq!(table.resolve("/accounts"), Resolution::NotFound);
        assert_eq!(table.resolve("/accountsx/login/"), Resolution::NotFound);
    }

    #[test]
    fn test_without_include_unmatched_is_not_found() {
        let table = RouteTable::new(
            "/accounts/",
            vec![
                Route::view("register/", ViewName::Register, "register"),
                Route::view("login/", ViewName::Login, "login"),
            ],
        )
        .unwrap();

        assert_eq!(table.resolve("/accounts/logout/"), Resolution::NotFound);
        assert_eq!(view_of(table.resolve("/accounts/login/")), Some(ViewName::Login));
    }

    #[test]
    fn test_reordering_explicit_routes_keeps_resolution() {
        let reordered = RouteTable::new(
            "/accounts/",
            vec![
                Route::view("logout/", ViewName::Logout, "logout"),
                Route::view("register/", ViewName::Register, "register"),
                Route::view("login/", ViewName::Login, "login"),
                Route::include(""),
            ],
        )
        .unwrap();
        let original = RouteTable::accounts("/accounts/");

        for path in ["/accounts/register/", "/accounts/login/", "/accounts/logout/"] {
            assert_eq!(view_of(original.resolve(path)), view_of(reordered.resolve(path)));
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = RouteTable::new(
            "/accounts/",
            vec![
                Route::view("login/", ViewName::Login, "login"),
                Route::view("signin/", ViewName::Login, "login"),
            ],
        )
        .unwrap_err();

        assert_eq!(err, RouteTableError::DuplicateName("login"));
    }

    #[test]
    fn test_include_before_explicit_rejected() {
        let err = RouteTable::new(
            "/accounts/",
            vec![
                Route::include(""),
                Route::view("login/", ViewName::Login, "login"),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            RouteTableError::Shadowed { route: "login/", include: "" }
        );

        // A narrower include that does not cover the literal is fine
        assert!(RouteTable::new(
            "/accounts/",
            vec![
                Route::include("social/"),
                Route::view("login/", ViewName::Login, "login"),
            ],
        )
        .is_ok());
    }

    #[test]
    fn test_accounts_table_is_valid() {
        let table = RouteTable::accounts("accounts");
        assert!(RouteTable::new(table.mount(), table.routes().to_vec()).is_ok());
    }

    #[test]
    fn test_reverse() {
        let table = RouteTable::accounts("/auth");

        assert_eq!(table.mount(), "/auth/");
        assert_eq!(table.reverse("register").as_deref(), Some("/auth/register/"));
        assert_eq!(table.reverse("login").as_deref(), Some("/auth/login/"));
        assert_eq!(table.reverse("logout").as_deref(), Some("/auth/logout/"));
        assert_eq!(table.reverse("password_reset"), None);
    }

    #[test]
    fn test_describe() {
        let table = RouteTable::accounts("/accounts/");
        let described = table.describe();

        assert_eq!(described.len(), 4);
        assert_eq!(
            described[1],
            RouteInfo {
                pattern: "login/".into(),
                path: "/accounts/login/".into(),
                target: "view:login".into(),
                name: Some("login"),
            }
        );
        assert_eq!(described[3].path, "/accounts/*");
        assert_eq!(described[3].target, "delegate");
        assert_eq!(described[3].name, None);
    }

    #[test]
    fn test_root_mount() {
        let table = RouteTable::accounts("/");

        assert_eq!(view_of(table.resolve("/login/")), Some(ViewName::Login));
        assert_eq!(table.reverse("logout").as_deref(), Some("/logout/"));
    }

    #[test]
    fn test_encoded_paths_resolve_after_decoding() {
        let table = RouteTable::accounts("/accounts/");

        let path = decode_path("/accounts/%6Cogout/").unwrap();
        assert_eq!(path, "/accounts/logout/");
        assert_eq!(view_of(table.resolve(&path)), Some(ViewName::Logout));

        let path = decode_path("/%61ccounts/%4C%4f%47%49%4E/").unwrap();
        assert_eq!(path, "/accounts/LOGIN/");
        assert!(matches!(table.resolve(&path), Resolution::Delegated { .. }));

        assert_eq!(decode_path("/accounts/login/").unwrap(), "/accounts/login/");
    }

    #[test]
    fn test_undecodable_paths_rejected() {
        assert_eq!(decode_path("/accounts/login%2F"), None);
        assert_eq!(decode_path("/accounts%2flogin/"), None);
        assert_eq!(decode_path("/accounts/%FF/"), None);
    }
}
