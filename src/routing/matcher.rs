//! Route matching logic.
//!
//! # Responsibilities
//! - Match a mount-relative path against a single route pattern
//! - Report the unmatched remainder for include patterns
//!
//! # Design Decisions
//! - Path matching is case-sensitive, trailing slash included
//! - Empty include prefix = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use std::fmt;

/// Pattern of one route entry, relative to the mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches exactly this relative path (e.g. `login/`).
    Exact(&'static str),
    /// Matches every relative path starting with the prefix and hands the
    /// rest to another route table.
    Include(&'static str),
}

/// Outcome of a successful match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch<'a> {
    Exact,
    Include { remainder: &'a str },
}

impl PathPattern {
    /// Match a mount-relative path.
    pub fn matches<'a>(&self, relative: &'a str) -> Option<PatternMatch<'a>> {
        match self {
            PathPattern::Exact(literal) => (relative == *literal).then_some(PatternMatch::Exact),
            PathPattern::Include(prefix) => relative
                .strip_prefix(prefix)
                .map(|remainder| PatternMatch::Include { remainder }),
        }
    }

    /// The literal text of the pattern.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathPattern::Exact(s) | PathPattern::Include(s) => *s,
        }
    }

    /// True if `literal` would be captured by this pattern.
    pub(crate) fn covers(&self, literal: &str) -> bool {
        self.matches(literal).is_some()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(s) => write!(f, "{}", s),
            PathPattern::Include(s) => write!(f, "{}*", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher() {
        let pattern = PathPattern::Exact("login/");

        assert_eq!(pattern.matches("login/"), Some(PatternMatch::Exact));
        assert_eq!(pattern.matches("login"), None); // Trailing slash is significant
        assert_eq!(pattern.matches("LOGIN/"), None); // Case sensitive
        assert_eq!(pattern.matches("login/extra"), None);
    }

    #[test]
    fn test_include_matcher() {
        let everything = PathPattern::Include("");
        assert_eq!(
            everything.matches("google/login/"),
            Some(PatternMatch::Include { remainder: "google/login/" })
        );
        assert_eq!(
            everything.matches(""),
            Some(PatternMatch::Include { remainder: "" })
        );

        let social = PathPattern::Include("social/");
        assert_eq!(
            social.matches("social/github/"),
            Some(PatternMatch::Include { remainder: "github/" })
        );
        assert_eq!(social.matches("login/"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PathPattern::Exact("logout/").to_string(), "logout/");
        assert_eq!(PathPattern::Include("").to_string(), "*");
    }
}
