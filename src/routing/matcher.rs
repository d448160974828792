//! Path prefix matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefixes always start and end with exactly one `/`, so `/prefix/`
//!   never matches `/prefixed`
//! - No regex, a plain `starts_with`

use axum::body::Body;
use axum::http::Request;

/// Normalize a configured prefix: one leading and one trailing `/`.
///
/// `""`, `"/"` and `"//"` all become `"/"`; `"prefix"` and `"/prefix//"`
/// become `"/prefix/"`.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Matches the request path against a normalized prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. The prefix is normalized.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }

    /// True for the prefix without its trailing slash (`/prefix`), which is
    /// redirected rather than served.
    pub fn is_bare_prefix(&self, req: &Request<Body>) -> bool {
        self.prefix.len() > 1 && req.uri().path() == &self.prefix[..self.prefix.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("//"), "/");
        assert_eq!(normalize_prefix("/prefix"), "/prefix/");
        assert_eq!(normalize_prefix("/prefix/"), "/prefix/");
        assert_eq!(normalize_prefix("prefix//"), "/prefix/");
        assert_eq!(normalize_prefix("/a/b"), "/a/b/");
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/prefix");

        assert!(matcher.matches(&req("http://example.com/prefix/index.html")));
        assert!(matcher.matches(&req("/prefix/")));
        assert!(!matcher.matches(&req("/prefixed/index.html")));
        assert!(!matcher.matches(&req("/index.html")));
        assert!(!matcher.matches(&req("/PREFIX/index.html")));
    }

    #[test]
    fn root_prefix_matches_everything() {
        let matcher = PathPrefixMatcher::new("/");
        assert!(matcher.matches(&req("/")));
        assert!(matcher.matches(&req("/anything/at/all?x=1")));
        assert!(!matcher.is_bare_prefix(&req("/")));
    }

    #[test]
    fn bare_prefix_is_detected() {
        let matcher = PathPrefixMatcher::new("/prefix/");
        assert!(matcher.is_bare_prefix(&req("/prefix")));
        assert!(matcher.is_bare_prefix(&req("/prefix?x=1")));
        assert!(!matcher.is_bare_prefix(&req("/prefix/")));
        assert!(!matcher.is_bare_prefix(&req("/pre")));
    }
}
