//! Prefix dispatch to the backing handler.
//!
//! # Responsibilities
//! - Send requests under the prefix to the backend, path unchanged
//! - Redirect the bare prefix (`/prefix`) to its canonical form (`/prefix/`)
//! - Answer everything else with a plain 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit not-found rather than silent default

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::backend::Backend;
use crate::routing::matcher::PathPrefixMatcher;

const NOT_FOUND_BODY: &str = "404 page not found\n";

#[derive(Debug, Clone)]
pub struct ModeRouter {
    matcher: PathPrefixMatcher,
    backend: Backend,
}

impl ModeRouter {
    pub fn new(prefix: &str, backend: Backend) -> Self {
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            backend,
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        if self.matcher.matches(&request) {
            return self.backend.serve(request).await;
        }

        if self.matcher.is_bare_prefix(&request) {
            let location = match request.uri().query() {
                Some(query) => format!("{}?{}", self.prefix(), query),
                None => self.prefix().to_string(),
            };
            if let Ok(location) = HeaderValue::from_str(&location) {
                return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
            }
        }

        tracing::debug!(path = %request.uri().path(), prefix = %self.prefix(), "No route matched");
        (
            StatusCode::NOT_FOUND,
            [(header::X_CONTENT_TYPE_OPTIONS, "nosniff")],
            NOT_FOUND_BODY,
        )
            .into_response()
    }
}
