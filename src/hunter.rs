//! The externally visible request handler.
//!
//! # Transaction Flow
//! ```text
//! request
//!     → probe_body (measure, restore)        → request record
//!     → ModeRouter (static files | upstream)
//!     → HeaderCapture + CaptureBody          → response record at body end
//! response
//! ```
//!
//! Nothing is retained between transactions. Record failures are warnings;
//! the client always gets the backend's response. A backend that outlives the
//! write timeout is answered with a 504 (proxy) or 503 (static), and that
//! response is logged like any other.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::backend::Backend;
use crate::config::{ConfigError, HunterConfig, ServeMode};
use crate::http::request::probe_body;
use crate::http::response::{CaptureBody, HeaderCapture};
use crate::observability::transaction::{RequestRecord, ResponseRecord, TransactionLogger};
use crate::routing::ModeRouter;

/// Logs every request and response while serving a directory or proxying
/// an origin.
///
/// ```no_run
/// use headerhunter::{Hunter, HunterConfig, TransactionLogger};
///
/// let hunter = Hunter::new(
///     HunterConfig::proxy("http://127.0.0.1:8081").with_prefix("/api"),
///     TransactionLogger::stdout(),
/// )?;
/// let app = hunter.router();
/// # Ok::<(), headerhunter::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Hunter {
    inner: Arc<Inner>,
    write_timeout: Option<Duration>,
}

#[derive(Debug)]
struct Inner {
    router: ModeRouter,
    logger: TransactionLogger,
}

impl Hunter {
    /// Validate `config` and resolve its backend. Fails without side effects
    /// on missing, ambiguous or unusable modes.
    pub fn new(config: HunterConfig, logger: TransactionLogger) -> Result<Self, ConfigError> {
        let mode = ServeMode::from_config(&config)?;
        let backend = Backend::from_mode(mode)?;
        let router = ModeRouter::new(&config.prefix, backend);

        tracing::debug!(
            backend = %router.backend().describe(),
            prefix = %router.prefix(),
            "Hunter configured"
        );

        Ok(Self {
            inner: Arc::new(Inner { router, logger }),
            write_timeout: None,
        })
    }

    /// Bound how long the backend may take to produce a response head.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn prefix(&self) -> &str {
        self.inner.router.prefix()
    }

    pub fn backend(&self) -> &Backend {
        self.inner.router.backend()
    }

    /// An axum router that sends every request through [`Hunter::handle`].
    pub fn router(&self) -> Router {
        Router::new().fallback(hunt).with_state(self.clone())
    }

    /// Run one transaction.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();

        let (request, size) = probe_body(request).await;
        match size {
            Ok(size) => {
                let record = RequestRecord::new(request.headers(), remote_addr, &method, url.clone(), size);
                if let Err(e) = self.inner.logger.log(&record) {
                    tracing::warn!(error = %e, "error logging request");
                }
            }
            Err(e) => tracing::warn!(error = %e, "error logging request"),
        }

        let response = self.dispatch(request).await;

        let capture = HeaderCapture::observe(&response);
        let logger = self.inner.logger.clone();
        let (parts, body) = response.into_parts();
        let body = CaptureBody::new(body, move |size| {
            let record = ResponseRecord::new(capture.status, capture.headers, &method, url, size);
            if let Err(e) = logger.log(&record) {
                tracing::warn!(error = %e, "error logging response");
            }
        });

        Response::from_parts(parts, Body::new(body))
    }

    async fn dispatch(&self, request: Request<Body>) -> Response {
        let dispatch = self.inner.router.dispatch(request);
        let Some(limit) = self.write_timeout else {
            return dispatch.await;
        };

        match tokio::time::timeout(limit, dispatch).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(timeout_secs = limit.as_secs_f64(), "Backend timed out");
                let status = match self.backend() {
                    Backend::Proxy(_) => StatusCode::GATEWAY_TIMEOUT,
                    Backend::Static(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                status.into_response()
            }
        }
    }
}

async fn hunt(State(hunter): State<Hunter>, request: Request<Body>) -> Response {
    hunter.handle(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::SharedBuffer;
    use serde_json::Value;
    use tower::ServiceExt;

    fn static_hunter(prefix: &str) -> (tempfile::TempDir, SharedBuffer, Hunter) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "Hello fellow Hunter!\n").unwrap();
        let buffer = SharedBuffer::new();
        let hunter = Hunter::new(
            HunterConfig::static_dir(dir.path()).with_prefix(prefix),
            TransactionLogger::new(buffer.clone()),
        )
        .unwrap();
        (dir, buffer, hunter)
    }

    fn records(buffer: &SharedBuffer) -> Vec<Value> {
        buffer
            .lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn construction_errors_surface() {
        let err = Hunter::new(HunterConfig::default(), TransactionLogger::new(SharedBuffer::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingMode));

        let config = HunterConfig {
            static_dir: Some("foo".into()),
            proxy_url: Some("bar".into()),
            ..HunterConfig::default()
        };
        let err = Hunter::new(config, TransactionLogger::new(SharedBuffer::new())).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousMode));
    }

    #[test]
    fn prefix_is_normalized() {
        let (_dir, _buffer, hunter) = static_hunter("prefix/");
        assert_eq!(hunter.prefix(), "/prefix/");
        assert!(matches!(hunter.backend(), Backend::Static(_)));
    }

    #[tokio::test]
    async fn logs_request_and_response() {
        let (_dir, buffer, hunter) = static_hunter("/");

        let request = Request::builder()
            .method("GET")
            .uri("/index.html")
            .header("foo", "bar")
            .header("user-agent", "test")
            .body(Body::empty())
            .unwrap();
        let response = hunter.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Hello fellow Hunter!\n");

        let records = records(&buffer);
        assert_eq!(records.len(), 2);

        let request = &records[0];
        assert_eq!(request["type"], "request");
        assert_eq!(request["headers"]["Foo"], serde_json::json!(["bar"]));
        assert_eq!(request["headers"]["User-Agent"], serde_json::json!(["test"]));
        assert_eq!(request["method"], "GET");
        assert_eq!(request["url"], "/index.html");
        assert_eq!(request["remote_addr"], "");
        assert_eq!(request["size"], 0);

        let response = &records[1];
        assert_eq!(response["type"], "response");
        assert_eq!(response["status_code"], 200);
        assert_eq!(response["url"], "/index.html");
        assert_eq!(response["size"], 21);
        assert!(response["headers"]["Content-Type"][0]
            .as_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[tokio::test]
    async fn request_outside_prefix_is_still_logged() {
        let (_dir, buffer, hunter) = static_hunter("/prefix");

        let request = Request::builder().uri("/index.html").body(Body::empty()).unwrap();
        let response = hunter.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        drop(response);

        let records = records(&buffer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["status_code"], 404);
    }

    #[tokio::test]
    async fn request_body_size_is_logged() {
        let (_dir, buffer, hunter) = static_hunter("/");

        let request = Request::builder()
            .method("POST")
            .uri("/index.html")
            .body(Body::from("hi"))
            .unwrap();
        let response = hunter.router().oneshot(request).await.unwrap();
        drop(response);

        let records = records(&buffer);
        assert_eq!(records[0]["method"], "POST");
        assert_eq!(records[0]["size"], 2);
    }

    #[tokio::test]
    async fn url_is_path_and_query_for_absolute_targets() {
        let (_dir, buffer, hunter) = static_hunter("/");

        let request = Request::builder()
            .uri("http://example.com/index.html?x=1")
            .body(Body::empty())
            .unwrap();
        let response = hunter.router().oneshot(request).await.unwrap();
        drop(response);

        let records = records(&buffer);
        assert_eq!(records[0]["url"], "/index.html?x=1");
        assert_eq!(records[1]["url"], "/index.html?x=1");
    }

    #[tokio::test]
    async fn directory_without_index_is_listed_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/a.txt"), "a").unwrap();
        let buffer = SharedBuffer::new();
        let hunter = Hunter::new(
            HunterConfig::static_dir(dir.path()),
            TransactionLogger::new(buffer.clone()),
        )
        .unwrap();

        let request = Request::builder().uri("/docs/").body(Body::empty()).unwrap();
        let response = hunter.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let listing = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(listing.contains("<a href=\"a.txt\">a.txt</a>"));

        let records = records(&buffer);
        assert_eq!(records[1]["status_code"], 200);
        assert_eq!(records[1]["size"], bytes.len());
    }

    #[test]
    fn write_timeout_is_opt_in() {
        let (_dir, _buffer, hunter) = static_hunter("/");
        assert!(hunter.write_timeout.is_none());
        let hunter = hunter.with_write_timeout(Duration::from_secs(3));
        assert_eq!(hunter.write_timeout, Some(Duration::from_secs(3)));
    }
}
