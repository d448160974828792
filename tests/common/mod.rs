//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::Router;
use headerhunter::net::listener;
use headerhunter::{HttpServer, Hunter, HunterConfig, ServeConfig, Shutdown, TransactionLogger};
use serde_json::Value;
use tokio::net::TcpListener;

pub const UPSTREAM_GREETING: &str = "Hello from upstream";

/// In-memory record sink whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.inner.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn static_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata/static")
}

/// Start an upstream that answers every request with a fixed body.
pub async fn start_greeting_upstream() -> SocketAddr {
    let app = Router::new().fallback(|| async { UPSTREAM_GREETING });
    serve_upstream(app).await
}

/// Start an upstream that waits `delay` before answering.
pub async fn start_slow_upstream(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        UPSTREAM_GREETING
    });
    serve_upstream(app).await
}

/// Start an upstream that echoes the request body back and reports what it
/// saw in `x-echo-*` headers.
pub async fn start_echo_upstream() -> SocketAddr {
    async fn echo(uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
        let seen = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        (
            [
                ("x-echo-host", seen("host")),
                ("x-echo-forwarded-for", seen("x-forwarded-for")),
                ("x-echo-uri", uri.to_string()),
            ],
            body,
        )
    }

    serve_upstream(Router::new().fallback(echo)).await
}

async fn serve_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A loopback address nothing is listening on.
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub struct RunningHunter {
    pub addr: SocketAddr,
    pub records: SharedBuffer,
    pub shutdown: Shutdown,
    pub server: tokio::task::JoinHandle<()>,
}

impl RunningHunter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Parsed records once at least `count` have been written.
    pub async fn wait_for_records(&self, count: usize) -> Vec<Value> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let lines = self.records.lines();
            if lines.len() >= count {
                return lines
                    .iter()
                    .map(|line| serde_json::from_str(line).unwrap())
                    .collect();
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} records, got {}: {lines:?}",
                lines.len()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Run a Hunter behind the real server on an ephemeral loopback port.
pub async fn spawn_hunter(hunter_config: HunterConfig) -> RunningHunter {
    let config = ServeConfig {
        hunter: hunter_config,
        ..ServeConfig::default()
    };
    spawn_server(config).await
}

/// Like [`spawn_hunter`] with full control over the server settings. The
/// bind address is always an ephemeral loopback port.
pub async fn spawn_server(mut config: ServeConfig) -> RunningHunter {
    config.listener.bind_address = "127.0.0.1:0".into();
    let records = SharedBuffer::default();
    let hunter = Hunter::new(config.hunter.clone(), TransactionLogger::new(records.clone())).unwrap();

    let listener = listener::bind(&config.listener.bind_address).unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &hunter);
    let receiver = shutdown.subscribe();
    let server = tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    RunningHunter {
        addr,
        records,
        shutdown,
        server,
    }
}

pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
