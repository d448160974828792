//! Forwarding to a single upstream origin.
//!
//! # Responsibilities
//! - Re-target the request at the origin (scheme, authority, joined path,
//!   merged query)
//! - Rewrite `Host`, strip hop-by-hop headers (keeping `TE: trailers`),
//!   append `X-Forwarded-For`
//! - Relay the origin's status, headers and body untouched otherwise
//!
//! # Design Decisions
//! - Bodies stream through in both directions
//! - Upstream failures become a bare 502; the client always gets a response

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri, Version};
use axum::response::{IntoResponse, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers that describe a single connection and must not be relayed.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("could not build upstream URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),

    #[error("invalid Host header value: {0}")]
    Host(#[from] axum::http::header::InvalidHeaderValue),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

#[derive(Debug, Clone)]
pub struct Forwarder {
    target: Url,
    client: UpstreamClient,
}

impl Forwarder {
    pub fn new(target: Url) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new()).build(https);
        Self { target, client }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(target_url = %self.target, error = %e, "Upstream error");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let request = self.upstream_request(request)?;
        let mut response = self.client.request(request).await?;
        strip_hop_by_hop(response.headers_mut());
        Ok(response.map(Body::new))
    }

    fn upstream_request(&self, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let (mut parts, body) = request.into_parts();
        parts.uri = self.upstream_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;

        let wants_trailers = accepts_trailers(&parts.headers);
        strip_hop_by_hop(&mut parts.headers);
        if wants_trailers {
            parts.headers.insert(header::TE, HeaderValue::from_static("trailers"));
        }
        parts
            .headers
            .insert(header::HOST, HeaderValue::from_str(&host_header(&self.target))?);
        if let Some(addr) = client_addr {
            append_forwarded_for(&mut parts.headers, addr);
        }

        Ok(Request::from_parts(parts, body))
    }

    fn upstream_uri(&self, uri: &Uri) -> Result<Uri, ForwardError> {
        let origin = &self.target[..url::Position::BeforePath];
        let path = join_paths(self.target.path(), uri.path());
        let query = match (self.target.query().filter(|q| !q.is_empty()), uri.query()) {
            (Some(base), Some(extra)) if !extra.is_empty() => format!("?{base}&{extra}"),
            (Some(base), _) => format!("?{base}"),
            (None, Some(extra)) => format!("?{extra}"),
            (None, None) => String::new(),
        };
        Ok(format!("{origin}{path}{query}").parse()?)
    }
}

/// Join two URL paths with exactly one `/` between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

fn host_header(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// True when any `TE` value lists the `trailers` token.
fn accepts_trailers(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::TE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("trailers"))
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let client_ip = addr.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let value = if prior.is_empty() {
        client_ip
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
