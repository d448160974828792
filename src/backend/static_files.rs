//! Static file serving from a local root.
//!
//! Files and `index.html` resolution come from tower-http's `ServeDir`. A
//! directory requested with a trailing `/` and no `index.html` is answered
//! with an HTML listing of its entries.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::ConfigError;

const INDEX_FILE: &str = "index.html";

/// Characters escaped in listing links, matching URL path encoding.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Serves files under `root`: `index.html` or a listing for directories, 404
/// for missing paths, nothing outside the root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    service: ServeDir,
}

impl StaticFiles {
    pub fn new(root: PathBuf) -> Result<Self, ConfigError> {
        let metadata = std::fs::metadata(&root).map_err(|source| ConfigError::InvalidStaticDir {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ConfigError::InvalidStaticDir {
                path: root,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let service = ServeDir::new(&root);
        Ok(Self { root, service })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        let method = request.method();
        if *method == Method::GET || *method == Method::HEAD {
            if let Some(dir) = self.unindexed_dir(request.uri().path()).await {
                return listing_response(&dir, *method == Method::HEAD).await;
            }
        }

        let response = match self.service.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        response.map(Body::new)
    }

    /// The directory a `/`-terminated path names, if it has no index file.
    async fn unindexed_dir(&self, path: &str) -> Option<PathBuf> {
        if !path.ends_with('/') {
            return None;
        }
        let dir = self.resolve(path)?;
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir || tokio::fs::metadata(dir.join(INDEX_FILE)).await.is_ok() {
            return None;
        }
        Some(dir)
    }

    /// Map a request path onto the root. `None` for anything that would
    /// leave it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        let mut resolved = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => resolved.push(s),
            }
        }
        Some(resolved)
    }
}

async fn listing_response(dir: &Path, head: bool) -> Response {
    match render_listing(dir).await {
        Ok(listing) => {
            let body = if head { Body::empty() } else { Body::from(listing) };
            (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory\n").into_response()
        }
    }
}

/// One link per entry, sorted by name, directories suffixed with `/`.
async fn render_listing(dir: &Path) -> io::Result<String> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut items: Vec<(String, bool)> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        items.push((name, entry.file_type().await?.is_dir()));
    }
    items.sort();

    let mut body = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for (mut name, is_dir) in items {
        if is_dir {
            name.push('/');
        }
        let href = utf8_percent_encode(&name, LINK).to_string();
        let _ = writeln!(
            body,
            "<a href=\"{}\">{}</a>",
            html_escape::encode_quoted_attribute(&href),
            html_escape::encode_quoted_attribute(&name),
        );
    }
    body.push_str("</pre>\n");
    Ok(body)
}
