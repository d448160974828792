//! Transaction records and the sink they are appended to.
//!
//! # Record Format
//! One JSON object per line:
//! ```text
//! {"type":"request","time":..,"headers":{..},"remote_addr":..,"method":..,"url":..,"size":..}
//! {"type":"response","time":..,"status_code":..,"headers":{..},"method":..,"url":..,"size":..}
//! ```
//!
//! Header names are canonicalized (`content-type` → `Content-Type`) and
//! values are always arrays.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::{HeaderMap, Method, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Canonical header name → every value in arrival order.
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write record: {0}")]
    Write(#[from] io::Error),
}

/// Observation of an inbound request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub time: DateTime<Utc>,
    pub headers: HeaderMultiMap,
    pub remote_addr: String,
    pub method: String,
    pub url: String,
    pub size: u64,
}

impl RequestRecord {
    pub fn new(
        headers: &HeaderMap,
        remote_addr: String,
        method: &Method,
        url: String,
        size: u64,
    ) -> Self {
        Self {
            kind: "request",
            time: Utc::now(),
            headers: header_multimap(headers),
            remote_addr,
            method: method.to_string(),
            url,
            size,
        }
    }
}

/// Observation of an outbound response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub time: DateTime<Utc>,
    pub status_code: u16,
    pub headers: HeaderMultiMap,
    pub method: String,
    pub url: String,
    pub size: u64,
}

impl ResponseRecord {
    pub fn new(
        status: StatusCode,
        headers: HeaderMultiMap,
        method: &Method,
        url: String,
        size: u64,
    ) -> Self {
        Self {
            kind: "response",
            time: Utc::now(),
            status_code: status.as_u16(),
            headers,
            method: method.to_string(),
            url,
            size,
        }
    }
}

/// Canonical MIME-style capitalization: first letter and every letter after
/// a hyphen upper case, the rest lower case.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Copy `headers` into an owned multimap.
pub fn header_multimap(headers: &HeaderMap) -> HeaderMultiMap {
    let mut map = HeaderMultiMap::new();
    for (name, value) in headers {
        map.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

/// Appends one JSON line per record to a shared sink.
///
/// Cloning is cheap; all clones write to the same sink and each record is
/// written and flushed under a single lock acquisition.
#[derive(Clone)]
pub struct TransactionLogger {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl TransactionLogger {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Open `path` for appending, creating it if needed.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }

    pub fn log<T: Serialize>(&self, record: &T) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut sink = lock(&*self.sink);
        sink.write_all(&line)?;
        sink.flush()?;
        Ok(())
    }
}

impl Default for TransactionLogger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for TransactionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLogger").finish_non_exhaustive()
    }
}

/// In-memory sink whose clones share one buffer.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&*self.inner)).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&*self.inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// A panic mid-write can only leave a partial line behind; keep logging.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
