//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for headerhunter.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for a serving process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServeConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Server timeouts.
    pub timeouts: TimeoutConfig,

    /// What to serve and under which prefix.
    pub hunter: HunterConfig,

    /// File to append transaction records to. Stdout when unset.
    pub output: Option<PathBuf>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000" or ":3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Timeout configuration for the serving surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum time to receive a request body, in seconds.
    pub read_secs: u64,

    /// Maximum time to produce a response, in seconds.
    pub write_secs: u64,

    /// Grace period for in-flight transactions on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 600,
            write_secs: 600,
            shutdown_grace_secs: 5,
        }
    }
}

/// Unvalidated serving mode plus URL prefix.
///
/// Exactly one of `static_dir` and `proxy_url` must be set; this is checked
/// by [`ServeMode::from_config`](crate::config::ServeMode::from_config) when
/// a [`Hunter`](crate::Hunter) is built.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HunterConfig {
    /// Local directory to serve files from.
    pub static_dir: Option<PathBuf>,

    /// Origin to forward every transaction to.
    pub proxy_url: Option<String>,

    /// Path prefix requests are dispatched under.
    pub prefix: String,
}

impl HunterConfig {
    /// Serve files from `root`.
    pub fn static_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: Some(root.into()),
            ..Self::default()
        }
    }

    /// Forward to the origin at `url`.
    pub fn proxy(url: impl Into<String>) -> Self {
        Self {
            proxy_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            proxy_url: None,
            prefix: "/".to_string(),
        }
    }
}
