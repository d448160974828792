//! Serving mode resolution.
//!
//! A [`HunterConfig`] carries two optional fields; a running instance needs
//! exactly one. [`ServeMode`] is the validated form and the only thing the
//! backend layer ever sees.

use std::path::PathBuf;

use url::Url;

use crate::config::error::ConfigError;
use crate::config::schema::HunterConfig;

/// Where transactions are satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeMode {
    /// Serve files relative to a local root.
    StaticDir(PathBuf),
    /// Forward to a single upstream origin.
    Proxy(Url),
}

impl ServeMode {
    /// Validate the mode fields of `config`.
    pub fn from_config(config: &HunterConfig) -> Result<Self, ConfigError> {
        let static_dir = config
            .static_dir
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty());
        let proxy_url = config.proxy_url.as_deref().filter(|u| !u.is_empty());

        match (static_dir, proxy_url) {
            (None, None) => Err(ConfigError::MissingMode),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousMode),
            (Some(root), None) => Ok(ServeMode::StaticDir(root.clone())),
            (None, Some(raw)) => parse_proxy_url(raw).map(ServeMode::Proxy),
        }
    }
}

fn parse_proxy_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidProxyUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidProxyUrl {
            url: raw.to_string(),
            source: url::ParseError::EmptyHost,
        });
    }
    Ok(url)
}
