//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors that prevent a [`Hunter`](crate::Hunter) or a serving process from
/// being constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("must set a serving mode: staticDir or proxyURL")]
    MissingMode,

    #[error("ambiguous serving mode: only set either staticDir or proxyURL")]
    AmbiguousMode,

    #[error("invalid proxy URL {url:?}: {source}")]
    InvalidProxyUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported proxy URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("static directory {path:?} is not usable: {source}")]
    InvalidStaticDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
