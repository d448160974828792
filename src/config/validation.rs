//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Check TLS settings are complete
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServeConfig → Result<(), Vec<ValidationError>>
//! - Serving mode is checked separately when the Hunter is built

use thiserror::Error;

use crate::config::schema::ServeConfig;
use crate::net::listener::resolve_bind_address;

/// A single semantic problem in a [`ServeConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

pub fn validate_config(config: &ServeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if resolve_bind_address(&config.listener.bind_address).is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_secs"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("write_secs"));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServeConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServeConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.read_secs = 0;
        config.timeouts.write_secs = 0;
        config.listener.tls = Some(TlsConfig {
            cert_path: "".into(),
            key_path: "key.pem".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("nowhere".into()),
                ValidationError::ZeroTimeout("read_secs"),
                ValidationError::ZeroTimeout("write_secs"),
                ValidationError::EmptyTlsPath("cert_path"),
            ]
        );
    }

    #[test]
    fn port_only_address_is_accepted() {
        let mut config = ServeConfig::default();
        config.listener.bind_address = ":8080".into();
        assert!(validate_config(&config).is_ok());
    }
}
