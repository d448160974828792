//! TLS configuration and certificate loading.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load a rustls server config from PEM certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    require_file(cert_path, "Certificate")?;
    require_file(key_path, "Private key")?;
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

fn require_file(path: &Path, what: &str) -> io::Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{what} file not found: {}", path.display()),
    ))
}
