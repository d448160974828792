//! TCP listener setup.
//!
//! # Responsibilities
//! - Resolve the configured bind address (":3000" binds every interface)
//! - Bind a listener ready to be handed to the HTTP server

use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Address did not resolve.
    Resolve(std::io::Error),
    /// Failed to bind to address.
    Bind(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Resolve(e) => write!(f, "Failed to resolve address: {}", e),
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Turn a configured bind address into a socket address.
///
/// A bare `:port` means every IPv4 interface.
pub fn resolve_bind_address(address: &str) -> Result<SocketAddr, std::io::Error> {
    let address = match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => address.to_string(),
    };

    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    address.to_socket_addrs()?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("no addresses found for {address:?}"),
        )
    })
}

/// Bind a non-blocking listener on `address`.
pub fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let addr = resolve_bind_address(address).map_err(ListenerError::Resolve)?;
    let listener = TcpListener::bind(addr).map_err(ListenerError::Bind)?;
    listener.set_nonblocking(true).map_err(ListenerError::Bind)?;

    tracing::debug!(address = %addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_only_binds_all_interfaces() {
        let addr = resolve_bind_address(":3000").unwrap();
        assert_eq!(addr, "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn explicit_address_is_kept() {
        let addr = resolve_bind_address("127.0.0.1:8080").unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(resolve_bind_address("nowhere").is_err());
    }

    #[test]
    fn binds_ephemeral_port() {
        let listener = bind("127.0.0.1:0").unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
