//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server, timeouts, graceful shutdown)
//!     → request.rs (measure and restore request body)
//!     → [routing layer picks static files or upstream]
//!     → response.rs (observe status, headers, body bytes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{probe_body, ProbeError};
pub use response::{CaptureBody, HeaderCapture};
pub use server::{HttpServer, ServerError};
