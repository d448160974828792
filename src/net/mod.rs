//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured bind address
//!     → listener.rs (resolve, bind)
//!     → tls.rs (optional certificate/key loading)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;
