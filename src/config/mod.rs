//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags ──────────────┐
//! config file (TOML)      │
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServeConfig (validated, immutable)
//!
//! Hunter construction:
//!     HunterConfig
//!     → mode.rs (exactly one of static_dir / proxy_url)
//!     → ServeMode::{StaticDir, Proxy}
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod error;
pub mod loader;
pub mod mode;
pub mod schema;
pub mod validation;

pub use error::ConfigError;
pub use mode::ServeMode;
pub use schema::HunterConfig;
pub use schema::ListenerConfig;
pub use schema::ServeConfig;
pub use schema::TimeoutConfig;
pub use schema::TlsConfig;
