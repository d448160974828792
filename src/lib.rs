//! headerhunter: serve a directory or proxy an origin, logging every request
//! and response as one JSON line.

pub mod backend;
pub mod cli;
pub mod config;
pub mod http;
pub mod hunter;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{HunterConfig, ServeConfig};
pub use http::HttpServer;
pub use hunter::Hunter;
pub use lifecycle::Shutdown;
pub use observability::TransactionLogger;
