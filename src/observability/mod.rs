//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every transaction produces:
//!     → transaction.rs (one JSON record per request and per response)
//!
//! Everything else produces:
//!     → logging.rs (tracing events on stderr)
//! ```
//!
//! # Design Decisions
//! - Transaction records and diagnostics never share a stream
//! - The record sink is passed explicitly, never global
//! - A failed record write is a warning, never a failed transaction

pub mod logging;
pub mod transaction;

pub use transaction::{HeaderMultiMap, LogError, RequestRecord, ResponseRecord, TransactionLogger};

#[cfg(test)]
pub(crate) use transaction::SharedBuffer;
