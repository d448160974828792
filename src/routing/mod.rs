//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (normalized prefix check)
//!     → router.rs (backend, redirect, or not found)
//! ```
//!
//! # Design Decisions
//! - One prefix, one backend per running instance
//! - Matched paths reach the backend unchanged (no prefix stripping)
//! - Deterministic: same input always takes the same branch

pub mod matcher;
pub mod router;

pub use matcher::{normalize_prefix, PathPrefixMatcher};
pub use router::ModeRouter;
