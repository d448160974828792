//! Operational logging.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for
//! transaction records.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the process-wide subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "headerhunter=debug,tower_http=debug"
    } else {
        "headerhunter=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
