//! headerhunter
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  headerhunter                 │
//!   Client Request     │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ───────────────────┼─▶│ server │──▶│  hunter  │──▶│ mode router │──┼──▶ files / upstream
//!                      │  └────────┘   │ (probe)  │   └─────────────┘  │
//!   Client Response    │               │ (capture)│                    │
//!   ◀──────────────────┼───────────────└────┬─────┘                    │
//!                      │                    ▼                          │
//!                      │           one JSON line per request           │
//!                      │           and per response (stdout)           │
//!                      └───────────────────────────────────────────────┘
//! ```

use clap::Parser;

use headerhunter::cli::{Cli, Command};
use headerhunter::lifecycle::startup;
use headerhunter::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Serve(args) => {
            let config = args
                .into_config()
                .inspect_err(|error| tracing::warn!(%error, "fatal error occurred"))?;
            startup::run(config)
                .await
                .inspect_err(|error| tracing::warn!(%error, "fatal error occurred"))?;
        }
    }

    Ok(())
}
