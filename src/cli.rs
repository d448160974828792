//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::loader::load_config;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServeConfig, TlsConfig};

#[derive(Debug, Parser)]
#[command(name = "headerhunter")]
#[command(about = "Server to inspect http headers", version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect headers and serve up a static directory or proxy a URL
    #[command(after_help = "Examples:\n  $ headerhunter serve /srv/public\n  $ headerhunter serve https://www.example.com")]
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Directory to serve, or URL (starting with "http") to proxy
    #[arg(value_name = "DIR|URL")]
    pub target: String,

    /// Address to listen on [default: :3000]
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Prefix to route requests to [default: /]
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Read timeout for the server, in seconds [default: 600]
    #[arg(long, value_name = "SECS")]
    pub read_timeout: Option<u64>,

    /// Write timeout for the server, in seconds [default: 600]
    #[arg(long, value_name = "SECS")]
    pub write_timeout: Option<u64>,

    /// TLS certificate (PEM)
    #[arg(short, long, requires = "key")]
    pub cert: Option<PathBuf>,

    /// TLS private key (PEM)
    #[arg(short, long, requires = "cert")]
    pub key: Option<PathBuf>,

    /// Append records to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    /// Merge flags over the config file (or defaults) and validate.
    pub fn into_config(self) -> Result<ServeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServeConfig::default(),
        };

        if self.target.starts_with("http") {
            config.hunter.proxy_url = Some(self.target);
            config.hunter.static_dir = None;
        } else {
            config.hunter.static_dir = Some(PathBuf::from(self.target));
            config.hunter.proxy_url = None;
        }

        if let Some(prefix) = self.prefix {
            config.hunter.prefix = prefix;
        }
        if let Some(addr) = self.addr {
            config.listener.bind_address = addr;
        }
        if let Some(secs) = self.read_timeout {
            config.timeouts.read_secs = secs;
        }
        if let Some(secs) = self.write_timeout {
            config.timeouts.write_secs = secs;
        }
        if let (Some(cert_path), Some(key_path)) = (self.cert, self.key) {
            config.listener.tls = Some(TlsConfig { cert_path, key_path });
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
