//! Command-line flags for the service binary.
//!
//! Flags override the config file, which overrides built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::PrecompressorConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "html-precompressor")]
#[command(about = "A HTML pre-compressing server for HTML storage", long_about = None)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to run the server on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Original HTML storage server endpoint
    #[arg(short = 'o', long = "original-endpoint")]
    pub original_endpoint: Option<String>,

    /// Path to Zstd dictionary file
    #[arg(short = 'z', long = "zstd-dictionary")]
    pub zstd_dictionary: Option<PathBuf>,

    /// Zstd compression level
    #[arg(short, long)]
    pub level: Option<i32>,
}

impl Cli {
    /// Merge defaults, the optional config file and these flags, then validate.
    pub fn resolve(&self) -> Result<PrecompressorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => PrecompressorConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay flags that were given onto `config`.
    pub fn apply(&self, config: &mut PrecompressorConfig) {
        if let Some(port) = self.port {
            config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("0.0.0.0:{}", port),
            };
        }
        if let Some(endpoint) = &self.original_endpoint {
            config.downstream.endpoint = endpoint.clone();
        }
        if let Some(path) = &self.zstd_dictionary {
            config.dictionary.path = path.clone();
        }
        if let Some(level) = self.level {
            config.dictionary.level = level;
        }
    }
}
