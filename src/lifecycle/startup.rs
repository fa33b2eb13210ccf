//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration from defaults, file and flags
//! - Load the compression dictionary before anything else is built
//! - Build the shared downstream relay
//! - Bind the listener last (traffic only when ready)

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::compression::{Dictionary, DictionaryError};
use crate::config::{Cli, ConfigError, DictionaryConfig, DownstreamConfig, ListenerConfig, PrecompressorConfig};
use crate::relay::{DownstreamRelay, RelayError};

/// Any error that prevents the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load compression dictionary from {}: {source}", .path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: DictionaryError,
    },

    #[error("invalid downstream endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Resolve and validate the service configuration.
pub fn resolve_config(cli: &Cli) -> Result<PrecompressorConfig, StartupError> {
    Ok(cli.resolve()?)
}

/// Load the process-wide dictionary. Called once, before the listener binds.
pub fn load_dictionary(config: &DictionaryConfig) -> Result<Arc<Dictionary>, StartupError> {
    let dictionary = Dictionary::from_file(&config.path, config.level).map_err(|source| {
        StartupError::Dictionary {
            path: config.path.clone(),
            source,
        }
    })?;

    tracing::info!(
        path = %config.path.display(),
        size = dictionary.size(),
        level = dictionary.level(),
        dict_id = ?dictionary.id(),
        "Compression dictionary loaded"
    );
    Ok(Arc::new(dictionary))
}

/// Build the shared relay from downstream settings.
pub fn build_relay(config: &DownstreamConfig) -> Result<DownstreamRelay, StartupError> {
    let endpoint = config.endpoint_url()?;
    let relay = DownstreamRelay::new(endpoint, Duration::from_secs(config.timeout_secs))?;
    tracing::info!(
        endpoint = %relay.endpoint(),
        timeout_secs = config.timeout_secs,
        "Downstream relay ready"
    );
    Ok(relay)
}

/// Bind the TCP listener.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&config.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.bind_address.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_is_startup_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/precompressor.toml")),
            ..Cli::default()
        };
        let err = resolve_config(&cli).unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_flags_are_startup_error() {
        let cli = Cli {
            level: Some(1000),
            ..Cli::default()
        };
        assert!(matches!(
            resolve_config(&cli),
            Err(StartupError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_missing_dictionary_is_fatal() {
        let config = DictionaryConfig {
            path: PathBuf::from("/nonexistent/zstd_dict"),
            level: 9,
        };
        let err = load_dictionary(&config).unwrap_err();
        assert!(matches!(err, StartupError::Dictionary { source: DictionaryError::Io(_), .. }));
        assert!(err.to_string().contains("/nonexistent/zstd_dict"));
    }

    #[test]
    fn test_empty_dictionary_file_is_fatal() {
        let path = std::env::temp_dir().join(format!("html-precompressor-empty-dict-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let config = DictionaryConfig { path: path.clone(), level: 9 };
        let err = load_dictionary(&config).unwrap_err();
        assert!(matches!(err, StartupError::Dictionary { source: DictionaryError::Empty, .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_build_relay_rejects_bad_endpoint() {
        let config = DownstreamConfig {
            endpoint: "::not a url::".into(),
            timeout_secs: 120,
        };
        assert!(matches!(build_relay(&config), Err(StartupError::Endpoint(_))));
    }

    #[test]
    fn test_build_relay_targets_configured_endpoint() {
        let config = DownstreamConfig {
            endpoint: "http://storage:9000/v1".into(),
            timeout_secs: 30,
        };
        let relay = build_relay(&config).unwrap();
        assert_eq!(relay.endpoint().as_str(), "http://storage:9000/v1");
    }
}
