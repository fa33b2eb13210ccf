//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PrecompressorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PrecompressorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("downstream.endpoint '{value}' is invalid: {reason}")]
    Endpoint { value: String, reason: String },

    #[error("downstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("dictionary.path must not be empty")]
    EmptyDictionaryPath,

    #[error("dictionary.level {level} outside supported range {min}..={max}")]
    Level { level: i32, min: i32, max: i32 },
}

pub fn validate_config(config: &PrecompressorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    match config.downstream.endpoint_url() {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::Endpoint {
                value: config.downstream.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::Endpoint {
            value: config.downstream.endpoint.clone(),
            reason: e.to_string(),
        }),
    }
    if config.downstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.dictionary.path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDictionaryPath);
    }
    let range = zstd::compression_level_range();
    if !range.contains(&config.dictionary.level) {
        errors.push(ValidationError::Level {
            level: config.dictionary.level,
            min: *range.start(),
            max: *range.end(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
