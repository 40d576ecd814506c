//! Configuration loading from disk.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::AdapterConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid upstream url `{url}`: {source}")]
    UpstreamUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("upstream url `{0}` must use http or https")]
    UpstreamScheme(String),

    #[error("invalid bind address `{0}`")]
    BindAddress(String),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AdapterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AdapterConfig = toml::from_str(&content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Semantic validation; serde handles the syntactic part.
pub fn validate_config(config: &AdapterConfig) -> Result<(), ConfigError> {
    upstream_url(config)?;
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    Ok(())
}

/// Parse the configured upstream base URL.
pub fn upstream_url(config: &AdapterConfig) -> Result<Url, ConfigError> {
    let url = Url::parse(&config.upstream.url).map_err(|source| ConfigError::UpstreamUrl {
        url: config.upstream.url.clone(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UpstreamScheme(config.upstream.url.clone()));
    }
    Ok(url)
}
