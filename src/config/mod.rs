//! Configuration management subsystem.

pub mod loader;
pub mod schema;

pub use loader::{load_config, upstream_url, validate_config, ConfigError};
pub use schema::{
    AdapterConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig, UpstreamConfig,
};
