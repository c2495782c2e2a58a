//! Gateway configuration.
//!
//! Configuration is read exactly once at startup: an optional TOML file,
//! then environment overrides, then validation. Later changes to either
//! source are ignored for the life of the process.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    AuthConfig, EngineConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
