//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for environment variable {variable}")]
    Env {
        variable: &'static str,
        value: String,
    },
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides on top of whatever the file provided.
/// The environment wins: deployments set the secret and bind address
/// without shipping a config file at all.
pub fn apply_env_overrides(config: &mut GatewayConfig) -> Result<(), ConfigError> {
    if let Ok(token) = env::var("API_BEARER_TOKEN") {
        config.auth.token = token;
    }
    if let Ok(host) = env::var("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = parse_env("PORT")? {
        config.listener.port = port;
    }
    if let Some(workers) = parse_env("MAX_THREADS")? {
        config.engine.workers = workers;
    }
    Ok(())
}

fn parse_env<T: FromStr>(variable: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { variable, value }),
        Err(_) => Ok(None),
    }
}
