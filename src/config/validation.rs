//! Configuration validation.
//!
//! Semantic checks on the merged configuration (serde handles the
//! syntactic ones). Pure function, runs once before the config is
//! accepted into the system; reports every problem, not just the first.

use thiserror::Error;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("auth.token is empty; set API_BEARER_TOKEN or [auth] token")]
    MissingToken,

    #[error("listener.port must not be 0")]
    InvalidPort,

    #[error("engine.command is empty")]
    MissingEngineCommand,

    #[error("engine.call_timeout_secs must be greater than 0")]
    InvalidCallTimeout,

    #[error("timeouts.request_secs must be greater than 0")]
    InvalidRequestTimeout,
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if config.engine.command.is_empty() {
        errors.push(ValidationError::MissingEngineCommand);
    }
    if config.engine.call_timeout_secs == 0 {
        errors.push(ValidationError::InvalidCallTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::InvalidRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
