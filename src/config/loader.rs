//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `identity.msp_id`.
pub const MSP_ID_ENV: &str = "MSP_ID";
/// Environment variable overriding `network.channel_name`.
pub const CHANNEL_NAME_ENV: &str = "CHANNEL_NAME";
/// Environment variable overriding `network.chaincode_name`.
pub const CHAINCODE_NAME_ENV: &str = "CHAINCODE_NAME";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finish(config)
}

/// Built-in defaults with environment overrides applied.
pub fn load_default_config() -> Result<ClientConfig, ConfigError> {
    finish(ClientConfig::default())
}

fn finish(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override MSP ID, channel and chaincode names from the environment.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(msp_id) = lookup(MSP_ID_ENV) {
        config.identity.msp_id = msp_id;
    }
    if let Some(channel_name) = lookup(CHANNEL_NAME_ENV) {
        config.network.channel_name = channel_name;
    }
    if let Some(chaincode_name) = lookup(CHAINCODE_NAME_ENV) {
        config.network.chaincode_name = chaincode_name;
    }
}
