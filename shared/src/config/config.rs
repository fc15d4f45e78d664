use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.web_dir.is_empty() {
        return Err(ConfigError::InvalidConfig("web_dir cannot be empty".into()));
    }

    if config.auth.token_ttl_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "token_ttl_secs must be greater than 0".into(),
        ));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    // An absent signing secret is legal: the gate reports misconfiguration
    // per path class at request time. A secret that IS set but too short to
    // sign safely is rejected here.
    if let Some(secret) = config.auth.resolved_jwt_secret() {
        if secret.len() < 32 {
            return Err(ConfigError::InvalidConfig(
                "jwt_secret must be at least 32 characters long".into(),
            ));
        }
    }

    Ok(())
}
