use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{LoggingConfig, ResolverConfig, ServerConfig};
use crate::errors::DomainError;

/// Root configuration, loaded from a TOML file with CLI overrides on top.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line overrides applied after the file is parsed.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub web_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, DomainError> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(Path::new(path))
                    .map_err(|e| DomainError::Io(format!("cannot read {}: {}", path, e)))?;
                toml::from_str(&contents)
                    .map_err(|e| DomainError::InvalidConfig(format!("{}: {}", path, e)))?
            }
            None => Config::default(),
        };

        if let Some(port) = overrides.dns_port {
            config.server.dns_port = port;
        }
        if let Some(port) = overrides.web_port {
            config.server.web_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            config.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.resolver.validate()
    }
}
