use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::finalize::FinalizeConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "cname-finalizer.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/cname-finalizer/config.toml";

/// Main configuration structure for cname-finalizer
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener addresses and the metric label
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolvers used for forwarding and for chasing alias targets
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Alias flattening behaviour
    #[serde(default)]
    pub finalize: FinalizeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. cname-finalizer.toml in current directory
    /// 3. /etc/cname-finalizer/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(port) = overrides.metrics_port {
            self.server.metrics_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(name) = overrides.server_name {
            self.server.name = Some(name);
        }
        if !overrides.upstream_servers.is_empty() {
            self.upstream.servers = overrides.upstream_servers;
        }
        if let Some(max_lookup) = overrides.max_lookup {
            self.finalize.max_lookup = max_lookup;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration. Runs once at startup; nothing here is re-checked per request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.upstream.servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        if self.upstream.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.upstream.protocols().map_err(ConfigError::Validation)?;
        self.finalize.validate()
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub bind_address: Option<String>,
    pub server_name: Option<String>,
    pub upstream_servers: Vec<String>,
    pub max_lookup: Option<i64>,
    pub log_level: Option<String>,
}
