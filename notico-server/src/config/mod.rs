//! Configuration module for notico.
//!
//! Handles loading configuration from an optional TOML file, then overlaying
//! CLI arguments and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use notico_core::config::{DEFAULT_NOTIFY_CHANNEL, ServerConfig, SharedConfig, SlackConfig};
use notico_sdk::client::DEFAULT_API_BASE;
use notico_sdk::signature::SigningSecret;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Config file used when `--config` is not given. It may be absent.
pub const DEFAULT_CONFIG_PATH: &str = "./notico.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("SLACK_TOKEN is not set")]
    MissingToken,

    #[error("SLACK_SIGNING_SECRET is not set")]
    MissingSigningSecret,

    #[error("invalid api_base: {0}")]
    InvalidApiBase(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values supplied on the command line or through the environment.
///
/// Each one, when present, replaces the matching file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub signing_secret: Option<String>,
    pub channel: Option<String>,
    pub domain: Option<String>,
    pub listen: Option<SocketAddr>,
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub slack: SlackConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.slack)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    /// Whether a missing file is an error (an explicit `--config`).
    file_required: bool,
    overrides: Overrides,
    /// The webhook server cannot run without a signing secret.
    require_signing_secret: bool,
}

impl ConfigLoader {
    /// Create a new config loader.
    ///
    /// With `config_path = None` the default path is tried and silently
    /// skipped if it does not exist.
    pub fn new(
        config_path: Option<&Path>,
        overrides: Overrides,
        require_signing_secret: bool,
    ) -> Self {
        Self {
            config_path: config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            file_required: config_path.is_some(),
            overrides,
            require_signing_secret,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (if present)
    /// 2. Apply CLI / environment overrides
    /// 3. Validate and build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = self.read_file()?;
        self.build(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.file_required => {
                tracing::debug!(path = ?self.config_path, "No config file, using defaults");
                Ok(FileConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn build(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let FileConfig { server, slack } = file_config;
        let overrides = self.overrides.clone();

        let token = non_empty(overrides.token.or(slack.token)).ok_or(ConfigError::MissingToken)?;

        let signing_secret = non_empty(overrides.signing_secret.or(slack.signing_secret));
        if self.require_signing_secret && signing_secret.is_none() {
            return Err(ConfigError::MissingSigningSecret);
        }

        let notify_channel = non_empty(overrides.channel.or(slack.channel))
            .unwrap_or_else(|| DEFAULT_NOTIFY_CHANNEL.to_string());

        let api_base = Url::parse(
            slack
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE),
        )?;

        if server.publish_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "publish_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: overrides.listen.unwrap_or(server.listen),
                publish_timeout: Duration::from_secs(server.publish_timeout_secs),
            },
            slack: SlackConfig {
                token,
                signing_secret: signing_secret.map(SigningSecret::new),
                notify_channel,
                team_domain: non_empty(overrides.domain.or(slack.domain)),
                api_base,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
