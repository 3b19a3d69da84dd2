//! Run configuration: a TOML file with environment overrides on top.

use std::env;
use std::path::{Path, PathBuf};

use feedshift_transfer::{FtpConfig, PublishTarget};
use serde::Deserialize;
use thiserror::Error;

use crate::transform::VatPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "feedshift.toml";

pub const ENV_SOURCE_URL: &str = "FEEDSHIFT_SOURCE_URL";
pub const ENV_FTP_HOST: &str = "FEEDSHIFT_FTP_HOST";
pub const ENV_FTP_PORT: &str = "FEEDSHIFT_FTP_PORT";
pub const ENV_FTP_USER: &str = "FEEDSHIFT_FTP_USER";
pub const ENV_FTP_PASSWORD: &str = "FEEDSHIFT_FTP_PASSWORD";
pub const ENV_FTP_DIR: &str = "FEEDSHIFT_FTP_DIR";
pub const ENV_FTP_FILENAME: &str = "FEEDSHIFT_FTP_FILENAME";
pub const ENV_INVALID_VAT: &str = "FEEDSHIFT_INVALID_VAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting `{key}` (set it in the config file or via {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DestinationSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub directory: String,
    pub filename: String,
    pub timeout_secs: Option<u64>,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: String::new(),
            password: String::new(),
            directory: String::new(),
            filename: String::new(),
            timeout_secs: None,
        }
    }
}

impl DestinationSettings {
    pub fn ftp_config(&self) -> FtpConfig {
        FtpConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn publish_target(&self) -> PublishTarget {
        PublishTarget {
            directory: self.directory.clone(),
            filename: self.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    pub invalid_vat: VatPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub destination: DestinationSettings,
    pub transform: TransformSettings,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` (or `feedshift.toml` when present) and applies the
    /// `FEEDSHIFT_*` environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(url) = lookup(ENV_SOURCE_URL) {
            self.source.url = url;
        }
        if let Some(host) = lookup(ENV_FTP_HOST) {
            self.destination.host = host;
        }
        if let Some(port) = lookup(ENV_FTP_PORT) {
            self.destination.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "destination.port",
                message: format!("'{port}' is not a valid port"),
            })?;
        }
        if let Some(user) = lookup(ENV_FTP_USER) {
            self.destination.username = user;
        }
        if let Some(password) = lookup(ENV_FTP_PASSWORD) {
            self.destination.password = password;
        }
        if let Some(directory) = lookup(ENV_FTP_DIR) {
            self.destination.directory = directory;
        }
        if let Some(filename) = lookup(ENV_FTP_FILENAME) {
            self.destination.filename = filename;
        }
        if let Some(policy) = lookup(ENV_INVALID_VAT) {
            self.transform.invalid_vat = policy.parse().map_err(|message| ConfigError::Invalid {
                key: "transform.invalid_vat",
                message,
            })?;
        }
        Ok(())
    }

    /// Checks the settings a run needs; destination keys only matter when publishing.
    pub fn validate(&self, publishing: bool) -> Result<(), ConfigError> {
        let missing = |key, env| Err(ConfigError::Missing { key, env });

        if self.source.url.trim().is_empty() {
            return missing("source.url", ENV_SOURCE_URL);
        }
        if !publishing {
            return Ok(());
        }
        if self.destination.host.trim().is_empty() {
            return missing("destination.host", ENV_FTP_HOST);
        }
        if self.destination.username.trim().is_empty() {
            return missing("destination.username", ENV_FTP_USER);
        }
        if self.destination.filename.trim().is_empty() {
            return missing("destination.filename", ENV_FTP_FILENAME);
        }
        if self.destination.filename.contains('/') {
            return Err(ConfigError::Invalid {
                key: "destination.filename",
                message: "use `destination.directory` for the remote path".to_string(),
            });
        }
        Ok(())
    }
}
