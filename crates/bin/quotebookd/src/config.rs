//! Daemon settings.
//!
//! Read from `quotebook.toml` (or the file named by `QUOTEBOOK_CONFIG`), then
//! overridden by `QUOTEBOOK_*` variables and `RUST_LOG`. A missing file means
//! all defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILE: &str = "quotebook.toml";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite:quotebook.db?mode=rwc";
const DEFAULT_LOG_FILTER: &str = "quotebookd=info,quotebook=info,tower_http=debug";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// `[server]`
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// `[database]`
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite:quotebook.db?mode=rwc`.
    pub url: String,
}

/// `[logging]`
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    pub filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

/// Failure to produce a usable [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    /// Resolve the settings from file and process environment.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed, or when the
    /// merged settings are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("QUOTEBOOK_CONFIG")
            .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
        let mut config = Self::read(&path)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// `None` when `path` does not exist.
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Self::parse(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Later variables win: `QUOTEBOOK_BIND` beats `QUOTEBOOK_HOST` and
    /// `QUOTEBOOK_PORT`, `RUST_LOG` beats `QUOTEBOOK_LOG`. Unparsable ports
    /// are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("QUOTEBOOK_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("QUOTEBOOK_PORT").and_then(|raw| raw.parse().ok()) {
            self.server.port = port;
        }
        if let Some((host, port)) = lookup("QUOTEBOOK_BIND")
            .as_deref()
            .and_then(|bind| bind.rsplit_once(':'))
        {
            self.server.host = host.to_owned();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(url) = lookup("QUOTEBOOK_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(filter) = lookup("RUST_LOG").or_else(|| lookup("QUOTEBOOK_LOG")) {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.server.port == 0 {
            "server.port must be non-zero"
        } else if self.server.host.trim().is_empty() {
            "server.host must not be empty"
        } else if self.database.url.trim().is_empty() {
            "database.url must not be empty"
        } else {
            return Ok(());
        };
        Err(ConfigError::Validation(problem.to_owned()))
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}
