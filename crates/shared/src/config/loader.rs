//! Configuration loader
//!
//! Loads configuration from an optional `.env` file followed by environment
//! variables. Values from the `.env` file take precedence over the system
//! environment, which allows local development overrides without touching the
//! machine configuration.

use std::path::Path;

use super::dto::{LoggingConfig, PlatformConfig, TaskEngineConfig};
use super::error::{ConfigError, Result};

/// Configuration loader
///
/// # Example
///
/// ```ignore
/// use corvus_shared::config::ConfigLoader;
///
/// let loader = ConfigLoader::new(Some(".env".into()));
/// let config = loader.load_platform_config()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Optional path to .env file
    env_file_path: Option<std::path::PathBuf>,
}

impl ConfigLoader {
    pub fn new(env_file_path: Option<std::path::PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load the platform configuration
    ///
    /// Reads the `.env` file (if configured), builds the DTOs from environment
    /// variables, and validates the result. Every `CORVUS_*` variable is
    /// optional; the documented defaults apply when unset.
    pub fn load_platform_config(&self) -> Result<PlatformConfig> {
        if let Some(path) = &self.env_file_path {
            self.load_env_file(path)?;
        }

        let config = PlatformConfig {
            task_engine: TaskEngineConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        validate_platform_config(&config)?;

        Ok(config)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::EnvFileLoad {
                path: path.to_path_buf(),
                source: dotenv::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                )),
            });
        }

        dotenv::from_path(path).map_err(|e| ConfigError::EnvFileLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    /// Create a ConfigLoader without .env file support
    fn default() -> Self {
        Self::new(None)
    }
}

impl TaskEngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            task_history_limit: parse_var(
                "CORVUS_TASK_HISTORY_LIMIT",
                defaults.task_history_limit,
            )?,
            subtask_max_retries: parse_var(
                "CORVUS_SUBTASK_MAX_RETRIES",
                defaults.subtask_max_retries,
            )?,
            retry_base_delay_ms: parse_var(
                "CORVUS_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            )?,
        })
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| Self::default().level),
        })
    }
}

/// Parse an optional environment variable, falling back to a default
fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> Result<T> {
    match std::env::var(var) {
        Ok(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn validate_platform_config(config: &PlatformConfig) -> Result<()> {
    if config.task_engine.task_history_limit == 0 {
        return Err(ConfigError::Validation(
            "CORVUS_TASK_HISTORY_LIMIT must be > 0".to_string(),
        ));
    }
    if config.task_engine.retry_base_delay_ms == 0 {
        return Err(ConfigError::Validation(
            "CORVUS_RETRY_BASE_DELAY_MS must be > 0".to_string(),
        ));
    }
    Ok(())
}
