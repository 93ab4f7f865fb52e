use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::DEFAULT_TOLERANCE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub explode: ExplodeConfig,
    pub compare: CompareConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplodeConfig {
    pub max_depth: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompareConfig {
    pub tolerance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub max_depth: Option<usize>,
    pub tolerance: Option<Decimal>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    explode: Option<ExplodePatch>,
    compare: Option<ComparePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ExplodePatch {
    max_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ComparePatch {
    tolerance: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            explode: ExplodeConfig { max_depth: 64 },
            compare: CompareConfig { tolerance: DEFAULT_TOLERANCE },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bomcheck.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(explode) = patch.explode {
            if let Some(max_depth) = explode.max_depth {
                self.explode.max_depth = max_depth;
            }
        }
        if let Some(compare) = patch.compare {
            if let Some(tolerance) = compare.tolerance {
                self.compare.tolerance = tolerance;
            }
        }
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOMCHECK_MAX_DEPTH") {
            self.explode.max_depth = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "BOMCHECK_MAX_DEPTH".to_string(),
                value,
            })?;
        }
        if let Some(value) = read_env("BOMCHECK_TOLERANCE") {
            self.compare.tolerance =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "BOMCHECK_TOLERANCE".to_string(),
                    value,
                })?;
        }
        if let Some(value) = read_env("BOMCHECK_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("BOMCHECK_LOG_FORMAT") {
            self.logging.format =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "BOMCHECK_LOG_FORMAT".to_string(),
                    value,
                })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(max_depth) = overrides.max_depth {
            self.explode.max_depth = max_depth;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.compare.tolerance = tolerance;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.explode.max_depth == 0 {
            return Err(ConfigError::Validation("explode.max_depth must be at least 1".into()));
        }
        if self.compare.tolerance < Decimal::ZERO {
            return Err(ConfigError::Validation("compare.tolerance must not be negative".into()));
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Some(value) = read_env("BOMCHECK_CONFIG") {
        let path = PathBuf::from(value);
        return path.exists().then_some(path);
    }
    let default = PathBuf::from("bomcheck.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}
