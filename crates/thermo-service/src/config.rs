//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use thermo_types::ClampPolicy;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Clamp policy applied to incoming readings.
    pub readings: ClampPolicy,
    /// Chart query settings.
    pub chart: ChartConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Storage path is not empty
    /// - Clamp bounds are finite with `min < max`
    /// - Chart window defaults lie within `1..=max_days`, and `max_days`
    ///   within `1..=MAX_CHART_DAYS_LIMIT`
    ///
    /// # Example
    ///
    /// ```
    /// use thermo_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());

        if !self.readings.is_valid() {
            errors.push(ValidationError {
                field: "readings".to_string(),
                message: format!(
                    "clamp range [{}, {}] must be finite with min < max",
                    self.readings.min, self.readings.max
                ),
            });
        }

        errors.extend(self.chart.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
            return errors;
        }

        let Some((_, port_str)) = self.bind.rsplit_once(':') else {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            });
            return errors;
        };

        match port_str.parse::<u16>() {
            Ok(0) => errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "port cannot be 0".to_string(),
            }),
            Err(_) => errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: format!("invalid port '{}': must be a number 1-65535", port_str),
            }),
            Ok(_) => {}
        }

        errors
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: thermo_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Chart query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Window used when a request does not name one.
    pub default_days: u32,
    /// Largest window a request may ask for.
    pub max_days: u32,
}

/// Default chart window in days.
pub const DEFAULT_CHART_DAYS: u32 = 1;
/// Default upper bound on the chart window in days.
pub const DEFAULT_MAX_CHART_DAYS: u32 = 366;
/// Largest value accepted for `chart.max_days` (about a century).
pub const MAX_CHART_DAYS_LIMIT: u32 = 36_600;

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_days: DEFAULT_CHART_DAYS,
            max_days: DEFAULT_MAX_CHART_DAYS,
        }
    }
}

impl ChartConfig {
    /// Validate chart configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.max_days == 0 {
            errors.push(ValidationError {
                field: "chart.max_days".to_string(),
                message: "max_days must be at least 1".to_string(),
            });
        } else if self.max_days > MAX_CHART_DAYS_LIMIT {
            errors.push(ValidationError {
                field: "chart.max_days".to_string(),
                message: format!(
                    "max_days {} exceeds the limit of {}",
                    self.max_days, MAX_CHART_DAYS_LIMIT
                ),
            });
        }

        if self.default_days == 0 || self.default_days > self.max_days {
            errors.push(ValidationError {
                field: "chart.default_days".to_string(),
                message: format!(
                    "default_days {} must be between 1 and max_days ({})",
                    self.default_days, self.max_days
                ),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `chart.max_days`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thermo")
        .join("server.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert!(!config.readings.clamp);
        assert_eq!(config.readings.min, 10.0);
        assert_eq!(config.readings.max, 30.0);
        assert_eq!(config.chart.default_days, 1);
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.path, thermo_store::default_db_path());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config = Config {
            server: ServerConfig {
                bind: "127.0.0.1:9090".to_string(),
            },
            storage: StorageConfig {
                path: PathBuf::from("/tmp/test.db"),
            },
            readings: ClampPolicy::enabled(5.0, 35.0),
            chart: ChartConfig {
                default_days: 7,
                max_days: 30,
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "127.0.0.1:9090");
        assert_eq!(loaded.storage.path, PathBuf::from("/tmp/test.db"));
        assert_eq!(loaded.readings, ClampPolicy::enabled(5.0, 35.0));
        assert_eq!(loaded.chart.default_days, 7);
        assert_eq!(loaded.chart.max_days, 30);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let toml = r#"
            [readings]
            clamp = true
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert!(config.readings.clamp);
        assert_eq!(config.readings.min, 10.0);
        assert_eq!(config.readings.max, 30.0);
        assert_eq!(config.chart.max_days, DEFAULT_MAX_CHART_DAYS);
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [server]
            bind = "192.168.1.1:8888"

            [storage]
            path = "/data/thermo.db"

            [readings]
            clamp = true
            min = 0.0
            max = 40.0

            [chart]
            default_days = 2
            max_days = 90
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "192.168.1.1:8888");
        assert_eq!(config.storage.path, PathBuf::from("/data/thermo.db"));
        assert_eq!(config.readings, ClampPolicy::enabled(0.0, 40.0));
        assert_eq!(config.chart.default_days, 2);
        assert_eq!(config.chart.max_days, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("thermo/server.toml"));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_server_bind_validation() {
        let valid = ServerConfig {
            bind: "[::1]:8080".to_string(),
        };
        assert!(valid.validate().is_empty());

        for bad in ["", "localhost", "127.0.0.1:0", "127.0.0.1:http", "127.0.0.1:70000"] {
            let config = ServerConfig {
                bind: bad.to_string(),
            };
            assert_eq!(config.validate().len(), 1, "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_storage_path_validation() {
        let config = StorageConfig {
            path: PathBuf::new(),
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "storage.path");
    }

    #[test]
    fn test_clamp_range_validation() {
        let config = Config {
            readings: ClampPolicy::enabled(30.0, 10.0),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("readings"));
    }

    #[test]
    fn test_chart_validation() {
        let zero_default = ChartConfig {
            default_days: 0,
            max_days: 10,
        };
        assert_eq!(zero_default.validate().len(), 1);

        let above_max = ChartConfig {
            default_days: 11,
            max_days: 10,
        };
        assert_eq!(above_max.validate()[0].field, "chart.default_days");

        let zero_max = ChartConfig {
            default_days: 1,
            max_days: 0,
        };
        assert_eq!(zero_max.validate().len(), 2);
    }

    #[test]
    fn test_chart_max_days_is_capped() {
        let at_limit = ChartConfig {
            default_days: 1,
            max_days: MAX_CHART_DAYS_LIMIT,
        };
        assert!(at_limit.validate().is_empty());

        let unbounded = Config {
            chart: ChartConfig {
                default_days: 1,
                max_days: u32::MAX,
            },
            ..Config::default()
        };
        let err = unbounded.validate().unwrap_err();
        assert!(err.to_string().contains("chart.max_days"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let config = Config {
            server: ServerConfig {
                bind: String::new(),
            },
            storage: StorageConfig {
                path: PathBuf::new(),
            },
            ..Config::default()
        };

        let display = config.validate().unwrap_err().to_string();
        assert!(display.contains("Configuration validation failed"));
        assert!(display.contains("server.bind"));
        assert!(display.contains("storage.path"));
    }

    #[test]
    fn test_load_validated_rejects_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        std::fs::write(&config_path, "[chart]\ndefault_days = 0\n").unwrap();

        let result = Config::load_validated(&config_path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
