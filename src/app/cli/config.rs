//! TOML configuration file parsing and loading
//!
//! An optional file supplies defaults for the binary; command-line flags
//! override anything it sets.
//!
//! ```toml
//! filter = "even"
//!
//! [logging]
//! level = "debug"
//! format = "ext"
//! file = "none"
//!
//! [queue]
//! name = "numbers"
//! priority = "high"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::args::NumberFilter;
use crate::core::error_handling::ContextualError;
use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};
use crate::queue::api::QueueOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid {field} '{value}' in configuration file {}", .path.display())]
    Invalid {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. } | ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => Some("Check the --config-file path"),
            ConfigError::Invalid { field, .. } => Some(match *field {
                "log level" => "Log level must be one of trace, debug, info, warn, error, off",
                _ => "Log format must be one of text, ext, json",
            }),
            ConfigError::Read { .. } | ConfigError::Parse { .. } => None,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    /// Log file; `none` or `-` disables file logging
    pub file: Option<String>,
    pub color: Option<bool>,
}

impl LoggingConfig {
    pub fn log_file(&self) -> Option<PathBuf> {
        match self.file.as_deref() {
            Some(file) if file.eq_ignore_ascii_case("none") || file == "-" => None,
            Some(file) => Some(PathBuf::from(file)),
            None => None,
        }
    }
}

/// Contents of an itemqueue configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub filter: Option<NumberFilter>,
    pub logging: LoggingConfig,
    pub queue: QueueOptions,
}

/// `<config dir>/itemqueue/itemqueue.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("itemqueue").join("itemqueue.toml"))
}

impl AppConfig {
    /// Load the explicit file, else the default file if present, else defaults
    ///
    /// An explicitly named file must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) if !path.exists() => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::trace!("No configuration file found; using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field, value: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            value: value.to_string(),
        };
        if let Some(level) = self.logging.level.as_deref() {
            if !LOG_LEVELS.contains(&level) {
                return Err(invalid("log level", level));
            }
        }
        if let Some(format) = self.logging.format.as_deref() {
            if !LOG_FORMATS.contains(&format) {
                return Err(invalid("log format", format));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::api::ThreadPriority;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
filter = "odd"

[logging]
level = "debug"
format = "json"
file = "/var/log/itemqueue.log"
color = false

[queue]
name = "numbers"
stack_size = 131072
priority = "low"
"#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.filter, Some(NumberFilter::Odd));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(
            config.logging.log_file(),
            Some(PathBuf::from("/var/log/itemqueue.log"))
        );
        assert_eq!(config.logging.color, Some(false));
        assert_eq!(config.queue.name.as_deref(), Some("numbers"));
        assert_eq!(config.queue.stack_size, Some(131072));
        assert_eq!(config.queue.priority, ThreadPriority::Low);
    }

    #[test]
    fn test_empty_config_is_default() {
        let file = write_config("");
        assert_eq!(AppConfig::load(Some(file.path())).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let error = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(error, ConfigError::NotFound { .. }));
        assert!(error.is_user_actionable());
    }

    #[test]
    fn test_parse_errors() {
        let file = write_config("[queue]\ncolour = true\n");
        let error = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(!error.is_user_actionable());

        let file = write_config("[logging\nlevel = 1");
        assert!(matches!(
            AppConfig::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_logging_values() {
        let file = write_config("[logging]\nlevel = \"chatty\"\n");
        match AppConfig::load(Some(file.path())) {
            Err(ConfigError::Invalid { field, value, .. }) => {
                assert_eq!(field, "log level");
                assert_eq!(value, "chatty");
            }
            other => panic!("expected Invalid, got {:?}", other),
        }

        let file = write_config("[logging]\nformat = \"xml\"\n");
        let error = AppConfig::load(Some(file.path())).unwrap_err();
        assert_eq!(
            error.user_message(),
            Some("Log format must be one of text, ext, json")
        );
    }

    #[test]
    fn test_log_file_magic_values() {
        for disabled in ["none", "NONE", "-"] {
            let logging = LoggingConfig {
                file: Some(disabled.to_string()),
                ..LoggingConfig::default()
            };
            assert_eq!(logging.log_file(), None);
        }
        assert_eq!(LoggingConfig::default().log_file(), None);
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("itemqueue/itemqueue.toml"));
        }
    }
}
