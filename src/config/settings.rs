//! TOML-based configuration for sqlgate.
//!
//! Example configuration:
//! ```toml
//! [limits]
//! row_ceiling = 100
//!
//! [tables]
//! default_schema = "${SQLGATE_SCHEMA}"
//!
//! [sql]
//! dialect = "postgres"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::{CompileOptions, DEFAULT_ROW_CEILING};
use crate::sql::dialect::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub limits: LimitSettings,
    pub tables: TableSettings,
    pub sql: SqlSettings,
}

/// Row limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Ceiling used when a request gives none.
    pub row_ceiling: u64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            row_ceiling: DEFAULT_ROW_CEILING,
        }
    }
}

/// Table name qualification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TableSettings {
    /// Schema for bare table identifiers (supports `${ENV_VAR}` expansion).
    pub default_schema: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            default_schema: "zcm".to_string(),
        }
    }
}

/// SQL output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// `postgres` or `duckdb`.
    pub dialect: String,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQLGATE_CONFIG`
    /// 2. `./sqlgate.toml`
    /// 3. `~/.config/sqlgate/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SQLGATE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sqlgate.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlgate").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Resolved dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        Dialect::from_name(&self.sql.dialect).ok_or_else(|| {
            SettingsError::InvalidConfig(format!("unknown sql.dialect '{}'", self.sql.dialect))
        })
    }

    /// Default schema with environment variables expanded.
    pub fn default_schema(&self) -> Result<String, SettingsError> {
        let schema = expand_env_vars(&self.tables.default_schema)?;
        let schema = schema.trim();
        if schema.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "tables.default_schema must not be empty".into(),
            ));
        }
        Ok(schema.to_string())
    }

    /// Options for [`crate::compile::Request`].
    pub fn compile_options(&self) -> Result<CompileOptions, SettingsError> {
        if self.limits.row_ceiling == 0 {
            return Err(SettingsError::InvalidConfig(
                "limits.row_ceiling must be positive".into(),
            ));
        }
        Ok(CompileOptions {
            dialect: self.dialect()?,
            row_ceiling: self.limits.row_ceiling,
        })
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&ch) = chars.peek() {
            if braced && ch == '}' {
                chars.next();
                break;
            }
            if !braced && !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            var_name.push(ch);
            chars.next();
        }

        if var_name.is_empty() && !braced {
            // A lone $ is kept.
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
