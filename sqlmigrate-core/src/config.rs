//! Configuration management
//!
//! Settings are read from a JSON file:
//! ```json
//! { "directory": "db/migrations", "tableName": "gorm_migrations" }
//! ```
//! Environment variables override the file, and callers (the CLI) override
//! both. The result is frozen into an immutable [`Config`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Metadata table used when none is configured
pub const DEFAULT_TABLE_NAME: &str = "gorm_migrations";

/// Directory used when none is configured
pub const DEFAULT_DIRECTORY: &str = "migrations";

/// Environment variable overriding the migrations directory
pub const ENV_DIRECTORY: &str = "SQLMIGRATE_DIR";

/// Environment variable overriding the metadata table name
pub const ENV_TABLE_NAME: &str = "SQLMIGRATE_TABLE";

#[cfg(windows)]
const TRAILING_SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const TRAILING_SEPARATORS: &[char] = &['/'];

/// Normalize a directory so it ends with exactly one `/`
///
/// Idempotent. An empty path becomes `./`, a root-only path becomes `/`.
pub fn normalize_directory(directory: &str) -> String {
    if directory.is_empty() {
        return "./".to_string();
    }
    let trimmed = directory.trim_end_matches(TRAILING_SEPARATORS);
    format!("{}/", trimmed)
}

/// Migrator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    directory: String,
    table_name: String,
}

impl Config {
    /// Build a configuration, defaulting an empty or missing table name
    pub fn new(directory: impl AsRef<str>, table_name: Option<&str>) -> Self {
        let table_name = match table_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_TABLE_NAME.to_string(),
        };
        Self {
            directory: normalize_directory(directory.as_ref()),
            table_name,
        }
    }

    /// Migrations directory, always ending with a separator
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Metadata table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Raw settings file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `SQLMIGRATE_DIR` / `SQLMIGRATE_TABLE` on top of the file values
    pub fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_DIRECTORY).ok(),
            std::env::var(ENV_TABLE_NAME).ok(),
        )
    }

    /// Replace values for which an override is given
    pub fn with_overrides(mut self, directory: Option<String>, table_name: Option<String>) -> Self {
        if let Some(directory) = directory.filter(|d| !d.is_empty()) {
            self.directory = Some(directory);
        }
        if let Some(table_name) = table_name.filter(|t| !t.is_empty()) {
            self.table_name = Some(table_name);
        }
        self
    }

    /// Freeze into an immutable [`Config`]
    pub fn into_config(self) -> Config {
        let directory = self
            .directory
            .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());
        Config::new(directory, self.table_name.as_deref())
    }
}
