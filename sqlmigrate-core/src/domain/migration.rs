//! Migration domain models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Extension a file must carry to be picked up as a migration
pub const SQL_EXTENSION: &str = ".sql";

/// A migration file found in (or created in) the migrations directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFile {
    /// Ordering key, the leading numeric segment of the file name
    pub id: u64,
    /// Human-readable label between the id and the extension
    pub name: String,
    /// Suffix from the last `.` on, including the dot
    pub extension: String,
    /// File name exactly as it appears on disk
    pub file_name: String,
}

impl MigrationFile {
    /// Whether this file is eligible to be applied
    pub fn is_sql(&self) -> bool {
        self.extension == SQL_EXTENSION
    }
}

/// A row of the metadata table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: u64,
    pub name: String,
    /// Set by the database when the row is inserted
    pub migration_date: Option<NaiveDateTime>,
}

/// A metadata row as read from the database, before the id is validated
#[derive(Debug, Clone)]
pub struct RawMigrationRow {
    /// Textual form of the stored id
    pub id: String,
    pub name: String,
    pub migration_date: Option<NaiveDateTime>,
}

/// Result of applying pending migrations
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyResult {
    /// Migrations applied by this run, in the order they ran
    pub applied: Vec<MigrationFile>,
    /// Count of migrations that were already recorded before this run
    pub already_applied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sql_requires_exact_extension() {
        let mut file = MigrationFile {
            id: 1,
            name: "create_users".to_string(),
            extension: ".sql".to_string(),
            file_name: "1_create_users.sql".to_string(),
        };
        assert!(file.is_sql());

        file.extension = ".SQL".to_string();
        assert!(!file.is_sql());

        file.extension = ".sqlite".to_string();
        assert!(!file.is_sql());
    }
}
