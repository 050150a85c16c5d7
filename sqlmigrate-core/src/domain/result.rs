//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MigrationFile;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// The database is unusable (metadata table could not be created)
    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Database error: {0}")]
    Database(String),

    /// The metadata table holds a row this tool could not have written
    #[error("Corrupt migration metadata: {0}")]
    CorruptMetadata(String),

    /// A single migration failed and was rolled back
    #[error("Migration {id} ({name}) failed: {source}")]
    Migration {
        id: u64,
        name: String,
        /// Migrations this run committed before the failure
        committed: Vec<MigrationFile>,
        #[source]
        source: Box<Error>,
    },

    #[error("Duplicate migration id {id}: {first} and {second}")]
    DuplicateId {
        id: u64,
        first: String,
        second: String,
    },

    #[error("Invalid migration file name: {0}")]
    InvalidFileName(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a failure that happened while applying one migration
    pub fn migration(
        id: u64,
        name: impl Into<String>,
        committed: Vec<MigrationFile>,
        source: Error,
    ) -> Self {
        Self::Migration {
            id,
            name: name.into(),
            committed,
            source: Box::new(source),
        }
    }

    /// Id of the migration that failed, if this error came from one
    pub fn failed_migration(&self) -> Option<(u64, &str)> {
        match self {
            Self::Migration { id, name, .. } => Some((*id, name.as_str())),
            _ => None,
        }
    }

    /// Migrations committed by the run before it failed
    pub fn committed_migrations(&self) -> &[MigrationFile] {
        match self {
            Self::Migration { committed, .. } => committed,
            _ => &[],
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => match e.failed_migration() {
                Some((id, name)) => {
                    let mut context = HashMap::new();
                    context.insert("migration_id".to_string(), serde_json::json!(id));
                    context.insert("migration_name".to_string(), serde_json::json!(name));
                    let committed: Vec<u64> =
                        e.committed_migrations().iter().map(|m| m.id).collect();
                    context.insert("committed".to_string(), serde_json::json!(committed));
                    Self::fail_with_context(e.to_string(), context)
                }
                None => Self::fail(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_result() {
        let err: Result<i32> = Err(Error::validation("bad input"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.context.is_none());
        assert!(result.error.unwrap().contains("Validation error"));
    }

    #[test]
    fn test_migration_failure_carries_context() {
        let committed = vec![MigrationFile {
            id: 6,
            name: "create_orders".to_string(),
            extension: ".sql".to_string(),
            file_name: "6_create_orders.sql".to_string(),
        }];
        let err: Result<()> = Err(Error::migration(
            7,
            "add_index",
            committed,
            Error::database("syntax error at or near \"SELEC\""),
        ));
        let result: OperationResult<()> = err.into();
        assert!(!result.success);

        let context = result.context.unwrap();
        assert_eq!(context["migration_id"], serde_json::json!(7));
        assert_eq!(context["migration_name"], serde_json::json!("add_index"));
        assert_eq!(context["committed"], serde_json::json!([6]));

        let message = result.error.unwrap();
        assert!(message.starts_with("Migration 7 (add_index) failed"));
        assert!(message.contains("SELEC"));
    }
}
