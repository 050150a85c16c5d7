//! sqlmigrate core - version-ordered SQL migrations
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: migration records, migration files and the file name codec
//! - **ports**: the `MigrationStore` trait the migrator talks to
//! - **services**: the `Migrator` (initialize, apply, create stubs)
//! - **adapters**: the DuckDB store

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types at crate root
pub use adapters::{open_connection, Connection, DuckDbStore};
pub use config::{normalize_directory, Config, Settings, DEFAULT_TABLE_NAME};
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{ApplyResult, MigrationFile, MigrationRecord};
pub use ports::MigrationStore;
pub use services::Migrator;
