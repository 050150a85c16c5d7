//! Core domain entities
//!
//! Pure data structures and the file name codec - no database access.

pub mod file_name;
mod migration;
pub mod result;

pub use migration::{ApplyResult, MigrationFile, MigrationRecord, RawMigrationRow, SQL_EXTENSION};
