//! DuckDB migration store implementation

use std::path::Path;

use chrono::NaiveDateTime;
use duckdb::params;
pub use duckdb::Connection;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{MigrationFile, RawMigrationRow};
use crate::ports::MigrationStore;

/// Open (or create) a DuckDB database file
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    // IMPORTANT: Disable extension autoloading to avoid macOS code signing issues
    // (cached extensions in ~/.duckdb/extensions may have different Team IDs)
    let config = duckdb::Config::default().enable_autoload_extension(false)?;
    let conn = Connection::open_with_flags(db_path, config)?;
    Ok(conn)
}

/// Quote a table name as a SQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Parse the VARCHAR form of a DuckDB TIMESTAMP
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Migration store over a borrowed DuckDB connection
pub struct DuckDbStore<'a> {
    conn: &'a Connection,
}

impl<'a> DuckDbStore<'a> {
    /// Wrap an already open connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Execute the migration body and the metadata insert, then commit
    fn run_and_record(&self, table: &str, migration: &MigrationFile, sql: &str) -> Result<()> {
        let id = i64::try_from(migration.id).map_err(|_| {
            Error::validation(format!(
                "Migration id {} does not fit in a BIGINT column",
                migration.id
            ))
        })?;

        // An empty stub has nothing to run but is still recorded
        if !sql.trim().is_empty() {
            self.conn.execute_batch(sql)?;
        }

        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, name) VALUES (?, ?)",
                quote_identifier(table)
            ),
            params![id, migration.name],
        )?;

        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}

impl MigrationStore for DuckDbStore<'_> {
    fn ensure_table(&self, table: &str) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGINT NOT NULL,
                name VARCHAR(255) NOT NULL,
                migration_date TIMESTAMP NOT NULL DEFAULT current_timestamp
            );",
            quote_identifier(table)
        ))?;
        Ok(())
    }

    fn applied_rows(&self, table: &str) -> Result<Vec<RawMigrationRow>> {
        // Note: ids are read as text and validated by the caller, so a row
        // written outside this tool surfaces as corrupt metadata
        let mut stmt = self.conn.prepare(&format!(
            "SELECT CAST(id AS VARCHAR), name, CAST(migration_date AS VARCHAR) FROM {}",
            quote_identifier(table)
        ))?;

        let rows = stmt.query_map([], |row| {
            let migration_date: Option<String> = row.get(2)?;
            Ok(RawMigrationRow {
                id: row.get(0)?,
                name: row.get(1)?,
                migration_date: migration_date.as_deref().and_then(parse_timestamp),
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn apply(&self, table: &str, migration: &MigrationFile, sql: &str) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        debug!(id = migration.id, name = %migration.name, "transaction started");

        match self.run_and_record(table, migration, sql) {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    // A failed COMMIT has already ended the transaction
                    warn!(
                        id = migration.id,
                        error = %rollback_err,
                        "rollback after failed migration did not succeed"
                    );
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::file_name;

    fn row_count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("gorm_migrations"), "\"gorm_migrations\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_ensure_table_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DuckDbStore::new(&conn);

        store.ensure_table("gorm_migrations").unwrap();
        store.ensure_table("gorm_migrations").unwrap();

        assert_eq!(row_count(&conn, "gorm_migrations"), 0);
    }

    #[test]
    fn test_apply_records_row_with_default_date() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DuckDbStore::new(&conn);
        store.ensure_table("history").unwrap();

        let migration = file_name::parse("1_create_users.sql").unwrap();
        store
            .apply("history", &migration, "CREATE TABLE users(id INT);")
            .unwrap();

        let rows = store.applied_rows("history").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].name, "create_users");
        assert!(rows[0].migration_date.is_some());
    }

    #[test]
    fn test_apply_binds_name_with_quotes() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DuckDbStore::new(&conn);
        store.ensure_table("gorm_migrations").unwrap();

        let migration = file_name::parse("5_it's_fine.sql").unwrap();
        store.apply("gorm_migrations", &migration, "").unwrap();

        let rows = store.applied_rows("gorm_migrations").unwrap();
        assert_eq!(rows[0].name, "it's_fine");
    }

    #[test]
    fn test_failed_apply_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DuckDbStore::new(&conn);
        store.ensure_table("gorm_migrations").unwrap();

        let migration = file_name::parse("2_broken.sql").unwrap();
        let result = store.apply(
            "gorm_migrations",
            &migration,
            "CREATE TABLE half_done(id INT); INSERT INTO does_not_exist VALUES (1);",
        );
        assert!(result.is_err());
        assert_eq!(row_count(&conn, "gorm_migrations"), 0);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'half_done'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);

        // The connection is usable again after the rollback
        let ok = file_name::parse("3_fine.sql").unwrap();
        store
            .apply("gorm_migrations", &ok, "CREATE TABLE fine(id INT);")
            .unwrap();
        assert_eq!(row_count(&conn, "gorm_migrations"), 1);
    }

    #[test]
    fn test_commit_inside_migration_ends_transaction_early() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DuckDbStore::new(&conn);
        store.ensure_table("gorm_migrations").unwrap();

        let migration = file_name::parse("4_commits_itself.sql").unwrap();
        let result = store.apply(
            "gorm_migrations",
            &migration,
            "CREATE TABLE early(id INT); COMMIT; INSERT INTO does_not_exist VALUES (1);",
        );
        assert!(result.is_err());
        assert_eq!(row_count(&conn, "gorm_migrations"), 0);

        // Work before the embedded COMMIT is not rolled back
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'early'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2026-10-19 12:30:00").is_some());
        assert!(parse_timestamp("2026-10-19 12:30:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
