//! Migration store port - metadata table and migration execution

use crate::domain::result::Result;
use crate::domain::{MigrationFile, RawMigrationRow};

/// Database abstraction used by the migrator
///
/// Implementations own an already connected database handle. All methods
/// take the metadata table name as configured; implementations must quote
/// it as an identifier.
pub trait MigrationStore {
    /// Create the metadata table if it does not exist yet
    fn ensure_table(&self, table: &str) -> Result<()>;

    /// Read every row of the metadata table
    fn applied_rows(&self, table: &str) -> Result<Vec<RawMigrationRow>>;

    /// Run `sql` and record `migration` in one transaction
    ///
    /// On error nothing from this call may remain in the database. The
    /// exception is transaction control inside `sql` itself: a `COMMIT` or
    /// `ROLLBACK` there ends the transaction early, and statements before it
    /// persist even when the call fails.
    fn apply(&self, table: &str, migration: &MigrationFile, sql: &str) -> Result<()>;
}
