//! Migrator service - applies migration files and creates new ones
//!
//! Applied migrations are tracked in a metadata table (by default
//! `gorm_migrations`). Each pending `.sql` file in the migrations directory
//! runs in its own transaction, in ascending id order.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::file_name;
use crate::domain::result::{Error, Result};
use crate::domain::{ApplyResult, MigrationFile, MigrationRecord};
use crate::ports::MigrationStore;

/// Service for applying and creating migrations
pub struct Migrator<S: MigrationStore> {
    store: S,
    config: Config,
}

impl<S: MigrationStore> Migrator<S> {
    /// Create a migrator, ensuring the metadata table exists
    ///
    /// Failing to create the table means the database is unusable; this is
    /// reported as [`Error::Setup`].
    pub fn new(store: S, config: Config) -> Result<Self> {
        store.ensure_table(config.table_name()).map_err(|e| {
            Error::Setup(format!(
                "could not create migration table {}: {}",
                config.table_name(),
                e
            ))
        })?;
        debug!(table = config.table_name(), "migration table ready");

        Ok(Self { store, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply every pending migration
    ///
    /// Stops at the first failure. Migrations committed before it stay
    /// applied; the failing one is rolled back and reported as
    /// [`Error::Migration`].
    pub fn apply(&self) -> Result<ApplyResult> {
        let applied_set = self.applied_set()?;
        let pending = self.pending_from(&applied_set)?;

        let mut newly_applied = Vec::with_capacity(pending.len());
        for migration in pending {
            if let Err(e) = self.apply_one(&migration) {
                return Err(Error::migration(
                    migration.id,
                    migration.name.clone(),
                    newly_applied,
                    e,
                ));
            }
            info!(id = migration.id, name = %migration.name, "applied migration");
            newly_applied.push(migration);
        }

        Ok(ApplyResult {
            applied: newly_applied,
            already_applied: applied_set.len(),
        })
    }

    /// All recorded migrations, ascending by id
    pub fn applied(&self) -> Result<Vec<MigrationRecord>> {
        Ok(self.applied_set()?.into_values().collect())
    }

    /// Migration files not yet recorded, ascending by id
    pub fn pending(&self) -> Result<Vec<MigrationFile>> {
        let applied_set = self.applied_set()?;
        self.pending_from(&applied_set)
    }

    /// Create a new, empty migration file
    ///
    /// Never overwrites an existing file.
    pub fn create_stub(&self, name: &str) -> Result<MigrationFile> {
        let file_name = file_name::generate(name)?;
        let path = self.create_empty(&file_name)?;

        info!(path = %path.display(), "created migration file");
        file_name::parse(&file_name)
    }

    /// Create `file_name` empty in the migrations directory, failing if it exists
    fn create_empty(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.path_of(file_name);

        // The handle is dropped (closed) at the end of this statement
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(path)
    }

    /// Metadata rows keyed by id
    fn applied_set(&self) -> Result<BTreeMap<u64, MigrationRecord>> {
        let rows = self.store.applied_rows(self.config.table_name())?;

        let mut applied = BTreeMap::new();
        for row in rows {
            let id = row.id.parse::<u64>().map_err(|_| {
                Error::CorruptMetadata(format!(
                    "non-numeric id {:?} for migration {:?} in table {}",
                    row.id,
                    row.name,
                    self.config.table_name()
                ))
            })?;
            applied.insert(
                id,
                MigrationRecord {
                    id,
                    name: row.name,
                    migration_date: row.migration_date,
                },
            );
        }
        Ok(applied)
    }

    /// Eligible files in the migrations directory that are not in `applied`
    fn pending_from(&self, applied: &BTreeMap<u64, MigrationRecord>) -> Result<Vec<MigrationFile>> {
        let mut pending: BTreeMap<u64, MigrationFile> = BTreeMap::new();

        for entry in fs::read_dir(self.config.directory())? {
            let entry = entry?;
            let entry_name = entry.file_name();
            let Some(entry_name) = entry_name.to_str() else {
                debug!(entry = ?entry.file_name(), "skipping non UTF-8 file name");
                continue;
            };

            let migration = match file_name::parse(entry_name) {
                Ok(migration) if migration.is_sql() => migration,
                _ => {
                    debug!(entry = entry_name, "skipping non-migration entry");
                    continue;
                }
            };

            if applied.contains_key(&migration.id) {
                continue;
            }

            if let Some(existing) = pending.get(&migration.id) {
                let (first, second) = if existing.file_name <= migration.file_name {
                    (existing.file_name.clone(), migration.file_name.clone())
                } else {
                    (migration.file_name.clone(), existing.file_name.clone())
                };
                return Err(Error::DuplicateId {
                    id: migration.id,
                    first,
                    second,
                });
            }
            pending.insert(migration.id, migration);
        }

        Ok(pending.into_values().collect())
    }

    fn apply_one(&self, migration: &MigrationFile) -> Result<()> {
        let sql = fs::read_to_string(self.path_of(&migration.file_name))?;
        self.store.apply(self.config.table_name(), migration, &sql)
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.config.directory(), file_name))
    }
}
