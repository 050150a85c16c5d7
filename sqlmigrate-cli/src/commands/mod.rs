//! CLI command implementations

pub mod init;
pub mod new;
pub mod status;
pub mod up;

use anyhow::{Context, Result};
use sqlmigrate_core::{open_connection, Config, Connection, DuckDbStore, Migrator, Settings};
use tracing::debug;

use crate::GlobalArgs;

/// Resolve the configuration: flags > environment > settings file > defaults
pub fn get_config(global: &GlobalArgs) -> Result<Config> {
    let settings = Settings::load(&global.config)
        .with_context(|| format!("Failed to load settings from {:?}", global.config))?;

    let config = settings
        .with_env()
        .with_overrides(global.dir.clone(), global.table.clone())
        .into_config();
    debug!(
        directory = config.directory(),
        table = config.table_name(),
        "resolved configuration"
    );
    Ok(config)
}

/// Open the database named on the command line
pub fn open_database(global: &GlobalArgs) -> Result<Connection> {
    open_connection(&global.database)
        .with_context(|| format!("Failed to open database {:?}", global.database))
}

/// Build a migrator over `conn`
///
/// Any error here means the database is unusable, so callers just bail.
pub fn get_migrator<'a>(conn: &'a Connection, global: &GlobalArgs) -> Result<Migrator<DuckDbStore<'a>>> {
    let config = get_config(global)?;
    Migrator::new(DuckDbStore::new(conn), config).context("Failed to initialize migrator")
}
