//! Up command - apply pending migrations

use anyhow::Result;
use colored::Colorize;
use sqlmigrate_core::domain::file_name;
use sqlmigrate_core::OperationResult;

use super::{get_migrator, open_database};
use crate::{output, GlobalArgs};

pub fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let conn = open_database(global)?;
    let migrator = get_migrator(&conn, global)?;

    let result = migrator.apply();

    if json {
        let failed = result.is_err();
        let envelope: OperationResult<_> = result.into();
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        if failed {
            anyhow::bail!(envelope.error.unwrap_or_default());
        }
        return Ok(());
    }

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            // Migrations before the failing one stay committed
            for migration in e.committed_migrations() {
                println!("  {} {}", "applied".green(), migration.file_name);
            }
            if let Some((id, name)) = e.failed_migration() {
                println!("  {} {}", "failed".red(), file_name::file_name(id, name));
            }
            return Err(e.into());
        }
    };

    if result.applied.is_empty() {
        output::info(&format!(
            "Database is up to date ({} migration(s) already applied)",
            result.already_applied
        ));
        return Ok(());
    }

    for migration in &result.applied {
        println!("  {} {}", "applied".green(), migration.file_name);
    }
    println!();
    output::success(&format!(
        "Applied {} migration(s), {} already applied",
        result.applied.len(),
        result.already_applied
    ));

    Ok(())
}
