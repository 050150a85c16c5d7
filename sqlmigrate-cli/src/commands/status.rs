//! Status command - show applied and pending migrations

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sqlmigrate_core::{MigrationFile, MigrationRecord};

use super::{get_migrator, open_database};
use crate::{output, GlobalArgs};

#[derive(Serialize)]
struct StatusOutput {
    table: String,
    directory: String,
    applied: Vec<MigrationRecord>,
    pending: Vec<MigrationFile>,
}

pub fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let conn = open_database(global)?;
    let migrator = get_migrator(&conn, global)?;

    let applied = migrator.applied()?;
    let pending = migrator.pending()?;

    if json {
        let output = StatusOutput {
            table: migrator.config().table_name().to_string(),
            directory: migrator.config().directory().to_string(),
            applied,
            pending,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Migration Status".bold());
    println!();

    if applied.is_empty() && pending.is_empty() {
        output::info(&format!(
            "No migrations found in {}",
            migrator.config().directory()
        ));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Status", "Applied At"]);

    for record in &applied {
        let applied_at = record
            .migration_date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            record.id.to_string(),
            record.name.clone(),
            "applied".to_string(),
            applied_at,
        ]);
    }
    for migration in &pending {
        table.add_row(vec![
            migration.id.to_string(),
            migration.name.clone(),
            "pending".to_string(),
            String::new(),
        ]);
    }

    println!("{}", table);
    println!();

    if pending.is_empty() {
        output::success(&format!("{} applied, nothing pending", applied.len()));
    } else {
        output::warning(&format!(
            "{} applied, {} pending",
            applied.len(),
            pending.len()
        ));
    }

    Ok(())
}
