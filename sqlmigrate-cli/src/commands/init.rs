//! Init command - create the migration metadata table

use anyhow::Result;
use serde::Serialize;

use super::{get_migrator, open_database};
use crate::{output, GlobalArgs};

#[derive(Serialize)]
struct InitOutput<'a> {
    database: String,
    table: &'a str,
    directory: &'a str,
}

pub fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let conn = open_database(global)?;
    let migrator = get_migrator(&conn, global)?;
    let config = migrator.config();

    if json {
        let output = InitOutput {
            database: global.database.display().to_string(),
            table: config.table_name(),
            directory: config.directory(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::success(&format!(
        "Migration table \"{}\" is ready in {}",
        config.table_name(),
        global.database.display()
    ));
    println!("Migrations directory: {}", config.directory());
    Ok(())
}
