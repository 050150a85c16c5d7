//! New command - create an empty migration file

use anyhow::Result;
use dialoguer::Input;

use super::{get_migrator, open_database};
use crate::{output, GlobalArgs};

pub fn run(global: &GlobalArgs, name: Option<String>, json: bool) -> Result<()> {
    // Get the name interactively if not provided
    let name = match name {
        Some(name) => name,
        None if atty::is(atty::Stream::Stdin) => Input::new()
            .with_prompt("Migration name")
            .interact_text()?,
        None => anyhow::bail!("No migration name provided."),
    };

    let conn = open_database(global)?;
    let migrator = get_migrator(&conn, global)?;
    let stub = migrator.create_stub(&name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stub)?);
        return Ok(());
    }

    output::success("Migration file created");
    println!("  {}{}", migrator.config().directory(), stub.file_name);

    Ok(())
}
