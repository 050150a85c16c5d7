//! sqlmigrate CLI - apply versioned SQL migrations

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{init, new, status, up};

/// Environment variable holding the log filter (e.g. `debug`, `sqlmigrate_core=info`)
const LOG_ENV: &str = "SQLMIGRATE_LOG";

/// sqlmigrate - apply versioned SQL migrations
#[derive(Parser)]
#[command(name = "sqlmigrate", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// DuckDB database file
    #[arg(long, short = 'd', global = true, env = "SQLMIGRATE_DATABASE", default_value = "sqlmigrate.duckdb")]
    pub database: PathBuf,
    /// Migrations directory (overrides SQLMIGRATE_DIR and the settings file)
    #[arg(long, global = true)]
    pub dir: Option<String>,
    /// Metadata table name (overrides SQLMIGRATE_TABLE and the settings file)
    #[arg(long, global = true)]
    pub table: Option<String>,
    /// Settings file
    #[arg(long, short = 'c', global = true, env = "SQLMIGRATE_CONFIG", default_value = "sqlmigrate.json")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the migration metadata table
    Init {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply all pending migrations
    Up {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new empty migration file
    New {
        /// Migration name (prompted for when omitted)
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show applied and pending migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { json } => init::run(&cli.global, json),
        Commands::Up { json } => up::run(&cli.global, json),
        Commands::New { name, json } => new::run(&cli.global, name, json),
        Commands::Status { json } => status::run(&cli.global, json),
    }
}
