use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tj_cli::commands::util::resolve_journal;
use tj_cli::commands::{entry, forecast, journal, stats, summary, waypoint};
use tj_cli::{Cli, Commands, Config, EntryAction, JournalAction, WaypointAction};
use tj_core::Journal;
use tj_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Journal selected by `--journal`, the configured default, or the only one.
fn selected_journal(cli: &Cli, db: &Database, config: &Config) -> Result<Journal> {
    resolve_journal(db, cli.journal.as_deref(), config.default_journal.as_deref())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let mut out = std::io::stdout().lock();
    let today = Local::now().date_naive();

    match command {
        Commands::Journal(action) => match action {
            JournalAction::New { name } => journal::create(&mut out, &mut db, name)?,
            JournalAction::List { json } => journal::list(&mut out, &db, *json)?,
            JournalAction::Delete { target } => journal::delete(&mut out, &mut db, target)?,
        },
        Commands::Entry(action) => match action {
            EntryAction::Add(fields) => {
                let journal = selected_journal(&cli, &db, &config)?;
                entry::add(&mut out, &mut db, &journal, fields, today)?;
            }
            EntryAction::Edit { id, fields } => entry::edit(&mut out, &mut db, id, fields, today)?,
            EntryAction::Delete { id } => entry::delete(&mut out, &mut db, id)?,
            EntryAction::List { json } => {
                let journal = selected_journal(&cli, &db, &config)?;
                entry::list(&mut out, &db, &journal, *json)?;
            }
        },
        Commands::Waypoint(action) => {
            let journal = selected_journal(&cli, &db, &config);
            match action {
                WaypointAction::Add { name, mile } => {
                    waypoint::add(&mut out, &mut db, &journal?, name, *mile)?;
                }
                WaypointAction::Edit { id, name, mile } => {
                    waypoint::edit(&mut out, &mut db, &journal?, id, name.as_deref(), *mile)?;
                }
                WaypointAction::Delete { id } => waypoint::delete(&mut out, &mut db, id)?,
                WaypointAction::List => waypoint::list(&mut out, &db, &journal?)?,
            }
        }
        Commands::Stats { json } => {
            let journal = selected_journal(&cli, &db, &config)?;
            stats::run(&mut out, &db, &journal, *json)?;
        }
        Commands::Forecast { json } => {
            let journal = selected_journal(&cli, &db, &config)?;
            forecast::run(&mut out, &db, &journal, *json)?;
        }
        Commands::Summary => {
            let journal = selected_journal(&cli, &db, &config)?;
            summary::run(&mut out, &mut db, &journal)?;
        }
    }

    out.flush()?;
    Ok(())
}
