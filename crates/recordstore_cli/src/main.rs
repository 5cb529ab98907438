//! `recordstore` command-line host.
//!
//! Wires the SQLite backend, file logging and configuration to the five
//! record operations.

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::CliConfig;
use recordstore_core::{
    core_version, init_logging, Record, RecordId, RecordStore, SqliteConnectionFactory,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recordstore",
    version = core_version(),
    about = "Create, read, update and delete records through stored procedures"
)]
struct Cli {
    /// SQLite database file (overrides `database` from the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new record and print its id
    Create { message: String },
    /// Print the message stored under an id
    Get { id: RecordId },
    /// Print every record as one JSON object per line
    List,
    /// Replace the message of an existing record
    Update { id: RecordId, message: String },
    /// Delete a record
    Delete { id: RecordId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database = db;
    }
    if let Some(logging) = &config.logging {
        init_logging(logging)
            .map_err(|err| anyhow::anyhow!("Failed to initialize logging: {err}"))?;
    }

    let factory = SqliteConnectionFactory::new(&config.database, &config.procedures);
    let store = RecordStore::new(factory);

    match cli.command {
        Commands::Create { message } => {
            let id = store.create_record(&Record::new(message))?;
            println!("{id}");
        }
        Commands::Get { id } => {
            println!("{}", store.get_record(id)?);
        }
        Commands::List => {
            for record in store.get_records()? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Commands::Update { id, message } => {
            let updated = store.update_record(&Record::with_id(id, message))?;
            if !updated {
                anyhow::bail!("record {id} was not updated");
            }
            println!("updated {id}");
        }
        Commands::Delete { id } => {
            store.delete_record(id)?;
            println!("deleted {id}");
        }
    }

    Ok(())
}
