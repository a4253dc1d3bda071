//! CLI tool for creating and editing file-backed record stores.
//!
//! Provides commands for:
//! - Store initialization from a JSON snapshot
//! - Record add/remove/edit/read
//! - Table and record inspection

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use cli::{Cli, Commands};
use record_store_core::config::env_var;
use record_store_core::{FileBackend, IdValue, Record, RecordStore, StoreConfig};

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    let config = load_config(&args)?;
    let backend = FileBackend::new(&config.data_dir)
        .with_retry(config.io_max_retries, config.io_retry_delay_ms);

    match args.command {
        Commands::Init { snapshot } => {
            let init: Value = serde_json::from_str(&snapshot).context("snapshot is not valid JSON")?;
            let store = RecordStore::open(args.store, init, backend, &config)?;
            println!("initialized '{}' with {} table(s)", store.name(), store.table_names()?.len());
        }
        Commands::Add { table, record } => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            store.add(&table, parse_record(&record)?)?;
            println!("added");
        }
        Commands::Remove { table, id } => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            store.remove(&table, &parse_id(&id))?;
            println!("removed");
        }
        Commands::Edit { table, record } => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            store.edit(&table, parse_record(&record)?)?;
            println!("edited");
        }
        Commands::Read { table, id } => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            let record = store.read(&table, &parse_id(&id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Tables => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            for name in store.table_names()? {
                println!("{}", name);
            }
        }
        Commands::Dump { table } => {
            let store = RecordStore::attach(args.store, backend, &config)?;
            for record in store.records(&table)? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }

    Ok(())
}

fn load_config(args: &Cli) -> Result<StoreConfig> {
    layered_config(args, env_var)
}

/// Defaults, then the config file, then environment, then flags.
fn layered_config<F>(args: &Cli, env_lookup: F) -> Result<StoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    config.apply_overrides(env_lookup)?;

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(codec) = &args.codec {
        config.codec = codec.parse()?;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.parse()?;
    }
    tracing::debug!("Using config: {:?}", config);
    Ok(config)
}

fn parse_record(text: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(text).context("record is not valid JSON")?;
    Ok(Record::try_from(value)?)
}

/// Ids are JSON when they parse as JSON (`7`, `"7"`), otherwise bare strings.
fn parse_id(text: &str) -> IdValue {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
