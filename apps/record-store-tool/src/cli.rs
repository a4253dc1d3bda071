use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory holding store files (overrides config)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Store name, used as the backend key
    #[arg(short, long, default_value = "database")]
    pub store: String,

    /// Snapshot codec: json or base64 (overrides config)
    #[arg(long)]
    pub codec: Option<String>,

    /// Log level: 0 silent, 1 errors, 2 errors and traces (overrides config)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store from a JSON snapshot, replacing any stored data
    Init {
        /// Snapshot object, e.g. '{"users": []}'
        snapshot: String,
    },

    /// Append a record to a table
    Add {
        table: String,
        /// Record object with a unique "id"
        record: String,
    },

    /// Delete a record by id
    Remove { table: String, id: String },

    /// Replace the record with the same id
    Edit {
        table: String,
        /// Record object with an existing "id"
        record: String,
    },

    /// Print a record by id
    Read { table: String, id: String },

    /// List table names
    Tables,

    /// Print every record of a table
    Dump { table: String },
}
