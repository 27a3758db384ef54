//! ldbridge CLI
//!
//! Command-line tools for databases written through the JNI bridge.
//!
//! # Commands
//!
//! - `scan` - List entries in key order
//! - `get` / `put` / `delete` - Single-key access
//! - `repair` - Rebuild a damaged database
//! - `destroy` - Remove a database and all its files

mod commands;

use clap::{Parser, Subcommand};
use commands::Encoding;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ldbridge command-line database tools.
#[derive(Parser)]
#[command(name = "ldbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Read and print keys and values as hex
    #[arg(global = true, long)]
    hex: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries in key order
    Scan {
        /// Start at the first key at or after this one
        #[arg(short, long)]
        from: Option<String>,

        /// Maximum number of entries to list
        #[arg(short, long)]
        limit: Option<usize>,

        /// Walk from the last key backwards
        #[arg(short, long)]
        reverse: bool,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print the value stored under a key
    Get {
        /// Key to read
        key: String,
    },

    /// Store a value under a key
    Put {
        /// Key to write
        key: String,

        /// Value to store
        value: String,

        /// Flush the write durably before returning
        #[arg(short, long)]
        sync: bool,
    },

    /// Remove a key
    Delete {
        /// Key to remove
        key: String,

        /// Flush the write durably before returning
        #[arg(short, long)]
        sync: bool,
    },

    /// Rebuild a damaged database from its surviving files
    Repair,

    /// Remove a database and all its files
    Destroy {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let encoding = if cli.hex { Encoding::Hex } else { Encoding::Utf8 };

    match cli.command {
        Commands::Scan {
            from,
            limit,
            reverse,
            format,
        } => {
            let path = cli.path.ok_or("Database path required for scan")?;
            let from = from.map(|key| encoding.decode(&key)).transpose()?;
            let options = commands::scan::ScanOptions {
                from,
                limit,
                reverse,
            };
            commands::scan::run(&path, &options, encoding, &format)?;
        }
        Commands::Get { key } => {
            let path = cli.path.ok_or("Database path required for get")?;
            commands::get::run(&path, &encoding.decode(&key)?, encoding)?;
        }
        Commands::Put { key, value, sync } => {
            let path = cli.path.ok_or("Database path required for put")?;
            let key = encoding.decode(&key)?;
            let value = encoding.decode(&value)?;
            commands::write::put(&path, &key, &value, sync)?;
        }
        Commands::Delete { key, sync } => {
            let path = cli.path.ok_or("Database path required for delete")?;
            commands::write::delete(&path, &encoding.decode(&key)?, sync)?;
        }
        Commands::Repair => {
            let path = cli.path.ok_or("Database path required for repair")?;
            commands::maintenance::repair(&path)?;
        }
        Commands::Destroy { yes } => {
            let path = cli.path.ok_or("Database path required for destroy")?;
            if !yes {
                return Err("Refusing to destroy without --yes".into());
            }
            commands::maintenance::destroy(&path)?;
        }
        Commands::Version => {
            println!("ldbridge CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ldbridge core v{}", ldbridge_core::VERSION);
        }
    }

    Ok(())
}
