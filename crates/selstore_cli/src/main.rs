//! selstore CLI
//!
//! Command-line tools for inspecting memoized selector traversals.
//!
//! # Commands
//!
//! - `key` - Print the storage key for a root and selector
//! - `decode-key` - Split a storage key into root CID and selector
//! - `has` - Check whether a traversal is stored
//! - `get` - Replay a stored traversal
//! - `dump` - Decode a raw record log file

mod commands;
mod json;

use clap::{Parser, Subcommand};
use selstore_core::{DAG_CBOR_CODEC, DEFAULT_MAX_FRAME_SIZE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// selstore command-line tools.
#[derive(Parser)]
#[command(name = "selstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the storage key for a root and selector
    Key {
        /// Root CID
        #[arg(short, long)]
        root: String,

        /// Selector as JSON
        #[arg(short, long)]
        selector: String,
    },

    /// Split a hex storage key into root CID and selector
    DecodeKey {
        /// Storage key, hex-encoded
        #[arg(short, long)]
        key: String,

        /// Codec for the rebuilt root CID
        #[arg(short, long, default_value_t = DAG_CBOR_CODEC)]
        codec: u64,
    },

    /// Check whether a traversal is stored
    Has {
        /// Root CID
        #[arg(short, long)]
        root: String,

        /// Selector as JSON
        #[arg(short, long)]
        selector: String,
    },

    /// Replay a stored traversal
    Get {
        /// Root CID
        #[arg(short, long)]
        root: String,

        /// Selector as JSON
        #[arg(short, long)]
        selector: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Decode a raw record log file
    Dump {
        /// File holding the record log
        #[arg(long)]
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Largest frame accepted
        #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
        max_frame_size: usize,
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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Key { root, selector } => {
            commands::key::run(&root, &selector)?;
        }
        Commands::DecodeKey { key, codec } => {
            commands::decode_key::run(&key, codec)?;
        }
        Commands::Has { root, selector } => {
            let path = cli.path.ok_or("Store path required for has")?;
            commands::has::run(&path, &root, &selector)?;
        }
        Commands::Get {
            root,
            selector,
            format,
            limit,
        } => {
            let path = cli.path.ok_or("Store path required for get")?;
            commands::get::run(&path, &root, &selector, &format, limit)?;
        }
        Commands::Dump {
            file,
            format,
            limit,
            max_frame_size,
        } => {
            commands::dump::run(&file, &format, limit, max_frame_size)?;
        }
        Commands::Version => {
            println!("selstore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("selstore core v{}", selstore_core::VERSION);
            println!("key format v{}", selstore_core::KEY_FORMAT_VERSION);
        }
    }

    Ok(())
}
