//! # Folio CLI
//!
//! Command-line interface for the Folio book catalog.
//!
//! ## Commands
//!
//! - `folio demo` - Run a scripted walkthrough on a small sample shelf
//! - `folio query <collection> <pattern>` - Search a collection manifest
//!
//! ## Example Usage
//!
//! ```bash
//! # See the catalog operations in action
//! folio demo
//!
//! # Search a collection for fuzzy title/author matches
//! folio query shelf.json "left hand of darkness"
//!
//! # Same search against the linear reference engine, as JSON
//! folio query shelf.json "le guin" --engine linear --output json
//! ```

mod collection;
mod commands;

use clap::{Parser, Subcommand};
use folio_core::Engine;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Folio - Fast book catalog search
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted walkthrough of buy/checkout/find on sample books
    Demo,

    /// Search a collection manifest for matching books
    Query {
        /// Path to a JSON collection manifest
        collection: PathBuf,

        /// Fuzzy search text, matched against titles and authors
        pattern: String,

        /// Maximum number of results to show
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Catalog engine to use (overrides the config file)
        #[arg(short, long)]
        engine: Option<Engine>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => folio_core::Config::load_from(path)?,
        None => folio_core::Config::load()?,
    };

    // Execute command
    match cli.command {
        Commands::Demo => commands::demo::run(config),
        Commands::Query {
            collection,
            pattern,
            limit,
            engine,
            output,
        } => commands::query::run(config, &collection, &pattern, limit, engine, output),
    }
}
