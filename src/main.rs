//! # Main — CLI Entry Point
//!
//! Routes subcommands to the drill server and database maintenance tasks.
//!
//! ## Subcommands
//!
//! - `serve`: run the HTTP drill server.
//! - `migrate`: create the puzzle/entry/clue tables if missing.
//! - `stats`: print how many puzzles, entries and clues are stored.
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection string.
//!
//! A `.env` file in the working directory is loaded first. `LOG_FORMAT=json`
//! switches logging to JSON lines; `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "xword-drill", about = "Drill crossword clues against their entries")]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the drill web server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
        /// Seconds a session may sit idle before its tally is forgotten
        #[arg(long, env = "XWORD_SESSION_TTL_SECS", default_value_t = 1_209_600)]
        session_ttl_secs: u64,
        /// Apply the schema before serving
        #[arg(long)]
        migrate: bool,
    },
    /// Create the puzzle, entry and clue tables if they do not exist
    Migrate,
    /// Print puzzle, entry and clue counts
    Stats,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    match &cli.command {
        Commands::Serve {
            port,
            bind,
            session_ttl_secs,
            migrate,
        } => rt.block_on(cli::run_serve(
            database_url,
            *bind,
            *port,
            *session_ttl_secs,
            *migrate,
        )),
        Commands::Migrate => rt.block_on(cli::run_migrate(database_url)),
        Commands::Stats => rt.block_on(cli::run_stats(database_url)),
    }
}
