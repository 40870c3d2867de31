//! # CLI Execution Functions
//!
//! Execution logic for each subcommand, kept out of `main.rs`.

use anyhow::Result;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use xword_drill::db::{ClueStore, Database};
use xword_drill::web::{self, ServeConfig};

pub async fn run_serve(
    database_url: &str,
    bind: IpAddr,
    port: u16,
    session_ttl_secs: u64,
    migrate: bool,
) -> Result<()> {
    let database = Database::connect(database_url).await?;
    if migrate {
        database.migrate().await?;
        info!("schema applied");
    }
    let counts = database.counts().await?;
    if counts.clues == 0 {
        tracing::warn!("no clues loaded; drill pages will return 404");
    } else {
        info!(clues = counts.clues, puzzles = counts.puzzles, "clue store ready");
    }

    let config = ServeConfig {
        bind,
        port,
        session_ttl: Duration::from_secs(session_ttl_secs),
    };
    let store: Arc<dyn ClueStore> = Arc::new(database);
    web::run(store, &config).await
}

pub async fn run_migrate(database_url: &str) -> Result<()> {
    let database = Database::connect(database_url).await?;
    database.migrate().await?;
    info!("schema applied");
    print_counts(&database).await
}

pub async fn run_stats(database_url: &str) -> Result<()> {
    let database = Database::connect(database_url).await?;
    print_counts(&database).await
}

async fn print_counts(database: &Database) -> Result<()> {
    let counts = database.counts().await?;
    println!("puzzles: {}", counts.puzzles);
    println!("entries: {}", counts.entries);
    println!("clues:   {}", counts.clues);
    Ok(())
}
