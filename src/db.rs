//! SQLite connection pool.
//!
//! One pool per job invocation, built from `[db]` configuration: the
//! parent directory is created on demand, the database file is created if
//! missing, and the journal mode and pool size come from [`DbConfig`]
//! rather than being baked in. Jobs borrow the pool and close it when the
//! command finishes.
//!
//! [`DbConfig`]: crate::config::DbConfig

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db = &config.db;

    if let Some(parent) = db.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path.display()))?
        .create_if_missing(true)
        .journal_mode(journal_mode(&db.journal_mode));

    let pool = SqlitePoolOptions::new()
        .max_connections(db.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

fn journal_mode(name: &str) -> SqliteJournalMode {
    // Validated in load_config; unknown values never reach here.
    match name {
        "delete" => SqliteJournalMode::Delete,
        "memory" => SqliteJournalMode::Memory,
        _ => SqliteJournalMode::Wal,
    }
}
