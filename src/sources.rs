//! Source listing and health overview.
//!
//! `scout sources` prints every configured source with its kind, query
//! count, and credential status, plus per-platform stored item counts
//! when the database is reachable. Gives confidence that collection runs
//! are pulling from the places you expect.

use anyhow::Result;

use crate::config::Config;
use crate::{db, store};

pub async fn list_sources(config: &Config) -> Result<()> {
    println!("Configured sources:");
    if config.sources.is_empty() {
        println!("  (none)");
    }
    for source in &config.sources {
        let key = if source.api_key.is_some() {
            "key set"
        } else {
            "no key"
        };
        println!(
            "  {} [{}] — {} ({} queries, {})",
            source.name,
            source.kind,
            source.endpoint,
            source.queries.len(),
            key
        );
    }

    // Stored item breakdown is best-effort; a missing database just
    // means no sync has run yet.
    match db::connect(config).await {
        Ok(pool) => {
            let counts = store::item_counts_by_platform(&pool).await?;
            if !counts.is_empty() {
                println!();
                println!("Stored items by platform:");
                for (platform, count) in counts {
                    println!("  {}: {}", platform, count);
                }
            }
            pool.close().await;
        }
        Err(e) => {
            eprintln!("sources: database unavailable: {}", e);
        }
    }

    Ok(())
}
