use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create items table. Titles and URLs are deliberately not UNIQUE:
    // deduplication is an explicit read-then-write check in the pipeline
    // (see crate::dedup), and the table records whatever that check let
    // through.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL,
            platform TEXT NOT NULL,
            category TEXT,
            discovered_at INTEGER NOT NULL,
            content_quality REAL,
            business_viability REAL,
            market_timing REAL,
            technical_feasibility REAL,
            competitive_advantage REAL,
            overall_score REAL,
            scored_at INTEGER,
            correlation_topic TEXT,
            correlation_score REAL,
            velocity_score REAL,
            market_opportunity_score REAL,
            correlated_at INTEGER
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create correlations table (insert-only; one row per qualifying
    // cluster per run)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS correlations (
            id TEXT PRIMARY KEY,
            topic TEXT NOT NULL,
            platforms TEXT NOT NULL,
            platform_count INTEGER NOT NULL,
            mention_volume INTEGER NOT NULL,
            correlation_score REAL NOT NULL,
            velocity_score REAL NOT NULL,
            market_opportunity_score REAL NOT NULL,
            summary TEXT NOT NULL,
            member_ids TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create daily reports table (upsert-by-date)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_reports (
            report_date TEXT PRIMARY KEY,
            total_analyzed INTEGER NOT NULL,
            top_ideas TEXT NOT NULL,
            special_mentions TEXT NOT NULL,
            summary TEXT NOT NULL,
            generated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create category trend rows table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS category_trends (
            id TEXT PRIMARY KEY,
            report_date TEXT NOT NULL,
            category TEXT NOT NULL,
            avg_score REAL NOT NULL,
            item_count INTEGER NOT NULL,
            top_keywords TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create alerts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL,
            title TEXT NOT NULL,
            overall_score REAL NOT NULL,
            reason TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_title ON items(title)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_url ON items(url)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_discovered_at ON items(discovered_at DESC)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_overall_score ON items(overall_score DESC)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_category_trends_date ON category_trends(report_date)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
