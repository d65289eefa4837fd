//! Table access layer.
//!
//! All reads and writes against the SQLite tables go through here as
//! filter/insert/patch-style calls. No component keeps in-memory
//! ownership of rows across invocations — every job re-fetches what it
//! needs, and writes are last-write-wins.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::{CorrelationRecord, RawItem, ScoreRecord, ScoredItem};

pub async fn insert_item(pool: &SqlitePool, item: &RawItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO items (id, title, description, url, platform, category, discovered_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.title)
    .bind(&item.description)
    .bind(&item.url)
    .bind(&item.platform)
    .bind(&item.category)
    .bind(item.discovered_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Items the scorer has not touched yet, oldest first.
pub async fn unscored_items(pool: &SqlitePool) -> Result<Vec<RawItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, url, platform, category, discovered_at
        FROM items
        WHERE scored_at IS NULL
        ORDER BY discovered_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(raw_item_from_row).collect())
}

/// Writes a full score record. All six columns together, never partial.
pub async fn write_scores(
    pool: &SqlitePool,
    item_id: &str,
    scores: &ScoreRecord,
    scored_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE items SET
            content_quality = ?,
            business_viability = ?,
            market_timing = ?,
            technical_feasibility = ?,
            competitive_advantage = ?,
            overall_score = ?,
            scored_at = ?
        WHERE id = ?
        "#,
    )
    .bind(scores.content_quality)
    .bind(scores.business_viability)
    .bind(scores.market_timing)
    .bind(scores.technical_feasibility)
    .bind(scores.competitive_advantage)
    .bind(scores.overall)
    .bind(scored_at)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Scored items discovered at or after `since_ts`, for clustering.
pub async fn scored_items_since(pool: &SqlitePool, since_ts: i64) -> Result<Vec<ScoredItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, url, platform, category, discovered_at,
               content_quality, business_viability, market_timing,
               technical_feasibility, competitive_advantage, overall_score,
               market_opportunity_score
        FROM items
        WHERE scored_at IS NOT NULL AND discovered_at >= ?
        ORDER BY discovered_at ASC
        "#,
    )
    .bind(since_ts)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(scored_item_from_row).collect())
}

/// Every scored item, best first, for report rollups.
pub async fn all_scored_items(pool: &SqlitePool) -> Result<Vec<ScoredItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, url, platform, category, discovered_at,
               content_quality, business_viability, market_timing,
               technical_feasibility, competitive_advantage, overall_score,
               market_opportunity_score
        FROM items
        WHERE scored_at IS NOT NULL
        ORDER BY overall_score DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(scored_item_from_row).collect())
}

pub async fn insert_correlation(pool: &SqlitePool, record: &CorrelationRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO correlations (id, topic, platforms, platform_count, mention_volume,
            correlation_score, velocity_score, market_opportunity_score, summary,
            member_ids, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.topic)
    .bind(serde_json::to_string(&record.platforms)?)
    .bind(record.platform_count)
    .bind(record.mention_volume)
    .bind(record.correlation_score)
    .bind(record.velocity_score)
    .bind(record.market_opportunity_score)
    .bind(&record.summary)
    .bind(serde_json::to_string(&record.member_ids)?)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Back-patches one member item with its cluster's scores. Overwrite
/// semantics: if a later run reassigns the item, the last cluster wins.
pub async fn patch_item_correlation(
    pool: &SqlitePool,
    item_id: &str,
    record: &CorrelationRecord,
    now: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE items SET
            correlation_topic = ?,
            correlation_score = ?,
            velocity_score = ?,
            market_opportunity_score = ?,
            correlated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.topic)
    .bind(record.correlation_score)
    .bind(record.velocity_score)
    .bind(record.market_opportunity_score)
    .bind(now)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count_high_value(pool: &SqlitePool, min_overall: f64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE overall_score >= ?")
        .bind(min_overall)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Upserts the snapshot row for one calendar date. Rerunning the report
/// job for the same date overwrites the previous snapshot.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_daily_report(
    pool: &SqlitePool,
    report_date: &str,
    total_analyzed: i64,
    top_ideas_json: &str,
    special_mentions_json: &str,
    summary: &str,
    generated_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_reports (report_date, total_analyzed, top_ideas,
            special_mentions, summary, generated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(report_date) DO UPDATE SET
            total_analyzed = excluded.total_analyzed,
            top_ideas = excluded.top_ideas,
            special_mentions = excluded.special_mentions,
            summary = excluded.summary,
            generated_at = excluded.generated_at
        "#,
    )
    .bind(report_date)
    .bind(total_analyzed)
    .bind(top_ideas_json)
    .bind(special_mentions_json)
    .bind(summary)
    .bind(generated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_trend_row(
    pool: &SqlitePool,
    report_date: &str,
    category: &str,
    avg_score: f64,
    item_count: i64,
    top_keywords_json: &str,
    created_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO category_trends (id, report_date, category, avg_score,
            item_count, top_keywords, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(report_date)
    .bind(category)
    .bind(avg_score)
    .bind(item_count)
    .bind(top_keywords_json)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_alert(
    pool: &SqlitePool,
    item_id: &str,
    title: &str,
    overall_score: f64,
    reason: &str,
    created_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts (id, item_id, title, overall_score, reason, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(item_id)
    .bind(title)
    .bind(overall_score)
    .bind(reason)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-platform item counts, for the sources health listing.
pub async fn item_counts_by_platform(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query(
        "SELECT platform, COUNT(*) AS n FROM items GROUP BY platform ORDER BY n DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get::<String, _>("platform"), row.get::<i64, _>("n")))
        .collect())
}

fn raw_item_from_row(row: &sqlx::sqlite::SqliteRow) -> RawItem {
    RawItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        url: row.get("url"),
        platform: row.get("platform"),
        category: row.get("category"),
        discovered_at: row.get("discovered_at"),
    }
}

fn scored_item_from_row(row: &sqlx::sqlite::SqliteRow) -> ScoredItem {
    ScoredItem {
        item: raw_item_from_row(row),
        scores: ScoreRecord {
            content_quality: row.get::<Option<f64>, _>("content_quality").unwrap_or(0.0),
            business_viability: row
                .get::<Option<f64>, _>("business_viability")
                .unwrap_or(0.0),
            market_timing: row.get::<Option<f64>, _>("market_timing").unwrap_or(0.0),
            technical_feasibility: row
                .get::<Option<f64>, _>("technical_feasibility")
                .unwrap_or(0.0),
            competitive_advantage: row
                .get::<Option<f64>, _>("competitive_advantage")
                .unwrap_or(0.0),
            overall: row.get::<Option<f64>, _>("overall_score").unwrap_or(0.0),
        },
        market_opportunity: row.get("market_opportunity_score"),
    }
}
