//! Daily report rollup.
//!
//! Selects the top-N scored items, a secondary special-mention set, and
//! summary statistics, then upserts one snapshot row per calendar date.
//! Rerunning for the same date overwrites the previous snapshot. The
//! side-effect writes (per-category trend rows, high-score alerts) are
//! individually non-fatal: a failure there is logged and the primary
//! snapshot still lands.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::keywords;
use crate::models::{RankedIdea, ReportOutcome, ScoredItem};
use crate::store;

const TREND_KEYWORDS: usize = 3;
const UNCATEGORIZED: &str = "uncategorized";

pub async fn generate_daily_report(
    config: &Config,
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<ReportOutcome> {
    let report_date = date.format("%Y-%m-%d").to_string();
    let now = chrono::Utc::now().timestamp();

    // all_scored_items returns best-first
    let items = store::all_scored_items(pool).await?;
    let total_analyzed = items.len() as i64;

    let top: Vec<RankedIdea> = items
        .iter()
        .take(config.reports.top_n)
        .enumerate()
        .map(|(i, item)| ranked(i + 1, item))
        .collect();
    let top_ids: HashSet<&str> = top.iter().map(|r| r.id.as_str()).collect();

    // Special mentions: strong market signal without cracking the top-N
    let special: Vec<RankedIdea> = items
        .iter()
        .filter(|item| {
            item.market_opportunity.unwrap_or(0.0) >= config.reports.special_market_min
                && item.scores.overall >= config.reports.special_overall_min
                && !top_ids.contains(item.item.id.as_str())
        })
        .enumerate()
        .map(|(i, item)| ranked(i + 1, item))
        .collect();

    let summary = summary_text(&report_date, &items);

    store::upsert_daily_report(
        pool,
        &report_date,
        total_analyzed,
        &serde_json::to_string(&top)?,
        &serde_json::to_string(&special)?,
        &summary,
        now,
    )
    .await?;

    // Per-category trend rows — non-fatal
    if let Err(e) = write_trend_rows(pool, &report_date, &items, now).await {
        eprintln!("report {}: trend rows failed: {}", report_date, e);
    }

    // High-score alerts for the top set — non-fatal
    for idea in &top {
        if idea.overall_score >= config.reports.alert_min {
            let reason = format!("overall score {:.2} at rank {}", idea.overall_score, idea.rank);
            if let Err(e) =
                store::insert_alert(pool, &idea.id, &idea.title, idea.overall_score, &reason, now)
                    .await
            {
                eprintln!("report {}: alert for {} failed: {}", report_date, idea.id, e);
            }
        }
    }

    println!("report {}", report_date);
    println!("  analyzed: {} items", total_analyzed);
    println!("  top ideas: {}", top.len());
    println!("  special mentions: {}", special.len());
    println!("ok");

    Ok(ReportOutcome {
        report_date,
        top_ideas_count: top.len(),
        special_mentions_count: special.len(),
        total_analyzed,
    })
}

fn ranked(rank: usize, item: &ScoredItem) -> RankedIdea {
    RankedIdea {
        rank,
        id: item.item.id.clone(),
        title: item.item.title.clone(),
        platform: item.item.platform.clone(),
        overall_score: item.scores.overall,
        market_opportunity_score: item.market_opportunity,
    }
}

fn summary_text(report_date: &str, items: &[ScoredItem]) -> String {
    if items.is_empty() {
        return format!("No scored items as of {}.", report_date);
    }

    let avg: f64 = items.iter().map(|i| i.scores.overall).sum::<f64>() / items.len() as f64;

    let mut category_counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let category = item.item.category.as_deref().unwrap_or(UNCATEGORIZED);
        *category_counts.entry(category).or_insert(0) += 1;
    }
    let dominant = category_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(category, _)| *category)
        .unwrap_or(UNCATEGORIZED);

    format!(
        "Analyzed {} ideas as of {}: average relevance {:.2}, dominant category '{}'.",
        items.len(),
        report_date,
        avg,
        dominant
    )
}

async fn write_trend_rows(
    pool: &SqlitePool,
    report_date: &str,
    items: &[ScoredItem],
    now: i64,
) -> Result<()> {
    let mut by_category: HashMap<&str, Vec<&ScoredItem>> = HashMap::new();
    for item in items {
        by_category
            .entry(item.item.category.as_deref().unwrap_or(UNCATEGORIZED))
            .or_default()
            .push(item);
    }

    for (category, members) in by_category {
        let avg: f64 =
            members.iter().map(|m| m.scores.overall).sum::<f64>() / members.len() as f64;
        let texts: Vec<String> = members
            .iter()
            .map(|m| format!("{} {}", m.item.title, m.item.description))
            .collect();
        let top_keywords =
            keywords::top_keywords(texts.iter().map(|t| t.as_str()), TREND_KEYWORDS);

        store::insert_trend_row(
            pool,
            report_date,
            category,
            avg,
            members.len() as i64,
            &serde_json::to_string(&top_keywords)?,
            now,
        )
        .await?;
    }

    Ok(())
}
