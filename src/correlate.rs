//! Cluster aggregation: correlation, velocity, and market opportunity.
//!
//! Turns one transient cluster into a persisted [`CorrelationRecord`] and
//! back-patches every member item with the cluster's scores. The record
//! itself is persisted even when member patching partially fails; patch
//! failures are logged and reported as component-scoped error strings.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::keywords;
use crate::llm::LlmClient;
use crate::models::{Cluster, CorrelationRecord, ScoredItem, Variant};
use crate::store;

/// Rolling windows for the velocity computation, as (window seconds,
/// weight) pairs. Weights sum to 1.0.
const VELOCITY_WINDOWS: [(i64, f64); 3] = [
    (24 * 3600, 0.5),
    (48 * 3600, 0.3),
    (7 * 24 * 3600, 0.2),
];

/// Volume at which the market-opportunity volume ratio saturates.
const VOLUME_CAP: f64 = 10.0;

/// Business-keyword hits per member at which keyword density saturates.
const DENSITY_CAP: f64 = 5.0;

/// Builds the correlation record for one qualifying cluster.
pub fn aggregate_cluster(
    variant: Variant,
    cluster: &Cluster,
    summary: String,
    now: i64,
) -> CorrelationRecord {
    let platform_count = cluster.platforms.len();
    let cap = variant.platform_cap();
    let correlation_score = (platform_count as f64 / cap as f64).min(1.0);

    CorrelationRecord {
        id: uuid::Uuid::new_v4().to_string(),
        topic: cluster.topic.clone(),
        platforms: cluster.platforms.clone(),
        platform_count: platform_count as i64,
        mention_volume: cluster.members.len() as i64,
        correlation_score,
        velocity_score: velocity_score(variant, &cluster.members, now),
        market_opportunity_score: market_opportunity_score(variant, cluster),
        summary,
        member_ids: cluster.members.iter().map(|m| m.item.id.clone()).collect(),
        created_at: now,
    }
}

/// Time-decayed momentum: the weighted share of members falling inside
/// each rolling window. An empty member set yields 0.0, never NaN.
/// The professional variant multiplies by the cluster's mean quality.
pub fn velocity_score(variant: Variant, members: &[ScoredItem], now: i64) -> f64 {
    if members.is_empty() {
        return 0.0;
    }

    let total = members.len() as f64;
    let mut score = 0.0;
    for (window, weight) in VELOCITY_WINDOWS {
        let within = members
            .iter()
            .filter(|m| now - m.item.discovered_at <= window)
            .count();
        score += weight * (within as f64 / total);
    }

    if variant.weighs_quality() {
        score *= mean_quality(members);
    }

    score.clamp(0.0, 1.0)
}

/// Mean overall relevance across members; 0.0 for an empty set.
pub fn mean_quality(members: &[ScoredItem]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(|m| m.scores.overall).sum::<f64>() / members.len() as f64
}

/// Weighted blend of platform diversity, capped volume, average member
/// quality, and business-keyword density.
fn market_opportunity_score(variant: Variant, cluster: &Cluster) -> f64 {
    let platform_ratio =
        (cluster.platforms.len() as f64 / variant.platform_cap() as f64).min(1.0);
    let volume_ratio = (cluster.members.len() as f64 / VOLUME_CAP).min(1.0);
    let quality = mean_quality(&cluster.members);
    let density = keyword_density(&cluster.members);

    let score = 0.35 * platform_ratio + 0.25 * volume_ratio + 0.25 * quality + 0.15 * density;
    score.clamp(0.0, 1.0)
}

/// Average business-keyword hits per member, normalized by
/// [`DENSITY_CAP`].
fn keyword_density(members: &[ScoredItem]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let total_hits: usize = members
        .iter()
        .map(|m| {
            keywords::extract_business_keywords(&format!(
                "{} {}",
                m.item.title, m.item.description
            ))
            .len()
        })
        .sum();

    (total_hits as f64 / members.len() as f64 / DENSITY_CAP).min(1.0)
}

/// Summary text for the record: delegated when a completion client is
/// available, otherwise a template over the aggregate numbers.
pub async fn summarize(llm: Option<&LlmClient>, cluster: &Cluster) -> String {
    if let Some(client) = llm {
        let titles: Vec<&str> = cluster
            .members
            .iter()
            .map(|m| m.item.title.as_str())
            .collect();
        let prompt = format!(
            "Summarize in one sentence why this group of startup-idea \
             mentions might represent a market trend.\n\nTopic: {}\n{}",
            cluster.topic,
            titles.join("\n")
        );
        match client.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
            Ok(_) => eprintln!("correlate: empty delegated summary for '{}'", cluster.topic),
            Err(e) => eprintln!(
                "correlate: delegated summary failed for '{}': {}",
                cluster.topic, e
            ),
        }
    }

    format!(
        "{} mentions across {} platforms around '{}'",
        cluster.members.len(),
        cluster.platforms.len(),
        cluster.topic
    )
}

/// Persists the record, then back-patches each member item.
///
/// Returns the number of members patched plus error strings for the ones
/// that failed. The record insert happens first so a partial patching
/// failure never loses the correlation itself.
pub async fn persist_with_patches(
    pool: &SqlitePool,
    record: &CorrelationRecord,
    now: i64,
) -> Result<(u64, Vec<String>)> {
    store::insert_correlation(pool, record).await?;

    let mut patched = 0u64;
    let mut errors = Vec::new();
    for member_id in &record.member_ids {
        match store::patch_item_correlation(pool, member_id, record, now).await {
            Ok(()) => patched += 1,
            Err(e) => {
                eprintln!(
                    "correlate: failed to patch item {} for '{}': {}",
                    member_id, record.topic, e
                );
                errors.push(format!("correlate: {}", e));
            }
        }
    }

    Ok((patched, errors))
}
