//! Pipeline orchestration.
//!
//! The two batch jobs: `run_collect` (sources → dedup → storage) and
//! `run_engine` (collect, then score, cluster, and correlate). Both are
//! stateless: every invocation re-reads what it needs from storage, and
//! overlapping scheduled runs interleave last-write-wins.
//!
//! Failure policy throughout: a per-source or per-item failure is logged,
//! recorded as a `"<source>: <message>"` string in the outcome's errors
//! list, and skipped. Only configuration failures abort a run.

use anyhow::{bail, Result};
use sqlx::SqlitePool;

use crate::cluster::{self, Delegated, KeywordOverlap, SimilarityStrategy};
use crate::config::{Config, SourceConfig};
use crate::models::{CollectOutcome, EngineOutcome, RawItem};
use crate::{collector_codehost, collector_forum, collector_websearch};
use crate::{correlate, dedup, llm::LlmClient, scoring, store};

/// Collects from every configured source, deduplicates, and persists.
pub async fn run_collect(config: &Config, pool: &SqlitePool) -> Result<CollectOutcome> {
    let mut outcome = CollectOutcome::default();

    for source in &config.sources {
        let (items, errors) = match collect_source(source).await {
            Ok(result) => result,
            Err(e) => {
                // Total source failure (bad config, client construction):
                // record and move to the next source.
                eprintln!("collect {}: {}", source.name, e);
                outcome.errors.push(format!("{}: {}", source.name, e));
                continue;
            }
        };
        outcome.errors.extend(errors);

        for item in items {
            match persist_if_new(pool, &item).await {
                Ok(true) => outcome.collected += 1,
                Ok(false) => outcome.duplicates_skipped += 1,
                Err(e) => {
                    eprintln!("collect {}: insert '{}' failed: {}", source.name, item.title, e);
                    outcome.errors.push(format!("{}: {}", source.name, e));
                }
            }
        }
    }

    println!("collect");
    println!("  collected: {} items", outcome.collected);
    println!("  duplicates skipped: {}", outcome.duplicates_skipped);
    println!("  errors: {}", outcome.errors.len());
    println!("ok");

    Ok(outcome)
}

async fn collect_source(source: &SourceConfig) -> Result<(Vec<RawItem>, Vec<String>)> {
    match source.kind.as_str() {
        "forum" => collector_forum::collect(source).await,
        "codehost" => collector_codehost::collect(source).await,
        "websearch" => collector_websearch::collect(source).await,
        other => bail!("unknown source kind '{}'", other),
    }
}

async fn persist_if_new(pool: &SqlitePool, item: &RawItem) -> Result<bool> {
    if dedup::is_duplicate(pool, item).await? {
        return Ok(false);
    }
    store::insert_item(pool, item).await?;
    Ok(true)
}

/// The full intelligence run: collect, score, cluster, correlate.
pub async fn run_engine(
    config: &Config,
    pool: &SqlitePool,
    manual_trigger: bool,
) -> Result<EngineOutcome> {
    let variant = config.scoring.variant();
    let llm = LlmClient::from_config(&config.llm)?;
    let mut outcome = EngineOutcome::default();

    // Phase 1: collection
    let collected = run_collect(config, pool).await?;
    outcome.collected = collected.collected;
    outcome.duplicates_skipped = collected.duplicates_skipped;
    outcome.errors.extend(collected.errors);

    // Phase 2: score everything the scorer has not touched yet
    let unscored = store::unscored_items(pool).await?;
    for item in &unscored {
        let heuristic = scoring::score_item(variant, item);
        let scores = match llm {
            Some(ref client) => scoring::refine_with_llm(client, item, heuristic).await,
            None => heuristic,
        };
        let now = chrono::Utc::now().timestamp();
        match store::write_scores(pool, &item.id, &scores, now).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                eprintln!("score: write for '{}' failed: {}", item.title, e);
                outcome.errors.push(format!("score: {}", e));
            }
        }
    }

    // Phase 3: cluster the look-back window and persist correlations
    let now = chrono::Utc::now().timestamp();
    let since = now - config.clustering.lookback_days * 24 * 3600;
    let window = store::scored_items_since(pool, since).await?;

    let strategy: Box<dyn SimilarityStrategy> =
        match (config.clustering.strategy.as_str(), llm.clone()) {
            ("delegated", Some(client)) => Box::new(Delegated::new(client, variant)),
            ("delegated", None) => {
                // load_config rejects this combination; hand-built configs
                // fall back rather than abort the whole run.
                eprintln!("cluster: delegated strategy without llm, using keyword overlap");
                Box::new(KeywordOverlap)
            }
            _ => Box::new(KeywordOverlap),
        };

    let clusters = cluster::cluster_items(variant, strategy.as_ref(), llm.as_ref(), window).await;

    for cluster in &clusters {
        let summary = correlate::summarize(llm.as_ref(), cluster).await;
        let record = correlate::aggregate_cluster(variant, cluster, summary, now);

        match correlate::persist_with_patches(pool, &record, now).await {
            Ok((_patched, patch_errors)) => {
                outcome.correlations_found += 1;
                outcome.velocity_analyzed += 1;
                outcome.errors.extend(patch_errors);
            }
            Err(e) => {
                eprintln!("correlate: persist '{}' failed: {}", record.topic, e);
                outcome.errors.push(format!("correlate: {}", e));
            }
        }
    }

    finish_engine(config, pool, manual_trigger, outcome).await
}

async fn finish_engine(
    config: &Config,
    pool: &SqlitePool,
    manual_trigger: bool,
    mut outcome: EngineOutcome,
) -> Result<EngineOutcome> {
    outcome.filtered_high_value =
        store::count_high_value(pool, config.reports.high_value_min).await? as u64;

    println!(
        "engine ({})",
        if manual_trigger { "manual" } else { "scheduled" }
    );
    println!("  collected: {}", outcome.collected);
    println!("  processed: {}", outcome.processed);
    println!("  correlations found: {}", outcome.correlations_found);
    println!("  velocity analyzed: {}", outcome.velocity_analyzed);
    println!("  high value: {}", outcome.filtered_high_value);
    println!("  errors: {}", outcome.errors.len());
    println!("ok");

    Ok(outcome)
}
