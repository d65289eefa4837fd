//! Core data models used throughout Signal Scout.
//!
//! These types represent the raw mentions, score records, clusters, and
//! report rows that flow through the collection and correlation pipeline.

use serde::Serialize;

/// A candidate startup-idea mention collected from one external source.
///
/// Items have no stable external identity; deduplication keys on exact
/// title (falling back to URL). Items are never deleted — the scorer and
/// aggregator patch derived columns in place.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub platform: String,
    pub category: Option<String>,
    pub discovered_at: i64,
}

/// Multi-factor relevance scores for one item, each in [0, 1].
///
/// Written all-at-once: a score record is never partially updated.
/// `overall` is always the fixed weighted sum of the five sub-scores
/// (see [`crate::scoring::SCORE_WEIGHTS`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRecord {
    pub content_quality: f64,
    pub business_viability: f64,
    pub market_timing: f64,
    pub technical_feasibility: f64,
    pub competitive_advantage: f64,
    pub overall: f64,
}

/// An item together with its score record, as read back from storage
/// for clustering and reporting.
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub item: RawItem,
    pub scores: ScoreRecord,
    /// Market-opportunity score patched in by the aggregator, when the
    /// item has been part of a correlated cluster.
    pub market_opportunity: Option<f64>,
}

/// A transient group of similar items representing one cross-platform
/// trend. Never persisted directly — only its derived
/// [`CorrelationRecord`] is.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub topic: String,
    pub members: Vec<ScoredItem>,
    /// Distinct platforms among members, in first-seen order.
    pub platforms: Vec<String>,
}

/// Persisted summary statistics for one cluster.
#[derive(Debug, Clone)]
pub struct CorrelationRecord {
    pub id: String,
    pub topic: String,
    pub platforms: Vec<String>,
    pub platform_count: i64,
    pub mention_volume: i64,
    pub correlation_score: f64,
    pub velocity_score: f64,
    pub market_opportunity_score: f64,
    pub summary: String,
    pub member_ids: Vec<String>,
    pub created_at: i64,
}

/// One ranked entry in a daily report's top-N or special-mention list.
#[derive(Debug, Clone, Serialize)]
pub struct RankedIdea {
    pub rank: usize,
    pub id: String,
    pub title: String,
    pub platform: String,
    pub overall_score: f64,
    pub market_opportunity_score: Option<f64>,
}

/// Counters returned by a collection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectOutcome {
    pub collected: u64,
    pub duplicates_skipped: u64,
    pub errors: Vec<String>,
}

/// Counters returned by a full engine run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineOutcome {
    pub collected: u64,
    pub duplicates_skipped: u64,
    pub processed: u64,
    pub correlations_found: u64,
    pub velocity_analyzed: u64,
    pub filtered_high_value: u64,
    pub errors: Vec<String>,
}

/// Summary returned by the daily report job.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub report_date: String,
    pub top_ideas_count: usize,
    pub special_mentions_count: usize,
    pub total_analyzed: i64,
}

/// Pipeline variant selecting thresholds and weights.
///
/// The two variants share one parameterized pipeline; they differ only in
/// the constants below. `Professional` is the stricter, business-keyword
/// weighted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Basic,
    Professional,
}

impl Variant {
    /// Score added per matched keyword in each sub-score.
    pub fn keyword_increment(&self) -> f64 {
        match self {
            Variant::Basic => 0.10,
            Variant::Professional => 0.15,
        }
    }

    /// Acceptance threshold for delegated pairwise similarity.
    pub fn similarity_threshold(&self) -> f64 {
        match self {
            Variant::Basic => 0.70,
            Variant::Professional => 0.75,
        }
    }

    /// Minimum distinct platforms for a cluster to be retained.
    pub fn min_platforms(&self) -> usize {
        match self {
            Variant::Basic => 1,
            Variant::Professional => 2,
        }
    }

    /// Platform count at which correlation_score saturates at 1.0.
    pub fn platform_cap(&self) -> usize {
        match self {
            Variant::Basic => 3,
            Variant::Professional => 4,
        }
    }

    /// Whether velocity is multiplied by the cluster's mean quality.
    pub fn weighs_quality(&self) -> bool {
        matches!(self, Variant::Professional)
    }
}
