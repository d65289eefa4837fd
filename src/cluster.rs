//! Similarity-based topic clustering.
//!
//! Groups a batch of recently scored items into clusters by greedy
//! single-pass assignment: each unassigned seed collects every remaining
//! item the similarity strategy accepts, assigned items leave the pool,
//! and there is no reassignment or refinement afterwards. Cluster order
//! is first-seed-first and not otherwise deterministic; clusters are
//! independent aggregation units, not a ranked list.
//!
//! The pairwise similarity decision sits behind [`SimilarityStrategy`] so
//! a refinement pass or a new strategy can be added without touching the
//! engine's call sites.

use async_trait::async_trait;

use crate::keywords;
use crate::llm::{self, LlmClient, ScoreParse};
use crate::models::{Cluster, ScoredItem, Variant};

/// A cluster is never retained with fewer members than this.
pub const MIN_CLUSTER_MEMBERS: usize = 2;

/// Keyword strategy: minimum common-keyword share of the larger set.
const OVERLAP_MIN_RATIO: f64 = 0.3;
/// Keyword strategy: minimum raw common-keyword count.
const OVERLAP_MIN_COMMON: usize = 2;

/// Keyword count used for keyword-derived topic labels.
const TOPIC_KEYWORDS: usize = 3;

/// Label used when no keywords overlap and no delegated label arrives.
const FALLBACK_TOPIC: &str = "emerging trend";

fn item_keywords(scored: &ScoredItem) -> Vec<&'static str> {
    let text = format!("{} {}", scored.item.title, scored.item.description);
    keywords::extract_business_keywords(&text)
}

/// Pairwise similarity decision between a cluster seed and a candidate.
#[async_trait]
pub trait SimilarityStrategy: Send + Sync {
    async fn similar(&self, seed: &ScoredItem, candidate: &ScoredItem) -> bool;
}

/// Similarity by curated business-keyword overlap.
///
/// Two items are similar when the keywords they share cover at least
/// [`OVERLAP_MIN_RATIO`] of the larger keyword set and number at least
/// [`OVERLAP_MIN_COMMON`].
pub struct KeywordOverlap;

#[async_trait]
impl SimilarityStrategy for KeywordOverlap {
    async fn similar(&self, seed: &ScoredItem, candidate: &ScoredItem) -> bool {
        let a = item_keywords(seed);
        let b = item_keywords(candidate);
        if a.is_empty() || b.is_empty() {
            return false;
        }

        let common = a.iter().filter(|k| b.contains(k)).count();
        let ratio = common as f64 / a.len().max(b.len()) as f64;

        common >= OVERLAP_MIN_COMMON && ratio >= OVERLAP_MIN_RATIO
    }
}

/// Similarity by one delegated pairwise scoring call per candidate.
///
/// The completion service is expected to return a bare float in [0, 1];
/// an unparseable or failed response means "not similar" (logged, never
/// propagated).
pub struct Delegated {
    llm: LlmClient,
    threshold: f64,
}

impl Delegated {
    pub fn new(llm: LlmClient, variant: Variant) -> Self {
        Self {
            llm,
            threshold: variant.similarity_threshold(),
        }
    }
}

#[async_trait]
impl SimilarityStrategy for Delegated {
    async fn similar(&self, seed: &ScoredItem, candidate: &ScoredItem) -> bool {
        let prompt = format!(
            "Rate how similar these two startup ideas are, 0.0-1.0. \
             Respond with one number and nothing else.\n\n\
             A: {} — {}\nB: {} — {}",
            seed.item.title, seed.item.description, candidate.item.title, candidate.item.description
        );

        let output = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!(
                    "cluster: delegated similarity failed for '{}': {}",
                    candidate.item.title, e
                );
                return false;
            }
        };

        match llm::parse_similarity(&output) {
            ScoreParse::Parsed(values) => values[0] > self.threshold,
            ScoreParse::Failed(reason) => {
                eprintln!(
                    "cluster: unusable similarity response for '{}': {}",
                    candidate.item.title, reason
                );
                false
            }
        }
    }
}

/// Clusters a batch of scored items.
///
/// Clusters with fewer than [`MIN_CLUSTER_MEMBERS`] members are
/// discarded, as are clusters spanning fewer distinct platforms than the
/// variant requires. Topic labels come from `label_cluster`.
pub async fn cluster_items(
    variant: Variant,
    strategy: &dyn SimilarityStrategy,
    llm: Option<&LlmClient>,
    items: Vec<ScoredItem>,
) -> Vec<Cluster> {
    let mut remaining = items;
    let mut clusters = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut members = vec![seed];

        let mut rest = Vec::with_capacity(remaining.len());
        for candidate in remaining {
            if strategy.similar(&members[0], &candidate).await {
                members.push(candidate);
            } else {
                rest.push(candidate);
            }
        }
        remaining = rest;

        if members.len() < MIN_CLUSTER_MEMBERS {
            continue;
        }

        let platforms = distinct_platforms(&members);
        if platforms.len() < variant.min_platforms() {
            continue;
        }

        let topic = label_cluster(llm, &members).await;
        clusters.push(Cluster {
            topic,
            members,
            platforms,
        });
    }

    clusters
}

/// Distinct member platforms in first-seen order.
pub fn distinct_platforms(members: &[ScoredItem]) -> Vec<String> {
    let mut platforms: Vec<String> = Vec::new();
    for member in members {
        if !platforms.contains(&member.item.platform) {
            platforms.push(member.item.platform.clone());
        }
    }
    platforms
}

/// Topic label from the most frequent business keywords across members.
pub fn keyword_topic(members: &[ScoredItem]) -> Option<String> {
    let texts: Vec<String> = members
        .iter()
        .map(|m| format!("{} {}", m.item.title, m.item.description))
        .collect();
    let top = keywords::top_keywords(texts.iter().map(|t| t.as_str()), TOPIC_KEYWORDS);
    if top.is_empty() {
        None
    } else {
        Some(top.join(" + "))
    }
}

/// Labels a cluster: a delegated 2–4 word label when a completion client
/// is available, otherwise (or on any failure) the keyword topic, and
/// finally a generic placeholder.
pub async fn label_cluster(llm: Option<&LlmClient>, members: &[ScoredItem]) -> String {
    if let Some(client) = llm {
        let titles: Vec<&str> = members.iter().map(|m| m.item.title.as_str()).collect();
        let prompt = format!(
            "Give a 2-4 word topic label for this group of startup ideas. \
             Respond with the label only.\n\n{}",
            titles.join("\n")
        );

        match client.complete(&prompt).await {
            Ok(text) => {
                let label = text.trim();
                let words = label.split_whitespace().count();
                if !label.is_empty() && words <= 6 {
                    return label.to_string();
                }
                eprintln!("cluster: unusable delegated label: '{}'", label);
            }
            Err(e) => {
                eprintln!("cluster: delegated labeling failed: {}", e);
            }
        }
    }

    keyword_topic(members).unwrap_or_else(|| FALLBACK_TOPIC.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawItem, ScoreRecord};

    fn scored(title: &str, description: &str, platform: &str) -> ScoredItem {
        ScoredItem {
            item: RawItem {
                id: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                description: description.to_string(),
                url: String::new(),
                platform: platform.to_string(),
                category: None,
                discovered_at: 0,
            },
            scores: ScoreRecord {
                content_quality: 0.5,
                business_viability: 0.5,
                market_timing: 0.5,
                technical_feasibility: 0.5,
                competitive_advantage: 0.5,
                overall: 0.5,
            },
            market_opportunity: None,
        }
    }

    #[tokio::test]
    async fn keyword_overlap_groups_cross_platform_pair() {
        let items = vec![
            scored(
                "Automation for invoice workflow",
                "automation workflow for accountants",
                "twitter",
            ),
            scored(
                "Workflow automation bot",
                "automation of approval workflow steps",
                "github",
            ),
        ];

        let clusters = cluster_items(Variant::Professional, &KeywordOverlap, None, items).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[0].platforms.len(), 2);
    }

    #[tokio::test]
    async fn singleton_clusters_are_dropped() {
        let items = vec![
            scored("Automation workflow tool", "automation workflow", "forum"),
            scored("Dog walking diary", "a diary for dog walks", "forum"),
        ];

        let clusters = cluster_items(Variant::Basic, &KeywordOverlap, None, items).await;
        assert!(clusters.is_empty());
    }

    #[tokio::test]
    async fn professional_requires_platform_diversity() {
        let same_platform = vec![
            scored("Automation workflow a", "automation workflow", "forum"),
            scored("Automation workflow b", "automation workflow", "forum"),
        ];

        let pro = cluster_items(
            Variant::Professional,
            &KeywordOverlap,
            None,
            same_platform.clone(),
        )
        .await;
        assert!(pro.is_empty());

        // The basic variant keeps the same cluster.
        let basic = cluster_items(Variant::Basic, &KeywordOverlap, None, same_platform).await;
        assert_eq!(basic.len(), 1);
    }

    #[tokio::test]
    async fn greedy_assignment_removes_items_from_pool() {
        let items = vec![
            scored("Automation workflow a", "automation workflow", "forum"),
            scored("Automation workflow b", "automation workflow", "github"),
            scored("Payments compliance a", "payments compliance saas", "forum"),
            scored("Payments compliance b", "payments compliance saas", "github"),
        ];

        let clusters = cluster_items(Variant::Basic, &KeywordOverlap, None, items).await;
        assert_eq!(clusters.len(), 2);
        let total: usize = clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn one_common_keyword_is_not_enough() {
        // Only "automation" is shared; the raw common count stays below 2.
        let items = vec![
            scored("Automation for gyms", "automation scheduling", "forum"),
            scored("Automation for farms", "automation compliance", "github"),
        ];

        let clusters = cluster_items(Variant::Basic, &KeywordOverlap, None, items).await;
        assert!(clusters.is_empty());
    }

    #[test]
    fn keyword_topic_uses_common_vocabulary() {
        let members = vec![
            scored("Automation workflow a", "automation workflow", "forum"),
            scored("Automation workflow b", "automation workflow", "github"),
        ];
        let topic = keyword_topic(&members).unwrap();
        assert!(topic.contains("automation"));
        assert!(topic.contains("workflow"));
    }

    #[tokio::test]
    async fn label_falls_back_to_placeholder_without_keywords() {
        let members = vec![
            scored("alpha", "beta", "forum"),
            scored("gamma", "delta", "github"),
        ];
        assert_eq!(label_cluster(None, &members).await, FALLBACK_TOPIC);
    }
}
