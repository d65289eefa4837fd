//! Curated keyword vocabularies and matching helpers.
//!
//! Three roles: the discovery allow-list gates what collectors keep, the
//! business vocabulary drives keyword-overlap clustering and topic
//! labeling, and the per-factor term lists feed the relevance scorer.
//! Matching is substring search over lower-cased text, except that terms
//! shorter than four characters must match a whole word so "ai" does not
//! fire on "maintain" or "api" on "rapid".

/// Allow-list applied by collectors: a candidate's title+description must
/// contain at least one of these to be kept.
pub const DISCOVERY_TERMS: &[&str] = &[
    "startup",
    "saas",
    "side project",
    "mvp",
    "pain point",
    "business idea",
    "app idea",
    "product idea",
    "automation",
    "indie hacker",
    "bootstrapped",
    "micro-saas",
    "looking for a tool",
    "wish there was",
];

/// Business vocabulary used for clustering overlap and topic labels.
pub const BUSINESS_VOCABULARY: &[&str] = &[
    "automation",
    "workflow",
    "analytics",
    "saas",
    "marketplace",
    "api",
    "integration",
    "ai",
    "no-code",
    "subscription",
    "dashboard",
    "crm",
    "billing",
    "onboarding",
    "productivity",
    "monitoring",
    "scheduling",
    "compliance",
    "security",
    "payments",
];

/// Professional-register terms lifting content quality.
pub const QUALITY_TERMS: &[&str] = &[
    "enterprise",
    "saas",
    "platform",
    "professional",
    "scalable",
    "b2b",
];

/// Commercial signals lifting business viability.
pub const VIABILITY_TERMS: &[&str] = &[
    "revenue",
    "customers",
    "market",
    "pricing",
    "subscription",
    "demand",
    "paying",
];

/// Momentum signals lifting market timing.
pub const TIMING_TERMS: &[&str] = &["ai", "emerging", "growing", "trend", "remote", "adoption"];

/// Buildability signals lifting technical feasibility.
pub const FEASIBILITY_TERMS: &[&str] = &[
    "automation",
    "api",
    "no-code",
    "open source",
    "integration",
    "plugin",
    "extension",
];

/// Positioning signals lifting competitive advantage.
pub const ADVANTAGE_TERMS: &[&str] = &[
    "niche",
    "underserved",
    "unique",
    "moat",
    "differentiated",
    "untapped",
];

/// Substring match, except terms shorter than four characters must match
/// a whole alphanumeric word.
fn term_in_text(lower: &str, term: &str) -> bool {
    if term.len() >= 4 {
        return lower.contains(term);
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == term)
}

/// Returns true when the lower-cased text contains at least one
/// discovery term.
pub fn contains_discovery_term(text: &str) -> bool {
    let lower = text.to_lowercase();
    DISCOVERY_TERMS.iter().any(|term| term_in_text(&lower, term))
}

/// Counts how many of `terms` appear in the (already lower-cased) text.
/// Each term counts at most once.
pub fn count_matches(lower_text: &str, terms: &[&str]) -> usize {
    terms
        .iter()
        .filter(|term| term_in_text(lower_text, term))
        .count()
}

/// Extracts the business-vocabulary keywords present in the text.
pub fn extract_business_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    BUSINESS_VOCABULARY
        .iter()
        .copied()
        .filter(|term| term_in_text(&lower, term))
        .collect()
}

/// Top-k business keywords by frequency across a set of texts.
/// Ties break by vocabulary order, keeping the output stable.
pub fn top_keywords<'a>(texts: impl Iterator<Item = &'a str>, k: usize) -> Vec<String> {
    let mut counts = vec![0usize; BUSINESS_VOCABULARY.len()];
    for text in texts {
        let lower = text.to_lowercase();
        for (i, term) in BUSINESS_VOCABULARY.iter().enumerate() {
            if term_in_text(&lower, term) {
                counts[i] += 1;
            }
        }
    }

    let mut ranked: Vec<(usize, usize)> = counts
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(k)
        .map(|(i, _)| BUSINESS_VOCABULARY[i].to_string())
        .collect()
}
