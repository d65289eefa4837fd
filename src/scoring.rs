//! Multi-factor relevance scoring.
//!
//! Each item gets five independent sub-scores in [0, 1], computed from a
//! per-factor baseline plus a fixed increment per matched keyword, and an
//! overall score as a fixed weighted combination. The heuristic path is a
//! pure function; a delegated completion call can optionally refine the
//! sub-scores, falling back to the heuristic values when the response
//! fails to parse.

use crate::keywords;
use crate::llm::{self, LlmClient, ScoreParse};
use crate::models::{RawItem, ScoreRecord, Variant};

/// Weights for content quality, business viability, market timing,
/// technical feasibility, and competitive advantage. Must sum to 1.0.
pub const SCORE_WEIGHTS: [f64; 5] = [0.15, 0.30, 0.20, 0.20, 0.15];

/// Combined title+description shorter than this gets the baseline
/// penalty before keyword matching.
const SHORT_TEXT_LEN: usize = 50;
const SHORT_TEXT_PENALTY: f64 = 0.8;

struct Factor {
    baseline: f64,
    terms: &'static [&'static str],
}

const FACTORS: [Factor; 5] = [
    Factor {
        baseline: 0.2,
        terms: keywords::QUALITY_TERMS,
    },
    Factor {
        baseline: 0.3,
        terms: keywords::VIABILITY_TERMS,
    },
    Factor {
        baseline: 0.5,
        terms: keywords::TIMING_TERMS,
    },
    Factor {
        baseline: 0.6,
        terms: keywords::FEASIBILITY_TERMS,
    },
    Factor {
        baseline: 0.4,
        terms: keywords::ADVANTAGE_TERMS,
    },
];

/// Scores one item with keyword heuristics. Pure; an empty description
/// still scores against the title alone.
pub fn score_item(variant: Variant, item: &RawItem) -> ScoreRecord {
    let text = format!("{} {}", item.title, item.description)
        .trim()
        .to_lowercase();

    let penalty = if text.chars().count() < SHORT_TEXT_LEN {
        SHORT_TEXT_PENALTY
    } else {
        1.0
    };
    let increment = variant.keyword_increment();

    let mut subs = [0.0f64; 5];
    for (i, factor) in FACTORS.iter().enumerate() {
        let hits = keywords::count_matches(&text, factor.terms);
        subs[i] = (factor.baseline * penalty + hits as f64 * increment).clamp(0.0, 1.0);
    }

    from_sub_scores(&subs)
}

/// Builds a full record from five sub-scores, clamping each and deriving
/// the weighted overall.
pub fn from_sub_scores(subs: &[f64; 5]) -> ScoreRecord {
    let clamped: Vec<f64> = subs.iter().map(|s| s.clamp(0.0, 1.0)).collect();
    let overall: f64 = clamped
        .iter()
        .zip(SCORE_WEIGHTS.iter())
        .map(|(s, w)| s * w)
        .sum();

    ScoreRecord {
        content_quality: clamped[0],
        business_viability: clamped[1],
        market_timing: clamped[2],
        technical_feasibility: clamped[3],
        competitive_advantage: clamped[4],
        overall: overall.clamp(0.0, 1.0),
    }
}

/// Asks the delegated completion service to rescore the item.
///
/// Expects five comma-separated floats in [0, 1], ordered as
/// [`SCORE_WEIGHTS`]. Any call or parse failure keeps the heuristic
/// record unchanged.
pub async fn refine_with_llm(
    llm: &LlmClient,
    item: &RawItem,
    heuristic: ScoreRecord,
) -> ScoreRecord {
    let prompt = format!(
        "Rate this startup idea on five factors, each 0.0-1.0: \
         content quality, business viability, market timing, technical \
         feasibility, competitive advantage. Respond with exactly five \
         comma-separated numbers and nothing else.\n\nTitle: {}\nDescription: {}",
        item.title, item.description
    );

    let output = match llm.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("score {}: delegated call failed: {}", item.id, e);
            return heuristic;
        }
    };

    match llm::parse_score_list(&output, 5) {
        ScoreParse::Parsed(values) => {
            let subs = [values[0], values[1], values[2], values[3], values[4]];
            from_sub_scores(&subs)
        }
        ScoreParse::Failed(reason) => {
            eprintln!("score {}: unusable delegated response: {}", item.id, reason);
            heuristic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, description: &str) -> RawItem {
        RawItem {
            id: "t1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            url: "https://example.com/t1".to_string(),
            platform: "forum".to_string(),
            category: None,
            discovered_at: 0,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = SCORE_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn all_scores_in_unit_interval() {
        // Stuff the text with every vocabulary term to force clamping.
        let description = [
            keywords::QUALITY_TERMS,
            keywords::VIABILITY_TERMS,
            keywords::TIMING_TERMS,
            keywords::FEASIBILITY_TERMS,
            keywords::ADVANTAGE_TERMS,
        ]
        .concat()
        .join(" ");
        let record = score_item(Variant::Professional, &item("everything", &description));

        for score in [
            record.content_quality,
            record.business_viability,
            record.market_timing,
            record.technical_feasibility,
            record.competitive_advantage,
            record.overall,
        ] {
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
        // Enough hits to saturate the feasibility factor.
        assert_eq!(record.technical_feasibility, 1.0);
    }

    #[test]
    fn code_review_assistant_example() {
        let record = score_item(
            Variant::Professional,
            &item(
                "AI-Powered Code Review Assistant",
                "An enterprise saas for automation of pull request review",
            ),
        );
        // "enterprise" and "saas" lift quality above its 0.2 baseline.
        assert!(record.content_quality > 0.2 + 0.15);
        // "automation" lifts feasibility above its 0.6 baseline.
        assert!(record.technical_feasibility > 0.6);
    }

    #[test]
    fn empty_description_scores_from_title() {
        let record = score_item(Variant::Basic, &item("Enterprise saas platform for payroll", ""));
        assert!(record.content_quality > 0.2);
        assert!(record.overall > 0.0);
    }

    #[test]
    fn short_text_gets_baseline_penalty() {
        // No keyword hits, under 50 chars: every sub-score is its
        // penalized baseline.
        let record = score_item(Variant::Basic, &item("hello", "world"));
        assert!((record.content_quality - 0.2 * 0.8).abs() < 1e-9);
        assert!((record.technical_feasibility - 0.6 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn short_text_penalty_counts_chars_not_bytes() {
        // 30 characters but 60 bytes: still under the 50-char boundary.
        let title = "ü".repeat(30);
        let record = score_item(Variant::Basic, &item(&title, ""));
        assert!((record.content_quality - 0.2 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn overall_is_weighted_sum() {
        let record = from_sub_scores(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!((record.overall - 1.0).abs() < 1e-9);

        let record = from_sub_scores(&[1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((record.overall - 0.15).abs() < 1e-9);
    }

    #[test]
    fn from_sub_scores_clamps_wild_inputs() {
        let record = from_sub_scores(&[3.0, -1.0, 0.5, 0.5, 0.5]);
        assert_eq!(record.content_quality, 1.0);
        assert_eq!(record.business_viability, 0.0);
        assert!((0.0..=1.0).contains(&record.overall));
    }

    #[test]
    fn professional_increment_is_stricter() {
        let target = item("startup", "enterprise saas for the market");
        let basic = score_item(Variant::Basic, &target);
        let pro = score_item(Variant::Professional, &target);
        assert!(pro.content_quality > basic.content_quality);
    }
}
