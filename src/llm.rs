//! Delegated text-completion client and response parsing.
//!
//! The pipeline optionally delegates scoring refinement, pairwise
//! similarity, topic labeling, and trend summaries to an external
//! completion service. Responses are free text; the parsers here turn
//! them into explicit tagged results ([`ScoreParse`]) so every call site
//! handles the failure arm instead of try-and-default inline.
//!
//! One attempt per call, no retry: a failed or unparseable delegated call
//! is logged by the caller and the heuristic path takes over. This keeps
//! every failure mode in the pipeline's log-once-and-continue shape.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::LlmConfig;

/// Outcome of parsing a delegated response expected to contain numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreParse {
    /// All expected values present and in [0, 1].
    Parsed(Vec<f64>),
    /// Malformed, wrong count, or out-of-range — reason included.
    Failed(String),
}

/// Client for a completion-style endpoint.
///
/// Sends `{ "model": ..., "input": ... }` and reads the `output` string
/// from the JSON response body.
#[derive(Clone)]
pub struct LlmClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LlmClient {
    /// Builds a client from configuration, or `None` when the provider is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is enabled but endpoint or model
    /// is missing (load_config validates this, so only hand-built configs
    /// can hit it), or if the HTTP client cannot be constructed.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        if !config.is_enabled() {
            return Ok(None);
        }

        let endpoint = match config.endpoint.clone() {
            Some(e) => e,
            None => bail!("llm.endpoint required when provider is enabled"),
        };
        let model = match config.model.clone() {
            Some(m) => m,
            None => bail!("llm.model required when provider is enabled"),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            endpoint,
            model,
            api_key: config.api_key.clone(),
            client,
        }))
    }

    /// Sends one completion request and returns the raw output text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "input": prompt,
        });

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Completion API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        let output = json
            .get("output")
            .and_then(|o| o.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid completion response: missing output"))?;

        Ok(output.to_string())
    }
}

/// Parses `expected` comma-separated floats in [0, 1] from free text.
///
/// Surrounding prose is not tolerated: the whole trimmed response must be
/// the number list. Anything else is a [`ScoreParse::Failed`].
pub fn parse_score_list(text: &str, expected: usize) -> ScoreParse {
    let parts: Vec<&str> = text.trim().split(',').map(|p| p.trim()).collect();

    if parts.len() != expected {
        return ScoreParse::Failed(format!(
            "expected {} values, got {}",
            expected,
            parts.len()
        ));
    }

    let mut values = Vec::with_capacity(expected);
    for part in parts {
        match part.parse::<f64>() {
            Ok(v) if (0.0..=1.0).contains(&v) => values.push(v),
            Ok(v) => return ScoreParse::Failed(format!("value {} out of range [0, 1]", v)),
            Err(_) => return ScoreParse::Failed(format!("not a number: '{}'", part)),
        }
    }

    ScoreParse::Parsed(values)
}

/// Parses a single similarity float in [0, 1] from free text.
pub fn parse_similarity(text: &str) -> ScoreParse {
    parse_score_list(text, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_floats() {
        let parsed = parse_score_list("0.4, 0.75,0.2 , 1.0, 0", 5);
        assert_eq!(
            parsed,
            ScoreParse::Parsed(vec![0.4, 0.75, 0.2, 1.0, 0.0])
        );
    }

    #[test]
    fn parses_bare_similarity_number() {
        assert_eq!(parse_similarity("0.82"), ScoreParse::Parsed(vec![0.82]));
    }

    #[test]
    fn rejects_wrong_count() {
        assert!(matches!(
            parse_score_list("0.1, 0.2", 5),
            ScoreParse::Failed(_)
        ));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(parse_similarity("1.7"), ScoreParse::Failed(_)));
        assert!(matches!(parse_similarity("-0.1"), ScoreParse::Failed(_)));
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_similarity("The similarity is 0.8"),
            ScoreParse::Failed(_)
        ));
    }

    #[test]
    fn disabled_config_builds_no_client() {
        let config = LlmConfig::default();
        assert!(LlmClient::from_config(&config).unwrap().is_none());
    }
}
