//! Web-search proxy collector.
//!
//! Queries a metered web-search API once per configured query and
//! normalizes organic results into [`RawItem`]s. Expected response shape:
//!
//! ```json
//! { "results": [ { "title": "...", "snippet": "...", "link": "..." } ] }
//! ```
//!
//! Unlike the forum and code-host collectors, a web-search proxy is
//! always metered: a missing API key is rejected at config load.

use anyhow::Result;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::keywords;
use crate::models::RawItem;

/// Collects candidate items from a web-search proxy source.
pub async fn collect(source: &SourceConfig) -> Result<(Vec<RawItem>, Vec<String>)> {
    // load_config guarantees this for kind = "websearch"; guard anyway
    // for hand-built configs.
    let api_key = source
        .api_key
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("websearch source '{}' has no api_key", source.name))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(source.timeout_secs))
        .build()?;

    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (i, query) in source.queries.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(source.delay_ms)).await;
        }

        match fetch_query(&client, source, api_key, query).await {
            Ok(batch) => items.extend(batch),
            Err(e) => {
                eprintln!("collect {}: query '{}' failed: {}", source.name, query, e);
                errors.push(format!("{}: {}", source.name, e));
            }
        }
    }

    Ok((items, errors))
}

async fn fetch_query(
    client: &reqwest::Client,
    source: &SourceConfig,
    api_key: &str,
    query: &str,
) -> Result<Vec<RawItem>> {
    let response = client
        .get(&source.endpoint)
        .header("X-API-KEY", api_key)
        .query(&[("q", query), ("num", &source.max_results.to_string())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("web-search API error {}", status);
    }

    let json: serde_json::Value = response.json().await?;
    let results = json
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid web-search response: missing results array"))?;

    let now = chrono::Utc::now().timestamp();
    let mut items = Vec::new();

    for result in results.iter().take(source.max_results) {
        let title = result.get("title").and_then(|t| t.as_str()).unwrap_or("");
        if title.is_empty() {
            continue;
        }
        let snippet = result
            .get("snippet")
            .and_then(|s| s.as_str())
            .unwrap_or("");

        if !keywords::contains_discovery_term(&format!("{} {}", title, snippet)) {
            continue;
        }

        let url = result
            .get("link")
            .and_then(|u| u.as_str())
            .unwrap_or("")
            .to_string();

        items.push(RawItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: snippet.to_string(),
            url,
            platform: source.name.clone(),
            category: None,
            discovered_at: now,
        });
    }

    Ok(items)
}
