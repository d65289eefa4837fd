//! Code-host search collector.
//!
//! Queries a code-host repository search endpoint (GitHub-style) once per
//! configured query and normalizes matching repositories into
//! [`RawItem`]s. Expected response shape:
//!
//! ```json
//! { "items": [ { "name": "...", "description": "...", "html_url": "..." } ] }
//! ```

use anyhow::Result;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::keywords;
use crate::models::RawItem;

/// Collects candidate items from a code-host source.
///
/// Same failure policy as the other collectors: per-query errors are
/// logged, recorded, and skipped, and the accumulated partial list is
/// returned.
pub async fn collect(source: &SourceConfig) -> Result<(Vec<RawItem>, Vec<String>)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(source.timeout_secs))
        .build()?;

    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (i, query) in source.queries.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(source.delay_ms)).await;
        }

        match fetch_query(&client, source, query).await {
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
    query: &str,
) -> Result<Vec<RawItem>> {
    let mut request = client
        .get(&source.endpoint)
        .header("Accept", "application/json")
        .header("User-Agent", "signal-scout")
        .query(&[
            ("q", query),
            ("per_page", &source.max_results.to_string()),
        ]);
    if let Some(ref key) = source.api_key {
        request = request.header("Authorization", format!("Bearer {}", key));
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("code-host API error {}", status);
    }

    let json: serde_json::Value = response.json().await?;
    let repos = json
        .get("items")
        .and_then(|i| i.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid code-host response: missing items array"))?;

    let now = chrono::Utc::now().timestamp();
    let mut items = Vec::new();

    for repo in repos.iter().take(source.max_results) {
        let name = repo.get("name").and_then(|n| n.as_str()).unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let description = repo
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("");

        if !keywords::contains_discovery_term(&format!("{} {}", name, description)) {
            continue;
        }

        let url = repo
            .get("html_url")
            .and_then(|u| u.as_str())
            .unwrap_or("")
            .to_string();

        items.push(RawItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: name.to_string(),
            description: description.to_string(),
            url,
            platform: source.name.clone(),
            category: Some("devtools".to_string()),
            discovered_at: now,
        });
    }

    Ok(items)
}
