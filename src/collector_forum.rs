//! Forum API collector.
//!
//! Queries a forum search endpoint once per configured query string and
//! normalizes matching posts into [`RawItem`]s. Expected response shape:
//!
//! ```json
//! { "posts": [ { "title": "...", "body": "...", "permalink": "..." } ] }
//! ```

use anyhow::Result;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::keywords;
use crate::models::RawItem;

/// Collects candidate items from a forum source.
///
/// One search call per configured query, with the source's courtesy
/// delay between calls. A failed query is recorded in the returned error
/// list and skipped; the partial item list is always returned. Only a
/// broken HTTP client construction is fatal.
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
    let response = client
        .get(&source.endpoint)
        .query(&[("q", query), ("limit", &source.max_results.to_string())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("forum API error {}", status);
    }

    let json: serde_json::Value = response.json().await?;
    let posts = json
        .get("posts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid forum response: missing posts array"))?;

    let now = chrono::Utc::now().timestamp();
    let mut items = Vec::new();

    for post in posts.iter().take(source.max_results) {
        let title = post.get("title").and_then(|t| t.as_str()).unwrap_or("");
        if title.is_empty() {
            continue;
        }
        let body = post.get("body").and_then(|b| b.as_str()).unwrap_or("");

        // Discovery allow-list: keep only posts that read like idea talk
        if !keywords::contains_discovery_term(&format!("{} {}", title, body)) {
            continue;
        }

        let url = post
            .get("permalink")
            .and_then(|u| u.as_str())
            .unwrap_or("")
            .to_string();

        items.push(RawItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: body.to_string(),
            url,
            platform: source.name.clone(),
            category: None,
            discovered_at: now,
        });
    }

    Ok(items)
}
