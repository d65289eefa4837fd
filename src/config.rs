use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Variant;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub reports: ReportConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// SQLite journal mode: `wal`, `delete`, or `memory`.
    #[serde(default = "default_journal_mode")]
    pub journal_mode: String,
}

fn default_max_connections() -> u32 {
    5
}
fn default_journal_mode() -> String {
    "wal".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_variant")]
    pub variant: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
        }
    }
}

fn default_variant() -> String {
    "basic".to_string()
}

impl ScoringConfig {
    pub fn variant(&self) -> Variant {
        // Validated in load_config; unknown values never reach here.
        match self.variant.as_str() {
            "professional" => Variant::Professional,
            _ => Variant::Basic,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClusteringConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            lookback_days: default_lookback_days(),
        }
    }
}

fn default_strategy() -> String {
    "keyword".to_string()
}
fn default_lookback_days() -> i64 {
    7
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_special_market_min")]
    pub special_market_min: f64,
    #[serde(default = "default_special_overall_min")]
    pub special_overall_min: f64,
    #[serde(default = "default_alert_min")]
    pub alert_min: f64,
    #[serde(default = "default_alert_min")]
    pub high_value_min: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            special_market_min: default_special_market_min(),
            special_overall_min: default_special_overall_min(),
            alert_min: default_alert_min(),
            high_value_min: default_alert_min(),
        }
    }
}

fn default_top_n() -> usize {
    15
}
fn default_special_market_min() -> f64 {
    0.80
}
fn default_special_overall_min() -> f64 {
    0.70
}
fn default_alert_min() -> f64 {
    0.85
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an environment variable to read the API key from when
    /// `api_key` is not set. Resolved once in [`load_config`].
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: None,
            model: None,
            api_key: None,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    /// Source kind: `forum`, `codehost`, or `websearch`.
    pub kind: String,
    pub endpoint: String,
    pub queries: Vec<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an environment variable to read the API key from when
    /// `api_key` is not set. Resolved once in [`load_config`].
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Courtesy delay between consecutive outbound calls.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_delay_ms() -> u64 {
    1000
}
fn default_max_results() -> usize {
    25
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate db
    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }
    match config.db.journal_mode.as_str() {
        "wal" | "delete" | "memory" => {}
        other => anyhow::bail!(
            "Unknown db.journal_mode: '{}'. Must be wal, delete, or memory.",
            other
        ),
    }

    // Validate scoring
    match config.scoring.variant.as_str() {
        "basic" | "professional" => {}
        other => anyhow::bail!(
            "Unknown scoring variant: '{}'. Must be basic or professional.",
            other
        ),
    }

    // Validate clustering
    match config.clustering.strategy.as_str() {
        "keyword" | "delegated" => {}
        other => anyhow::bail!(
            "Unknown clustering strategy: '{}'. Must be keyword or delegated.",
            other
        ),
    }
    if config.clustering.lookback_days < 1 {
        anyhow::bail!("clustering.lookback_days must be >= 1");
    }
    if config.clustering.strategy == "delegated" && !config.llm.is_enabled() {
        anyhow::bail!("clustering.strategy = 'delegated' requires [llm] to be enabled");
    }

    // Validate reports
    if config.reports.top_n == 0 {
        anyhow::bail!("reports.top_n must be >= 1");
    }
    for (name, value) in [
        ("special_market_min", config.reports.special_market_min),
        ("special_overall_min", config.reports.special_overall_min),
        ("alert_min", config.reports.alert_min),
        ("high_value_min", config.reports.high_value_min),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("reports.{} must be in [0.0, 1.0]", name);
        }
    }

    // Validate llm and resolve credentials once, here. Business logic
    // never reads the process environment.
    match config.llm.provider.as_str() {
        "disabled" | "completion" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled or completion.",
            other
        ),
    }
    if config.llm.is_enabled() {
        if config.llm.endpoint.is_none() {
            anyhow::bail!(
                "llm.endpoint must be specified when provider is '{}'",
                config.llm.provider
            );
        }
        if config.llm.model.is_none() {
            anyhow::bail!(
                "llm.model must be specified when provider is '{}'",
                config.llm.provider
            );
        }
        if config.llm.api_key.is_none() {
            if let Some(ref var) = config.llm.api_key_env {
                config.llm.api_key = std::env::var(var).ok();
            }
        }
    }

    // Validate sources and resolve per-source credentials
    for source in &mut config.sources {
        match source.kind.as_str() {
            "forum" | "codehost" | "websearch" => {}
            other => anyhow::bail!(
                "Source '{}' has unknown kind: '{}'. Must be forum, codehost, or websearch.",
                source.name,
                other
            ),
        }
        if source.endpoint.trim().is_empty() {
            anyhow::bail!("Source '{}' has an empty endpoint", source.name);
        }
        if source.queries.is_empty() {
            anyhow::bail!("Source '{}' has no queries configured", source.name);
        }
        if source.api_key.is_none() {
            if let Some(ref var) = source.api_key_env {
                source.api_key = std::env::var(var).ok();
            }
        }
        // Web-search proxies require an API key; forum and code-host
        // search endpoints are assumed public.
        if source.kind == "websearch" && source.api_key.is_none() {
            anyhow::bail!(
                "Source '{}' (websearch) requires api_key or api_key_env",
                source.name
            );
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    const MINIMAL: &str = r#"
[db]
path = "/tmp/scout.sqlite"

[server]
bind = "127.0.0.1:7431"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let (_dir, path) = write_config(MINIMAL);
        let config = load_config(&path).unwrap();
        assert_eq!(config.scoring.variant, "basic");
        assert_eq!(config.clustering.strategy, "keyword");
        assert_eq!(config.clustering.lookback_days, 7);
        assert_eq!(config.reports.top_n, 15);
        assert!(!config.llm.is_enabled());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn db_pool_settings_default_and_parse() {
        let (_dir, path) = write_config(MINIMAL);
        let config = load_config(&path).unwrap();
        assert_eq!(config.db.max_connections, 5);
        assert_eq!(config.db.journal_mode, "wal");

        let (_dir, path) = write_config(
            r#"
[db]
path = "/tmp/scout.sqlite"
max_connections = 2
journal_mode = "delete"

[server]
bind = "127.0.0.1:7431"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.db.max_connections, 2);
        assert_eq!(config.db.journal_mode, "delete");
    }

    #[test]
    fn rejects_unknown_journal_mode() {
        let (_dir, path) = write_config(
            r#"
[db]
path = "/tmp/scout.sqlite"
journal_mode = "turbo"

[server]
bind = "127.0.0.1:7431"
"#,
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_zero_pool_size() {
        let (_dir, path) = write_config(
            r#"
[db]
path = "/tmp/scout.sqlite"
max_connections = 0

[server]
bind = "127.0.0.1:7431"
"#,
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_unknown_variant() {
        let (_dir, path) = write_config(&format!("{}\n[scoring]\nvariant = \"elite\"\n", MINIMAL));
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_delegated_strategy_without_llm() {
        let (_dir, path) = write_config(&format!(
            "{}\n[clustering]\nstrategy = \"delegated\"\n",
            MINIMAL
        ));
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_websearch_source_without_key() {
        let (_dir, path) = write_config(&format!(
            r#"{}
[[sources]]
name = "serp"
kind = "websearch"
endpoint = "https://search.example.com/api"
queries = ["startup idea"]
"#,
            MINIMAL
        ));
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_source_with_no_queries() {
        let (_dir, path) = write_config(&format!(
            r#"{}
[[sources]]
name = "hn"
kind = "forum"
endpoint = "https://forum.example.com/search"
queries = []
"#,
            MINIMAL
        ));
        assert!(load_config(&path).is_err());
    }
}
