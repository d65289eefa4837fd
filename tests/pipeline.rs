use chrono::NaiveDate;
use sqlx::SqlitePool;
use tempfile::TempDir;

use signal_scout::config::{load_config, Config};
use signal_scout::models::{RawItem, Variant};
use signal_scout::{cluster, correlate, db, dedup, migrate, report, scoring, store};

fn setup_config(extra: &str) -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let content = format!(
        r#"[db]
path = "{}/data/scout.sqlite"

[server]
bind = "127.0.0.1:7431"
{}
"#,
        tmp.path().display(),
        extra
    );
    let path = tmp.path().join("scout.toml");
    std::fs::write(&path, content).unwrap();
    let config = load_config(&path).unwrap();
    (tmp, config)
}

async fn setup_db(config: &Config) -> SqlitePool {
    migrate::run_migrations(config).await.unwrap();
    db::connect(config).await.unwrap()
}

fn item(title: &str, description: &str, platform: &str, discovered_at: i64) -> RawItem {
    RawItem {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: format!("https://example.com/{}", uuid::Uuid::new_v4()),
        platform: platform.to_string(),
        category: None,
        discovered_at,
    }
}

async fn insert_scored(
    pool: &SqlitePool,
    variant: Variant,
    raw: RawItem,
    scored_at: i64,
) -> String {
    let id = raw.id.clone();
    store::insert_item(pool, &raw).await.unwrap();
    let scores = scoring::score_item(variant, &raw);
    store::write_scores(pool, &id, &scores, scored_at).await.unwrap();
    id
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (_tmp, config) = setup_config("");
    migrate::run_migrations(&config).await.unwrap();
    migrate::run_migrations(&config).await.unwrap();
}

#[tokio::test]
async fn configured_db_pool_settings_apply() {
    let tmp = TempDir::new().unwrap();
    let content = format!(
        r#"[db]
path = "{}/data/scout.sqlite"
max_connections = 2
journal_mode = "delete"

[server]
bind = "127.0.0.1:7431"
"#,
        tmp.path().display()
    );
    let path = tmp.path().join("scout.toml");
    std::fs::write(&path, content).unwrap();
    let config = load_config(&path).unwrap();

    migrate::run_migrations(&config).await.unwrap();
    let pool = db::connect(&config).await.unwrap();

    let raw = item("Pool settings startup idea", "saas automation", "forum", 100);
    store::insert_item(&pool, &raw).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn duplicate_title_is_not_persisted_twice() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;

    let first = item("Automation for invoices", "startup saas idea", "forum", 100);
    assert!(!dedup::is_duplicate(&pool, &first).await.unwrap());
    store::insert_item(&pool, &first).await.unwrap();

    // Same title from a different platform with a different URL: still a
    // duplicate within this run's read-then-write discipline.
    let second = item("Automation for invoices", "another snippet", "github", 200);
    assert!(dedup::is_duplicate(&pool, &second).await.unwrap());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn duplicate_url_is_detected_when_titles_differ() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;

    let mut first = item("Original post", "startup idea", "forum", 100);
    first.url = "https://example.com/fixed".to_string();
    store::insert_item(&pool, &first).await.unwrap();

    let mut second = item("Crosspost with new title", "startup idea", "forum", 200);
    second.url = "https://example.com/fixed".to_string();
    assert!(dedup::is_duplicate(&pool, &second).await.unwrap());
}

#[tokio::test]
async fn scores_survive_storage_round_trip() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;

    let raw = item(
        "AI-Powered Code Review Assistant",
        "An enterprise saas for automation of pull request review",
        "github",
        100,
    );
    insert_scored(&pool, Variant::Professional, raw, 150).await;

    let stored = store::all_scored_items(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    let scores = stored[0].scores;
    assert!(scores.content_quality > 0.2);
    assert!(scores.technical_feasibility > 0.6);
    assert!((0.0..=1.0).contains(&scores.overall));
    assert!(stored[0].market_opportunity.is_none());
}

#[tokio::test]
async fn unscored_items_shrink_as_scores_land() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;

    let a = item("First startup idea", "saas automation", "forum", 100);
    let b = item("Second startup idea", "workflow analytics", "github", 200);
    store::insert_item(&pool, &a).await.unwrap();
    store::insert_item(&pool, &b).await.unwrap();

    let pending = store::unscored_items(&pool).await.unwrap();
    assert_eq!(pending.len(), 2);

    let scores = scoring::score_item(Variant::Basic, &a);
    store::write_scores(&pool, &a.id, &scores, 300).await.unwrap();

    let pending = store::unscored_items(&pool).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, b.id);
}

#[tokio::test]
async fn cluster_to_correlation_patches_members() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;
    let now = chrono::Utc::now().timestamp();

    insert_scored(
        &pool,
        Variant::Professional,
        item(
            "Workflow automation for accountants",
            "startup automation workflow saas",
            "twitter",
            now - 3600,
        ),
        now,
    )
    .await;
    insert_scored(
        &pool,
        Variant::Professional,
        item(
            "Automation workflow bot",
            "startup automation of approval workflow",
            "github",
            now - 7200,
        ),
        now,
    )
    .await;

    let window = store::scored_items_since(&pool, now - 7 * 24 * 3600).await.unwrap();
    assert_eq!(window.len(), 2);

    let clusters = cluster::cluster_items(
        Variant::Professional,
        &cluster::KeywordOverlap,
        None,
        window,
    )
    .await;
    assert_eq!(clusters.len(), 1);

    let summary = correlate::summarize(None, &clusters[0]).await;
    let record = correlate::aggregate_cluster(Variant::Professional, &clusters[0], summary, now);
    assert_eq!(record.mention_volume, 2);
    assert_eq!(record.platform_count, 2);
    assert!((record.correlation_score - 0.5).abs() < 1e-9);
    assert!(record.velocity_score > 0.0);

    let (patched, errors) = correlate::persist_with_patches(&pool, &record, now).await.unwrap();
    assert_eq!(patched, 2);
    assert!(errors.is_empty());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM correlations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    // Member items carry the cluster's market score afterwards.
    let stored = store::all_scored_items(&pool).await.unwrap();
    assert!(stored.iter().all(|s| s.market_opportunity.is_some()));
}

#[tokio::test]
async fn report_upsert_is_idempotent_per_date() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;
    let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();

    insert_scored(
        &pool,
        Variant::Basic,
        item("First startup idea", "enterprise saas automation", "forum", 100),
        150,
    )
    .await;

    let first = report::generate_daily_report(&config, &pool, date).await.unwrap();
    assert_eq!(first.total_analyzed, 1);

    insert_scored(
        &pool,
        Variant::Basic,
        item("Second startup idea", "workflow analytics market", "github", 200),
        250,
    )
    .await;

    let second = report::generate_daily_report(&config, &pool, date).await.unwrap();
    assert_eq!(second.total_analyzed, 2);

    // Exactly one snapshot row for the date, holding the rerun's values.
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT report_date, total_analyzed FROM daily_reports",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "2026-08-23");
    assert_eq!(rows[0].1, 2);
}

#[tokio::test]
async fn report_on_empty_database_writes_snapshot() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;
    let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();

    let outcome = report::generate_daily_report(&config, &pool, date).await.unwrap();
    assert_eq!(outcome.total_analyzed, 0);
    assert_eq!(outcome.top_ideas_count, 0);
    assert_eq!(outcome.special_mentions_count, 0);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn special_mentions_exclude_top_set() {
    // top_n = 1 so only the best item makes the top list; lowered
    // special thresholds so the runner-up qualifies.
    let (_tmp, config) = setup_config(
        "[reports]\ntop_n = 1\nspecial_market_min = 0.3\nspecial_overall_min = 0.3\n",
    );
    let pool = setup_db(&config).await;
    let now = chrono::Utc::now().timestamp();
    let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();

    let strong = item(
        "Enterprise saas platform for payments market",
        "enterprise saas revenue customers market pricing subscription automation api niche unique",
        "forum",
        now - 3600,
    );
    let runner_up = item(
        "Workflow automation marketplace",
        "enterprise saas customers market automation workflow api",
        "github",
        now - 3600,
    );
    insert_scored(&pool, Variant::Professional, strong, now).await;
    insert_scored(&pool, Variant::Professional, runner_up, now).await;

    // Correlate so both carry a market-opportunity score.
    let window = store::scored_items_since(&pool, now - 24 * 3600).await.unwrap();
    let clusters = cluster::cluster_items(
        Variant::Professional,
        &cluster::KeywordOverlap,
        None,
        window,
    )
    .await;
    assert_eq!(clusters.len(), 1);
    let summary = correlate::summarize(None, &clusters[0]).await;
    let record = correlate::aggregate_cluster(Variant::Professional, &clusters[0], summary, now);
    correlate::persist_with_patches(&pool, &record, now).await.unwrap();

    let outcome = report::generate_daily_report(&config, &pool, date).await.unwrap();
    assert_eq!(outcome.top_ideas_count, 1);
    assert_eq!(outcome.special_mentions_count, 1);
}

#[tokio::test]
async fn high_value_count_respects_threshold() {
    let (_tmp, config) = setup_config("");
    let pool = setup_db(&config).await;

    let raw = item("Modest idea", "a small tool", "forum", 100);
    insert_scored(&pool, Variant::Basic, raw, 150).await;

    // Heuristic scores for a sparse item sit well below 0.85.
    let high = store::count_high_value(&pool, 0.85).await.unwrap();
    assert_eq!(high, 0);
    let any = store::count_high_value(&pool, 0.0).await.unwrap();
    assert_eq!(any, 1);
}
