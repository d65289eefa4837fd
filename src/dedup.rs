//! Duplicate detection.
//!
//! An existence check against storage by exact title match, falling back
//! to exact URL match. This is a read-then-write check with no
//! transactional guarantee: two collection runs executing concurrently
//! can both pass the check and double-insert. That race is a documented
//! property of the pipeline (storage is shared-mutable,
//! last-write-wins), not something this module papers over; within a
//! single run the check guarantees no two identical titles are
//! persisted.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::RawItem;

/// Returns true when an item with the same title (or, failing that, the
/// same non-empty URL) already exists.
pub async fn is_duplicate(pool: &SqlitePool, candidate: &RawItem) -> Result<bool> {
    let by_title: Option<String> = sqlx::query_scalar("SELECT id FROM items WHERE title = ?")
        .bind(&candidate.title)
        .fetch_optional(pool)
        .await?;
    if by_title.is_some() {
        return Ok(true);
    }

    if candidate.url.is_empty() {
        return Ok(false);
    }

    let by_url: Option<String> = sqlx::query_scalar("SELECT id FROM items WHERE url = ?")
        .bind(&candidate.url)
        .fetch_optional(pool)
        .await?;

    Ok(by_url.is_some())
}
