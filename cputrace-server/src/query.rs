//! Read side: paged summary listings and by-id detail retrieval.

use cputrace_core::error::TraceError;
use cputrace_core::models::{TraceDetail, TraceSummary};
use cputrace_core::store;
use sqlx::SqlitePool;

pub const DEFAULT_LIMIT: i64 = 20;

/// Newest-first page of summaries. `skip`/`limit` are passed through to the
/// store as given.
pub async fn list_summaries(
    pool: &SqlitePool,
    skip: i64,
    limit: i64,
) -> Result<Vec<TraceSummary>, TraceError> {
    let traces = store::list(pool, skip, limit).await?;
    Ok(traces.into_iter().map(TraceSummary::from).collect())
}

pub async fn get_detail(pool: &SqlitePool, id: i64) -> Result<TraceDetail, TraceError> {
    match store::find_by_id(pool, id).await? {
        Some(trace) => Ok(trace.into()),
        None => Err(TraceError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest;
    use cputrace_core::config::DatabaseConfig;
    use cputrace_core::db;
    use serde_json::json;

    async fn memory_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = db::create_pool(&config).await.unwrap();
        db::init_schema(&pool).await.unwrap();
        pool
    }

    async fn upload(pool: &SqlitePool, session_id: &str) -> i64 {
        let doc = json!({
            "session_id": session_id,
            "metadata": {"process_name": "proc", "pid": 1},
            "summary": {"sample_count": 10}
        })
        .to_string();
        ingest::ingest(pool, "t.json", doc.as_bytes())
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn get_detail_round_trips_summary_fields() {
        let pool = memory_pool().await;
        let id = upload(&pool, "q1").await;

        let detail = get_detail(&pool, id).await.unwrap();
        assert_eq!(detail.id, id);
        assert_eq!(detail.session_id, "q1");
        assert_eq!(detail.process_name, "proc");
        assert!(detail.raw_json.contains("\"session_id\":\"q1\""));
    }

    #[tokio::test]
    async fn get_detail_absent_is_not_found() {
        let pool = memory_pool().await;
        let err = get_detail(&pool, 99999).await.unwrap_err();
        assert!(matches!(err, TraceError::NotFound));
    }

    #[tokio::test]
    async fn list_summaries_excludes_raw_and_pages_newest_first() {
        let pool = memory_pool().await;
        upload(&pool, "a").await;
        upload(&pool, "b").await;
        upload(&pool, "c").await;

        let page = list_summaries(&pool, 0, 2).await.unwrap();
        let sids: Vec<&str> = page.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(sids, ["c", "b"]);

        let page = list_summaries(&pool, 1, 2).await.unwrap();
        let sids: Vec<&str> = page.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(sids, ["b", "a"]);
    }
}
