//! Record store: insert, point lookups, and the newest-first range scan over
//! the `traces` table. All mutation is append-only; there is no update or
//! delete path.

use crate::error::TraceError;
use crate::models::{NewTrace, Trace};
use chrono::Utc;
use sqlx::SqlitePool;

/// Persist a new trace, assigning `id` and `created_at`.
///
/// The UNIQUE constraint on `session_id` is the authoritative duplicate
/// guard: callers may (and do) run an existence check first, but two
/// concurrent uploads can both pass it, so a constraint violation from the
/// database is re-mapped to `DuplicateSession` here rather than surfacing
/// as a generic storage error.
pub async fn insert(pool: &SqlitePool, new: NewTrace) -> Result<Trace, TraceError> {
    let created_at = Utc::now();

    let result = sqlx::query_as::<_, Trace>(
        r#"
        INSERT INTO traces
            (session_id, process_name, pid, duration_sec, cpu_avg, cpu_max,
             sample_count, start_time, raw_json, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING *
        "#,
    )
    .bind(&new.session_id)
    .bind(&new.process_name)
    .bind(new.pid)
    .bind(new.duration_sec)
    .bind(new.cpu_avg)
    .bind(new.cpu_max)
    .bind(new.sample_count)
    .bind(&new.start_time)
    .bind(&new.raw_json)
    .bind(created_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(trace) => {
            tracing::info!(id = trace.id, session_id = %trace.session_id, "trace stored");
            Ok(trace)
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(TraceError::DuplicateSession(new.session_id))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_session_id(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Option<Trace>, TraceError> {
    let trace = sqlx::query_as::<_, Trace>("SELECT * FROM traces WHERE session_id = ?1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(trace)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Trace>, TraceError> {
    let trace = sqlx::query_as::<_, Trace>("SELECT * FROM traces WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(trace)
}

/// Newest-first scan. `id DESC` breaks ties between records created within
/// the same timestamp granule; ids increase in insertion order, so the
/// combined order is strictly newest-first. `skip`/`limit` are taken as
/// given — no clamping.
pub async fn list(pool: &SqlitePool, skip: i64, limit: i64) -> Result<Vec<Trace>, TraceError> {
    let traces = sqlx::query_as::<_, Trace>(
        "SELECT * FROM traces ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db;

    async fn memory_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = db::create_pool(&config).await.unwrap();
        db::init_schema(&pool).await.unwrap();
        pool
    }

    fn sample(session_id: &str) -> NewTrace {
        NewTrace {
            session_id: session_id.to_string(),
            process_name: "stress-ng".to_string(),
            pid: 4321,
            duration_sec: 60,
            cpu_avg: 42.5,
            cpu_max: 97.1,
            sample_count: 600,
            start_time: "2026-08-25T10:00:00Z".to_string(),
            raw_json: format!("{{\"session_id\":\"{session_id}\"}}"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_created_at() {
        let pool = memory_pool().await;

        let a = insert(&pool, sample("s-a")).await.unwrap();
        let b = insert(&pool, sample("s-b")).await.unwrap();

        assert!(a.id >= 1);
        assert!(b.id > a.id, "ids must increase in insertion order");
        assert!(a.created_at.is_some());
        assert_eq!(a.process_name, "stress-ng");
    }

    #[tokio::test]
    async fn duplicate_session_id_maps_to_domain_error() {
        let pool = memory_pool().await;

        insert(&pool, sample("dup")).await.unwrap();
        let err = insert(&pool, sample("dup")).await.unwrap_err();

        match err {
            TraceError::DuplicateSession(sid) => assert_eq!(sid, "dup"),
            other => panic!("expected DuplicateSession, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn point_lookups() {
        let pool = memory_pool().await;
        let stored = insert(&pool, sample("lookup")).await.unwrap();

        let by_id = find_by_id(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(by_id.session_id, "lookup");

        let by_session = find_by_session_id(&pool, "lookup").await.unwrap().unwrap();
        assert_eq!(by_session.id, stored.id);

        assert!(find_by_id(&pool, 99999).await.unwrap().is_none());
        assert!(find_by_session_id(&pool, "absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_with_skip_and_limit() {
        let pool = memory_pool().await;
        insert(&pool, sample("a")).await.unwrap();
        insert(&pool, sample("b")).await.unwrap();
        insert(&pool, sample("c")).await.unwrap();

        let first_page = list(&pool, 0, 2).await.unwrap();
        let sids: Vec<&str> = first_page.iter().map(|t| t.session_id.as_str()).collect();
        assert_eq!(sids, ["c", "b"]);

        let second_page = list(&pool, 1, 2).await.unwrap();
        let sids: Vec<&str> = second_page.iter().map(|t| t.session_id.as_str()).collect();
        assert_eq!(sids, ["b", "a"]);

        assert!(list(&pool, 3, 2).await.unwrap().is_empty());
    }
}
