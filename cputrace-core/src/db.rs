use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Single table of trace records. `session_id` uniqueness is enforced here,
/// at the storage layer — the ingest-side existence check is only a fast
/// path for a better error message (see `store::insert`).
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS traces (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id    TEXT    NOT NULL UNIQUE,
    process_name  TEXT    NOT NULL DEFAULT 'unknown',
    pid           INTEGER NOT NULL DEFAULT 0,
    duration_sec  INTEGER NOT NULL DEFAULT 0,
    cpu_avg       REAL    NOT NULL DEFAULT 0.0,
    cpu_max       REAL    NOT NULL DEFAULT 0.0,
    sample_count  INTEGER NOT NULL DEFAULT 0,
    start_time    TEXT    NOT NULL DEFAULT '',
    raw_json      TEXT    NOT NULL,
    created_at    TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_traces_created_at ON traces(created_at DESC);
"#;

pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    // An in-memory database exists per connection; a single connection keeps
    // every handler looking at the same store.
    let max_connections = if config.url.contains(":memory:") {
        1
    } else {
        config.max_connections
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

pub async fn health_check(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT sqlite_version()")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
