//! Ingestion validator: turns an uploaded `.json` document into a persisted
//! trace record.
//!
//! Validation order is fixed: extension, JSON well-formedness, required
//! top-level fields (`session_id`, `metadata`, `summary`), duplicate check,
//! then extraction and insert. Exactly one insert happens on success and
//! none on any failure path.

use cputrace_core::error::TraceError;
use cputrace_core::models::{NewTrace, Trace};
use cputrace_core::store;
use serde_json::Value;
use sqlx::SqlitePool;

const REQUIRED_FIELDS: [&str; 3] = ["session_id", "metadata", "summary"];

pub async fn ingest(
    pool: &SqlitePool,
    filename: &str,
    bytes: &[u8],
) -> Result<Trace, TraceError> {
    if !filename.ends_with(".json") {
        return Err(TraceError::InvalidFormat("Only .json files accepted"));
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|_| TraceError::InvalidFormat("Invalid JSON"))?;
    let doc: Value =
        serde_json::from_str(text).map_err(|_| TraceError::InvalidFormat("Invalid JSON"))?;

    for field in REQUIRED_FIELDS {
        if doc.get(field).is_none() {
            return Err(TraceError::MissingField(field));
        }
    }

    let session_id = doc["session_id"]
        .as_str()
        .ok_or(TraceError::InvalidFormat("session_id must be a string"))?;

    // Fast path only: the UNIQUE constraint in the store is the real guard,
    // and `store::insert` re-maps its violation to the same error.
    if store::find_by_session_id(pool, session_id).await?.is_some() {
        return Err(TraceError::DuplicateSession(session_id.to_string()));
    }

    store::insert(pool, extract_record(&doc, text)).await
}

/// Pure extraction from the loosely-typed document tree to the insert
/// payload. Every absent field gets its documented default; `raw_json`
/// carries the decoded upload text untouched.
pub fn extract_record(doc: &Value, raw: &str) -> NewTrace {
    let metadata = &doc["metadata"];
    let summary = &doc["summary"];

    NewTrace {
        session_id: doc["session_id"].as_str().unwrap_or_default().to_string(),
        process_name: metadata["process_name"]
            .as_str()
            .unwrap_or("unknown")
            .to_string(),
        pid: metadata["pid"].as_i64().unwrap_or(0),
        duration_sec: doc["duration_seconds"].as_i64().unwrap_or(0),
        cpu_avg: summary["cpu_avg_percent"].as_f64().unwrap_or(0.0),
        cpu_max: summary["cpu_max_percent"].as_f64().unwrap_or(0.0),
        sample_count: summary["sample_count"].as_i64().unwrap_or(0),
        start_time: doc["start_time"].as_str().unwrap_or_default().to_string(),
        raw_json: raw.to_string(),
    }
}
