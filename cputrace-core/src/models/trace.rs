use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted trace record. Immutable once inserted; `raw_json` holds the
/// verbatim text of the original upload, independent of how the summary
/// fields were defaulted during extraction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trace {
    pub id: i64,
    pub session_id: String,
    pub process_name: String,
    pub pid: i64,
    pub duration_sec: i64,
    pub cpu_avg: f64,
    pub cpu_max: f64,
    pub sample_count: i64,
    pub start_time: String,
    pub raw_json: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload: everything the client supplies (or that extraction
/// defaulted). `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTrace {
    pub session_id: String,
    pub process_name: String,
    pub pid: i64,
    pub duration_sec: i64,
    pub cpu_avg: f64,
    pub cpu_max: f64,
    pub sample_count: i64,
    pub start_time: String,
    pub raw_json: String,
}

/// Response shape for listings and upload acknowledgement — the record
/// without its raw document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub id: i64,
    pub session_id: String,
    pub process_name: String,
    pub pid: i64,
    pub duration_sec: i64,
    pub cpu_avg: f64,
    pub cpu_max: f64,
    pub sample_count: i64,
    pub start_time: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Summary plus the verbatim original upload text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDetail {
    pub id: i64,
    pub session_id: String,
    pub process_name: String,
    pub pid: i64,
    pub duration_sec: i64,
    pub cpu_avg: f64,
    pub cpu_max: f64,
    pub sample_count: i64,
    pub start_time: String,
    pub created_at: Option<DateTime<Utc>>,
    pub raw_json: String,
}

impl From<Trace> for TraceSummary {
    fn from(t: Trace) -> Self {
        Self {
            id: t.id,
            session_id: t.session_id,
            process_name: t.process_name,
            pid: t.pid,
            duration_sec: t.duration_sec,
            cpu_avg: t.cpu_avg,
            cpu_max: t.cpu_max,
            sample_count: t.sample_count,
            start_time: t.start_time,
            created_at: t.created_at,
        }
    }
}

impl From<Trace> for TraceDetail {
    fn from(t: Trace) -> Self {
        Self {
            id: t.id,
            session_id: t.session_id,
            process_name: t.process_name,
            pid: t.pid,
            duration_sec: t.duration_sec,
            cpu_avg: t.cpu_avg,
            cpu_max: t.cpu_max,
            sample_count: t.sample_count,
            start_time: t.start_time,
            created_at: t.created_at,
            raw_json: t.raw_json,
        }
    }
}
