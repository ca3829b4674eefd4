mod trace;

pub use trace::{NewTrace, Trace, TraceDetail, TraceSummary};
