//! Pass-through value types forwarded to templates.
//!
//! The renderer never interprets these: they are serialized into the render
//! context unmodified, and their meaning belongs to the reporters that
//! produce them and the templates that consume them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Descriptor of the profiling run a report was generated from.
///
/// Read-only from this crate's perspective; templates display it in the
/// report header.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// The profiled command line, as invoked.
    pub command_line: String,
    /// PID of the profiled process.
    pub pid: u32,
    /// When tracking started.
    pub start_time: DateTime<Utc>,
    /// When tracking ended.
    pub end_time: DateTime<Utc>,
    /// Total number of allocations recorded.
    pub total_allocations: u64,
    /// Total number of stack frames recorded.
    pub total_frames: u64,
    /// Peak resident memory in bytes.
    pub peak_memory: u64,
    /// Whether native (non-interpreted) stacks were captured.
    pub has_native_traces: bool,
    /// Name of the allocator in use.
    pub allocator: String,
}

/// A point on the memory usage timeline.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemorySnapshot {
    /// Milliseconds since the epoch.
    pub time_ms: u64,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
    /// Heap memory in bytes.
    pub heap_bytes: u64,
}

/// The report payload handed to the template.
///
/// Shape is template-specific: the flame graph template expects a single
/// nested frame-tree object, the table template a sequence of row objects.
/// Opaque to the renderer either way.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportData {
    /// A single JSON object.
    Single(serde_json::Map<String, serde_json::Value>),
    /// An ordered sequence of JSON objects.
    Sequence(Vec<serde_json::Map<String, serde_json::Value>>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_data_serializes_transparently() {
        let mut row = serde_json::Map::new();
        row.insert("size".to_string(), serde_json::json!(1024));

        let single = serde_json::to_value(ReportData::Single(row.clone())).unwrap();
        assert_eq!(single, serde_json::json!({"size": 1024}));

        let sequence = serde_json::to_value(ReportData::Sequence(vec![row])).unwrap();
        assert_eq!(sequence, serde_json::json!([{"size": 1024}]));
    }
}
