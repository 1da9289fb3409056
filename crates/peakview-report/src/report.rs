//! Report rendering orchestration.
//!
//! [`render_report`] is the crate's main entry point: it selects a template
//! by report kind, assembles the per-call render context, and returns the
//! rendered document text. Persistence is the caller's job; nothing here
//! writes to a sink.

use minijinja::{context, Value};
use tracing::debug;

use crate::environment::{get_render_environment, ReportEnvironment};
use crate::error::RenderError;
use crate::model::{MemorySnapshot, ReportData, ReportMetadata};
use crate::title::format_report_title;

/// Per-report display parameters.
///
/// `use_local_assets` defaults to false (CDN links); pass true to inline
/// vendored JavaScript/CSS into the document instead. The two modes are
/// mutually exclusive within one document.
#[derive(Debug, Clone)]
pub struct ReportParams {
    /// Report kind; selects the `<kind>.html` template.
    pub kind: String,
    /// Descriptor of the profiling run.
    pub metadata: ReportMetadata,
    /// Show leaked (still-live) allocations instead of peak usage.
    pub show_memory_leaks: bool,
    /// Merge allocations across threads.
    pub merge_threads: bool,
    /// Render the flame graph root-down.
    pub inverted: bool,
    /// Inline vendored assets instead of emitting CDN links.
    pub use_local_assets: bool,
}

impl ReportParams {
    /// Creates parameters for the given kind and metadata with all display
    /// flags off.
    pub fn new(kind: impl Into<String>, metadata: ReportMetadata) -> Self {
        Self {
            kind: kind.into(),
            metadata,
            show_memory_leaks: false,
            merge_threads: false,
            inverted: false,
            use_local_assets: false,
        }
    }
}

/// Renders a report document using the process-wide environment.
///
/// Fetches the cached [`ReportEnvironment`] (constructing it on first use)
/// and delegates to [`render_report_with`].
///
/// `memory_records` is forwarded to the template as a one-shot sequence: it
/// is not buffered, and templates may iterate it at most once.
///
/// # Errors
///
/// - [`RenderError::TemplateNotFound`] for an unknown report kind
/// - [`RenderError::Asset`] when local-asset mode is requested and an asset
///   cannot be inlined (missing root, traversal, missing file, read failure)
/// - [`RenderError::Template`] / [`RenderError::Serialization`] for template
///   evaluation and data serialization failures
pub fn render_report<I>(
    params: &ReportParams,
    data: &ReportData,
    memory_records: I,
) -> Result<String, RenderError>
where
    I: Iterator<Item = MemorySnapshot> + Send + Sync + 'static,
{
    let env = get_render_environment();
    render_report_with(&env, params, data, memory_records)
}

/// Renders a report document against an explicit environment.
///
/// Use this instead of [`render_report`] when the environment is held in a
/// dependency-injection container or constructed with a custom
/// [`EnvironmentConfig`](crate::EnvironmentConfig) (tests do this with
/// temporary asset roots).
pub fn render_report_with<I>(
    env: &ReportEnvironment,
    params: &ReportParams,
    data: &ReportData,
    memory_records: I,
) -> Result<String, RenderError>
where
    I: Iterator<Item = MemorySnapshot> + Send + Sync + 'static,
{
    debug!(
        kind = %params.kind,
        use_local_assets = params.use_local_assets,
        "rendering report"
    );

    // Underscores become spaces in the title; the raw kind names the template.
    let pretty_kind = params.kind.replace('_', " ");
    let title = format_report_title(&pretty_kind, params.show_memory_leaks, params.inverted);

    let records = Value::make_one_shot_iterator(memory_records.map(Value::from_serialize));
    let ctx = context! {
        kind => pretty_kind,
        title => title,
        data => Value::from_serialize(data),
        metadata => Value::from_serialize(&params.metadata),
        memory_records => records,
        show_memory_leaks => params.show_memory_leaks,
        merge_threads => params.merge_threads,
        inverted => params.inverted,
        use_local_assets => params.use_local_assets,
    };

    env.render(&format!("{}.html", params.kind), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentConfig;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::path::PathBuf;

    fn sample_metadata() -> ReportMetadata {
        ReportMetadata {
            command_line: "python bench.py --size 512".to_string(),
            pid: 4321,
            start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 42).unwrap(),
            total_allocations: 12_345,
            total_frames: 678,
            peak_memory: 104_857_600,
            has_native_traces: false,
            allocator: "pymalloc".to_string(),
        }
    }

    fn test_env(extra: Vec<(String, String)>) -> ReportEnvironment {
        ReportEnvironment::new(EnvironmentConfig {
            asset_root: PathBuf::from("/nonexistent"),
            templates: extra,
        })
    }

    #[test]
    fn test_kind_normalization_applies_to_title_only() {
        let env = test_env(vec![(
            "memory_summary.html".to_string(),
            "{{ kind }}|{{ title }}".to_string(),
        )]);
        let params = ReportParams::new("memory_summary", sample_metadata());
        let out = render_report_with(
            &env,
            &params,
            &ReportData::Single(serde_json::Map::new()),
            std::iter::empty(),
        )
        .unwrap();
        assert_eq!(out, "memory summary|memory summary report");
    }

    #[test]
    fn test_unknown_kind_fails_without_output() {
        let env = test_env(Vec::new());
        let params = ReportParams::new("nonexistent", sample_metadata());
        let err = render_report_with(
            &env,
            &params,
            &ReportData::Single(serde_json::Map::new()),
            std::iter::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }

    #[test]
    fn test_memory_records_are_forwarded_in_order() {
        let env = test_env(vec![(
            "timeline.html".to_string(),
            "{% for r in memory_records %}{{ r.rss_bytes }};{% endfor %}".to_string(),
        )]);
        let params = ReportParams::new("timeline", sample_metadata());
        let records = vec![
            MemorySnapshot {
                time_ms: 0,
                rss_bytes: 100,
                heap_bytes: 60,
            },
            MemorySnapshot {
                time_ms: 10,
                rss_bytes: 200,
                heap_bytes: 120,
            },
        ];
        let out = render_report_with(
            &env,
            &params,
            &ReportData::Single(serde_json::Map::new()),
            records.into_iter(),
        )
        .unwrap();
        assert_eq!(out, "100;200;");
    }

    #[test]
    fn test_flags_reach_the_template() {
        let env = test_env(vec![(
            "flags.html".to_string(),
            "{{ show_memory_leaks }},{{ merge_threads }},{{ inverted }},{{ use_local_assets }}"
                .to_string(),
        )]);
        let mut params = ReportParams::new("flags", sample_metadata());
        params.show_memory_leaks = true;
        params.inverted = true;
        let out = render_report_with(
            &env,
            &params,
            &ReportData::Single(serde_json::Map::new()),
            std::iter::empty(),
        )
        .unwrap();
        assert_eq!(out, "true,false,true,false");
    }
}
