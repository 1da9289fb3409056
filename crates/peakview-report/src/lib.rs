//! # Peakview Report - HTML Report Rendering
//!
//! `peakview-report` turns an in-memory profiling snapshot (allocation
//! records, run metadata, memory timeline) into a self-contained HTML
//! document. It is the rendering layer of the `peakview` memory profiler,
//! but has no dependency on capture or analysis: callers hand it
//! already-computed report data and get back text.
//!
//! ## Core Concepts
//!
//! - [`render_report`]: render a report kind (`"table"`, `"flamegraph"`)
//!   into document text
//! - [`ReportEnvironment`]: the cached template environment; one shared
//!   instance per process via [`get_render_environment`], or construct your
//!   own for dependency injection
//! - [`AssetResolver`]: reads vendored third-party JS/CSS for local-asset
//!   mode, refusing paths that escape the asset root
//! - [`RenderError`] / [`AssetError`]: typed failures — errors are surfaced
//!   to the caller, never embedded in the rendered page
//!
//! ## Asset modes
//!
//! Each render call picks exactly one of two asset strategies:
//!
//! - **Remote** (default): templates emit `<script src=...>` CDN links and
//!   the document requires network access to display.
//! - **Local** (`use_local_assets: true`): templates inline the vendored
//!   libraries verbatim, producing a document that works offline. Requires
//!   the vendored asset directory to be installed (see
//!   [`default_asset_root`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use peakview_report::{render_report, ReportData, ReportMetadata, ReportParams};
//!
//! let metadata = ReportMetadata {
//!     command_line: "python bench.py".to_string(),
//!     pid: 1234,
//!     start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
//!     end_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 1, 0).unwrap(),
//!     total_allocations: 1000,
//!     total_frames: 50,
//!     peak_memory: 64 * 1024 * 1024,
//!     has_native_traces: false,
//!     allocator: "pymalloc".to_string(),
//! };
//!
//! let frame_tree = serde_json::json!({
//!     "name": "<root>",
//!     "value": 1000,
//!     "children": [],
//! });
//! let data = ReportData::Single(frame_tree.as_object().cloned().unwrap());
//!
//! let params = ReportParams::new("flamegraph", metadata);
//! let html = render_report(&params, &data, std::iter::empty()).unwrap();
//! assert!(html.contains("flamegraph report"));
//! ```
//!
//! ## Determinism
//!
//! Embedded JSON is serialized with sorted keys and compact separators, so
//! rendering identical input twice produces byte-identical documents —
//! reports can be snapshot-tested.

mod assets;
mod environment;
mod error;
mod model;
mod report;
mod templates;
mod title;

// Error types
pub use error::{AssetError, RenderError};

// Asset resolution
pub use assets::{default_asset_root, AssetResolver, VENDOR_DIR_ENV};

// Render environment
pub use environment::{
    get_render_environment, reset_render_environment, EnvironmentConfig, ReportEnvironment,
};

// Data model
pub use model::{MemorySnapshot, ReportData, ReportMetadata};

// Rendering entry points
pub use report::{render_report, render_report_with, ReportParams};

// Built-in templates
pub use templates::REPORT_TEMPLATES;

// Title formatting
pub use title::format_report_title;
