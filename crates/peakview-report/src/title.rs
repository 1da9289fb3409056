//! Report title formatting.

/// Builds the human-readable title for a report document.
///
/// `kind` is expected pre-normalized (underscores already replaced with
/// spaces) by the caller.
///
/// ```rust
/// use peakview_report::format_report_title;
///
/// assert_eq!(format_report_title("flamegraph", false, false), "flamegraph report");
/// assert_eq!(
///     format_report_title("flamegraph", true, true),
///     "inverted flamegraph report (memory leaks)"
/// );
/// ```
pub fn format_report_title(kind: &str, show_memory_leaks: bool, inverted: bool) -> String {
    let mut parts = Vec::new();
    if inverted {
        parts.push("inverted");
    }
    parts.push(kind);
    parts.push("report");
    if show_memory_leaks {
        parts.push("(memory leaks)");
    }
    parts.join(" ")
}
