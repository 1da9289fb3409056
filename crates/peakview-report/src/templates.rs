//! Built-in report templates.
//!
//! Templates are stored as `(name, content)` pairs and registered into every
//! render environment. Report kinds map onto template names as
//! `<kind>.html`; callers can shadow any entry (or add new kinds) through
//! [`EnvironmentConfig::templates`](crate::EnvironmentConfig).
//!
//! All `.html` templates render with HTML auto-escaping on. Content that
//! must land in the page unescaped goes through the `include_template` /
//! `include_local_asset` helpers or the `tojson` filter, which mark their
//! output as safe.

/// Built-in templates shipped with the crate.
///
/// Each entry is `(name, content)`.
pub const REPORT_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", BASE_TEMPLATE),
    ("table.html", TABLE_TEMPLATE),
    ("flamegraph.html", FLAMEGRAPH_TEMPLATE),
    ("style.css", STYLE_TEMPLATE),
];

/// Document skeleton shared by every report kind.
///
/// Child templates fill two blocks:
/// - `scripts`: third-party library includes (CDN links or inlined local
///   assets, depending on `use_local_assets`)
/// - `content`: the report body
///
/// The serialized payload (`reportData`, `flags`, `memoryRecords`) is
/// emitted at the end of the body so child scripts can defer to `load`.
/// `memory_records` is a one-shot sequence and is iterated exactly once
/// here.
const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>
    <style>{{ include_template("style.css") }}</style>
    {% block scripts %}{% endblock %}
  </head>
  <body>
    <header>
      <h1>{{ title }}</h1>
      <p class="run-info">
        <code>{{ metadata.command_line }}</code> (pid {{ metadata.pid }})
      </p>
      <p class="run-info">
        {{ metadata.total_allocations }} allocations over
        {{ metadata.total_frames }} frames, peak
        {{ metadata.peak_memory }} bytes,
        {{ metadata.start_time }} to {{ metadata.end_time }}
        {% if metadata.has_native_traces %}(native traces){% endif %}
      </p>
    </header>
    <main>
      {% block content %}{% endblock %}
    </main>
    <script>
      const reportData = {{ data | tojson }};
      const flags = {{ {
        "show_memory_leaks": show_memory_leaks,
        "merge_threads": merge_threads,
        "inverted": inverted
      } | tojson }};
      const memoryRecords = [{% for record in memory_records %}{% if not loop.first %},{% endif %}{{ record | tojson }}{% endfor %}];
    </script>
  </body>
</html>
"#;

/// Allocation table report.
///
/// Expects `data` to be a sequence of row objects with `thread_id`, `size`,
/// `allocator`, `n_allocations` and `stack_trace` keys.
const TABLE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block scripts %}
    {% if use_local_assets %}
    <script>{{ include_local_asset("jquery/jquery.min.js") }}</script>
    <script>{{ include_local_asset("datatables/datatables.min.js") }}</script>
    {% else %}
    <script crossorigin="anonymous" src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
    <script crossorigin="anonymous" src="https://cdn.datatables.net/1.13.8/js/jquery.dataTables.min.js"></script>
    {% endif %}
{% endblock %}
{% block content %}
    <table id="allocations" class="report-table">
      <thead>
        <tr>
          <th>Thread</th>
          <th>Size (bytes)</th>
          <th>Allocator</th>
          <th>Allocations</th>
          <th>Location</th>
        </tr>
      </thead>
      <tbody>
        {% for row in data %}
        <tr>
          <td>{{ row.thread_id }}</td>
          <td data-order="{{ row.size }}">{{ row.size }}</td>
          <td>{{ row.allocator }}</td>
          <td>{{ row.n_allocations }}</td>
          <td><code>{{ row.stack_trace }}</code></td>
        </tr>
        {% endfor %}
      </tbody>
    </table>
    <script>
      window.addEventListener("load", () => {
        $("#allocations").DataTable({ order: [[1, "desc"]] });
      });
    </script>
{% endblock %}
"##;

/// Flame graph report.
///
/// Expects `data` to be a single nested frame-tree object as produced by the
/// flame graph reporter. Orientation follows `flags.inverted`.
const FLAMEGRAPH_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block scripts %}
    {% if use_local_assets %}
    <script>{{ include_local_asset("d3/d3.min.js") }}</script>
    <script>{{ include_local_asset("d3-flame-graph/d3-flamegraph.min.js") }}</script>
    {% else %}
    <script crossorigin="anonymous" src="https://cdn.jsdelivr.net/npm/d3@7/dist/d3.min.js"></script>
    <script crossorigin="anonymous" src="https://cdn.jsdelivr.net/npm/d3-flame-graph@4/dist/d3-flamegraph.min.js"></script>
    {% endif %}
{% endblock %}
{% block content %}
    <div id="flamegraph"></div>
    <script>
      window.addEventListener("load", () => {
        const chart = flamegraph()
          .width(document.getElementById("flamegraph").clientWidth)
          .inverted(flags.inverted)
          .sort(true);
        d3.select("#flamegraph").datum(reportData).call(chart);
      });
    </script>
{% endblock %}
"##;

/// Shared stylesheet, inlined verbatim into `base.html`.
const STYLE_TEMPLATE: &str = r#"body {
  margin: 0;
  font-family: system-ui, sans-serif;
  color: #1c1e21;
}
header {
  padding: 1rem 2rem;
  border-bottom: 1px solid #d0d4d9;
  background: #f6f7f8;
}
header h1 {
  margin: 0 0 0.25rem 0;
  font-size: 1.4rem;
}
.run-info {
  margin: 0.1rem 0;
  color: #5a6068;
  font-size: 0.85rem;
}
main {
  padding: 1rem 2rem;
}
.report-table {
  width: 100%;
  border-collapse: collapse;
}
.report-table th,
.report-table td {
  padding: 0.3rem 0.6rem;
  border-bottom: 1px solid #e3e6e9;
  text-align: left;
}
#flamegraph {
  min-height: 500px;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_templates_not_empty() {
        assert!(!REPORT_TEMPLATES.is_empty());
    }

    #[test]
    fn test_report_kinds_have_html_extension() {
        for (name, _) in REPORT_TEMPLATES {
            assert!(
                name.ends_with(".html") || name.ends_with(".css"),
                "unexpected template name {}",
                name
            );
        }
    }

    #[test]
    fn test_no_duplicate_names() {
        for (i, (name, _)) in REPORT_TEMPLATES.iter().enumerate() {
            assert!(
                !REPORT_TEMPLATES[i + 1..].iter().any(|(other, _)| other == name),
                "duplicate template name {}",
                name
            );
        }
    }
}
