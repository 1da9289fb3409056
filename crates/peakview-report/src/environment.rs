//! The cached template environment.
//!
//! [`ReportEnvironment`] wraps a [`minijinja::Environment`] configured for
//! report rendering: a loader over the built-in template set (plus any
//! caller-supplied overrides), the two asset-inclusion helper functions, and
//! a deterministic `tojson` filter. Construction is infallible; template
//! compilation happens lazily at lookup time.
//!
//! # Shared instance
//!
//! Most callers go through [`get_render_environment`], which lazily
//! constructs one environment per process and hands out the same instance to
//! every caller. Construction is guarded so concurrent first calls cannot
//! race; after construction the environment is read-only and safe for
//! concurrent renders.
//!
//! Tests that need fresh construction call [`reset_render_environment`], or
//! sidestep the shared instance entirely by building their own environment:
//!
//! ```rust
//! use peakview_report::{EnvironmentConfig, ReportEnvironment};
//!
//! let env = ReportEnvironment::new(EnvironmentConfig {
//!     asset_root: "/tmp/vendor".into(),
//!     ..EnvironmentConfig::default()
//! });
//! assert!(env.has_template("table.html"));
//! ```
//!
//! # Template helper functions
//!
//! - `include_template(name)`: the named template's raw source, marked
//!   HTML-safe, for inlining one template's literal text inside another
//!   (e.g. a stylesheet).
//! - `include_local_asset(path)`: a vendored file's contents resolved via
//!   [`AssetResolver`], marked HTML-safe. Resolution failures propagate out
//!   of the render call as typed [`AssetError`](crate::AssetError) values;
//!   they are never flattened into page text.
//!
//! # Deterministic serialization
//!
//! The `tojson` filter emits object keys in sorted order with compact
//! separators, so rendering identical input twice produces byte-identical
//! documents. `<`, `>`, `&` and `'` are emitted as `\uXXXX` escapes so the
//! output is safe inside `<script>` blocks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use minijinja::{Environment, ErrorKind, Value};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::assets::{default_asset_root, AssetResolver};
use crate::error::RenderError;
use crate::templates::REPORT_TEMPLATES;

/// Configuration for constructing a [`ReportEnvironment`].
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Root directory of vendored third-party assets (local-asset mode).
    pub asset_root: PathBuf,

    /// Additional templates as `(name, content)` pairs.
    ///
    /// Entries shadow built-in templates with the same name, and new names
    /// register new report kinds.
    pub templates: Vec<(String, String)>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            templates: Vec::new(),
        }
    }
}

/// A template environment configured for report rendering.
///
/// Immutable after construction. See the [module docs](self) for the
/// registered helpers and filters.
pub struct ReportEnvironment {
    env: Environment<'static>,
}

impl ReportEnvironment {
    /// Constructs an environment from the given configuration.
    pub fn new(config: EnvironmentConfig) -> Self {
        debug!(asset_root = %config.asset_root.display(), "constructing report environment");

        let mut sources: HashMap<String, String> = REPORT_TEMPLATES
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();
        for (name, content) in config.templates {
            sources.insert(name, content);
        }
        let sources = Arc::new(sources);
        let resolver = Arc::new(AssetResolver::new(config.asset_root));

        let mut env = Environment::new();

        {
            let sources = Arc::clone(&sources);
            env.set_loader(move |name| Ok(sources.get(name).cloned()));
        }

        {
            let sources = Arc::clone(&sources);
            env.add_function(
                "include_template",
                move |name: String| -> Result<Value, minijinja::Error> {
                    match sources.get(&name) {
                        Some(source) => Ok(Value::from_safe_string(source.clone())),
                        None => Err(minijinja::Error::new(
                            ErrorKind::TemplateNotFound,
                            format!("no template named {:?}", name),
                        )),
                    }
                },
            );
        }

        env.add_function(
            "include_local_asset",
            move |path: String| -> Result<Value, minijinja::Error> {
                match resolver.resolve(&path) {
                    Ok(content) => Ok(Value::from_safe_string(content)),
                    Err(err) => Err(minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        format!("cannot inline local asset {:?}", path),
                    )
                    .with_source(err)),
                }
            },
        );

        env.add_filter("tojson", tojson_sorted);

        Self { env }
    }

    /// Renders the named template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TemplateNotFound`] for unknown names; template
    /// evaluation failures map per [`RenderError`]'s `From<minijinja::Error>`.
    pub fn render(&self, name: &str, ctx: Value) -> Result<String, RenderError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }

    /// Checks whether a template with the given name is registered.
    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}

/// Serializes a value as JSON with sorted keys and compact separators.
///
/// Registered as the `tojson` filter, shadowing the engine's built-in so
/// that embedded payloads are byte-for-byte reproducible regardless of map
/// iteration order.
fn tojson_sorted(value: Value) -> Result<Value, minijinja::Error> {
    let json = serde_json::to_value(&value).map_err(|err| {
        minijinja::Error::new(ErrorKind::BadSerialization, "value is not JSON-serializable")
            .with_source(err)
    })?;
    let payload = serde_json::to_string(&sort_keys(json)).map_err(|err| {
        minijinja::Error::new(ErrorKind::BadSerialization, "cannot serialize value to JSON")
            .with_source(err)
    })?;
    // Escape for safe embedding inside <script> before marking as safe.
    let payload = payload
        .replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\'', "\\u0027");
    Ok(Value::from_safe_string(payload))
}

/// Rebuilds JSON objects with entries inserted in key order.
///
/// Sorting is done explicitly rather than relying on the serializer's map
/// type, which changes iteration order when the `preserve_order` feature is
/// enabled anywhere in the dependency graph.
fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(String, serde_json::Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (key, child) in entries {
                sorted.insert(key, sort_keys(child));
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sort_keys).collect())
        }
        other => other,
    }
}

static SHARED_ENVIRONMENT: Lazy<Mutex<Option<Arc<ReportEnvironment>>>> =
    Lazy::new(|| Mutex::new(None));

/// Returns the process-wide render environment, constructing it on first use.
///
/// Every call observes the same instance (`Arc::ptr_eq`) until
/// [`reset_render_environment`] is called. The default configuration is
/// used; callers needing a custom asset root or template overrides should
/// construct a [`ReportEnvironment`] themselves and render through
/// [`render_report_with`](crate::render_report_with).
pub fn get_render_environment() -> Arc<ReportEnvironment> {
    let mut slot = SHARED_ENVIRONMENT.lock().unwrap();
    slot.get_or_insert_with(|| Arc::new(ReportEnvironment::new(EnvironmentConfig::default())))
        .clone()
}

/// Drops the cached environment so the next call to
/// [`get_render_environment`] constructs a fresh one.
///
/// Intended for test suites exercising first-construction behavior;
/// production code has no reason to call this. Combine with
/// `serial_test::serial` in tests, since the cache is process-wide.
pub fn reset_render_environment() {
    let mut slot = SHARED_ENVIRONMENT.lock().unwrap();
    *slot = None;
}
