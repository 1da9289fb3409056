//! Local asset resolution for self-contained reports.
//!
//! When a report is rendered in local-asset mode, templates inline vendored
//! third-party JavaScript/CSS files directly into the document instead of
//! referencing a CDN. [`AssetResolver`] is the single gate through which
//! those files are read: it joins a template-supplied relative path onto a
//! fixed asset root and refuses to read anything that resolves outside it.
//!
//! # Containment
//!
//! Template-supplied paths are untrusted input. The resolver enforces
//! containment twice:
//!
//! 1. Lexically: the joined path is normalized (`.`/`..` resolution) before
//!    any filesystem access, so a request like `../../etc/passwd` is
//!    rejected as traversal even when the target does not exist.
//! 2. Physically: when the file exists, both it and the root are
//!    canonicalized and the descendant check is repeated, so a symlink
//!    inside the root cannot smuggle content from outside it.
//!
//! # Root discovery
//!
//! The default root is a `vendor/` directory next to the running executable,
//! overridable via the `PEAKVIEW_VENDOR_DIR` environment variable. A missing
//! root is reported as [`AssetError::RootMissing`], a configuration error
//! distinct from a missing file.

use std::env;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::AssetError;

/// Environment variable overriding the vendored asset directory.
pub const VENDOR_DIR_ENV: &str = "PEAKVIEW_VENDOR_DIR";

/// Returns the default vendored asset directory.
///
/// Resolution order:
///
/// 1. The `PEAKVIEW_VENDOR_DIR` environment variable, if set and non-empty
/// 2. `vendor/` next to the current executable
/// 3. `vendor/` relative to the working directory, as a last resort
pub fn default_asset_root() -> PathBuf {
    if let Ok(dir) = env::var(VENDOR_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("vendor")))
        .unwrap_or_else(|| PathBuf::from("vendor"))
}

/// Resolves template-supplied asset paths under a fixed root directory.
///
/// The resolver holds no open handles and caches nothing: every
/// [`resolve`](Self::resolve) call re-reads the file from disk.
///
/// # Example
///
/// ```rust,ignore
/// let resolver = AssetResolver::new("/opt/peakview/vendor");
/// let source = resolver.resolve("d3/d3.min.js")?;
/// ```
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    /// Creates a resolver rooted at the given directory.
    ///
    /// The directory is not required to exist yet; existence is checked on
    /// each [`resolve`](Self::resolve) call so that a root installed after
    /// construction is picked up without rebuilding the resolver.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configured asset root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the asset at `relative_path` under the root and returns its
    /// contents as text.
    ///
    /// Leading path separators are stripped from the request before joining,
    /// so templates may write either `d3/d3.min.js` or `/d3/d3.min.js`.
    ///
    /// # Errors
    ///
    /// - [`AssetError::RootMissing`] if the root directory does not exist
    /// - [`AssetError::Traversal`] if the request resolves outside the root
    /// - [`AssetError::NotFound`] if the resolved file does not exist
    /// - [`AssetError::Read`] for any other I/O failure
    pub fn resolve(&self, relative_path: &str) -> Result<String, AssetError> {
        if !self.root.is_dir() {
            return Err(AssetError::RootMissing {
                root: self.root.clone(),
            });
        }

        let trimmed = relative_path.trim_start_matches(['/', '\\']);
        let requested = normalize(&self.root.join(trimmed));
        if !requested.starts_with(normalize(&self.root)) {
            return Err(AssetError::Traversal {
                path: PathBuf::from(relative_path),
            });
        }

        debug!(path = %requested.display(), "reading local asset");

        match std::fs::canonicalize(&requested) {
            Ok(canonical) => {
                // The lexical check above cannot see symlinks; repeat the
                // containment check on the real path.
                let canonical_root =
                    std::fs::canonicalize(&self.root).map_err(|source| AssetError::Read {
                        path: self.root.clone(),
                        source,
                    })?;
                if !canonical.starts_with(&canonical_root) {
                    return Err(AssetError::Traversal {
                        path: PathBuf::from(relative_path),
                    });
                }
                std::fs::read_to_string(&canonical).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        AssetError::NotFound { path: requested }
                    } else {
                        AssetError::Read {
                            path: canonical,
                            source,
                        }
                    }
                })
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound { path: requested })
            }
            Err(source) => Err(AssetError::Read {
                path: requested,
                source,
            }),
        }
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn vendor_with_file(name: &str, content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        dir
    }

    #[test]
    fn test_resolve_reads_file() {
        let dir = vendor_with_file("d3/d3.min.js", "var d3 = {};");
        let resolver = AssetResolver::new(dir.path());
        assert_eq!(resolver.resolve("d3/d3.min.js").unwrap(), "var d3 = {};");
    }

    #[test]
    fn test_resolve_strips_leading_separators() {
        let dir = vendor_with_file("lib.js", "ok");
        let resolver = AssetResolver::new(dir.path());
        assert_eq!(resolver.resolve("/lib.js").unwrap(), "ok");
        assert_eq!(resolver.resolve("//lib.js").unwrap(), "ok");
    }

    #[test]
    fn test_resolve_missing_root() {
        let dir = TempDir::new().unwrap();
        let resolver = AssetResolver::new(dir.path().join("nope"));
        let err = resolver.resolve("lib.js").unwrap_err();
        assert!(matches!(err, AssetError::RootMissing { .. }));
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = vendor_with_file("present.js", "ok");
        let resolver = AssetResolver::new(dir.path());
        let err = resolver.resolve("absent.js").unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_rejects_parent_traversal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vendor");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let resolver = AssetResolver::new(&root);
        let err = resolver.resolve("../secret.txt").unwrap_err();
        assert!(matches!(err, AssetError::Traversal { .. }));
    }

    #[test]
    fn test_resolve_rejects_nested_traversal() {
        let dir = vendor_with_file("d3/d3.min.js", "ok");
        let resolver = AssetResolver::new(dir.path());
        // Escapes even though it starts with a valid subdirectory
        let err = resolver.resolve("d3/../../../etc/passwd").unwrap_err();
        assert!(matches!(err, AssetError::Traversal { .. }));
    }

    #[test]
    fn test_resolve_rejects_nonexistent_traversal_as_traversal() {
        // A request outside the root is traversal, not "not found", even
        // when the target does not exist.
        let dir = vendor_with_file("lib.js", "ok");
        let resolver = AssetResolver::new(dir.path());
        let err = resolver.resolve("../../no/such/file").unwrap_err();
        assert!(matches!(err, AssetError::Traversal { .. }));
    }

    #[test]
    fn test_resolve_allows_interior_dotdot() {
        let dir = vendor_with_file("lib.js", "ok");
        let resolver = AssetResolver::new(dir.path());
        assert_eq!(resolver.resolve("d3/../lib.js").unwrap(), "ok");
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vendor");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("outside.txt"), "outside").unwrap();
        std::os::unix::fs::symlink(dir.path().join("outside.txt"), root.join("inside.js"))
            .unwrap();

        let resolver = AssetResolver::new(&root);
        let err = resolver.resolve("inside.js").unwrap_err();
        assert!(matches!(err, AssetError::Traversal { .. }));
    }

    #[test]
    fn test_resolve_rereads_on_each_call() {
        let dir = vendor_with_file("lib.js", "version 1");
        let resolver = AssetResolver::new(dir.path());
        assert_eq!(resolver.resolve("lib.js").unwrap(), "version 1");

        fs::write(dir.path().join("lib.js"), "version 2").unwrap();
        assert_eq!(resolver.resolve("lib.js").unwrap(), "version 2");
    }

    #[test]
    #[serial]
    fn test_default_root_env_override() {
        env::set_var(VENDOR_DIR_ENV, "/tmp/custom-vendor");
        assert_eq!(default_asset_root(), PathBuf::from("/tmp/custom-vendor"));
        env::remove_var(VENDOR_DIR_ENV);
    }

    #[test]
    #[serial]
    fn test_default_root_without_override() {
        env::remove_var(VENDOR_DIR_ENV);
        let root = default_asset_root();
        assert!(root.ends_with("vendor"));
    }
}
