//! Error types for report rendering.
//!
//! This module provides [`RenderError`], the primary error type for all
//! rendering operations, and [`AssetError`], the failure taxonomy of the
//! local asset resolver. Both abstract over the underlying template engine's
//! errors, providing a stable public API.

use std::fmt;
use std::path::PathBuf;

use crate::assets::VENDOR_DIR_ENV;

/// Error type for local asset resolution.
///
/// Every variant is surfaced to the caller of the render operation; asset
/// failures are never turned into text inside the rendered document.
#[derive(Debug)]
pub enum AssetError {
    /// The vendored asset directory does not exist at all.
    ///
    /// This is a setup problem, not a missing file: the bundled assets were
    /// never installed (or the override points at the wrong place).
    RootMissing {
        /// The asset root that was expected to exist.
        root: PathBuf,
    },

    /// The requested path resolves outside the asset root.
    Traversal {
        /// The path as requested by the template.
        path: PathBuf,
    },

    /// The asset root exists but the requested file does not.
    NotFound {
        /// The resolved path that was not found.
        path: PathBuf,
    },

    /// Reading the asset failed for a reason other than absence.
    Read {
        /// The resolved path that failed to read.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::RootMissing { root } => write!(
                f,
                "asset directory {} does not exist; install the bundled \
                 third-party assets or set {} to a directory containing them",
                root.display(),
                VENDOR_DIR_ENV
            ),
            AssetError::Traversal { path } => write!(
                f,
                "asset path {} escapes the asset directory",
                path.display()
            ),
            AssetError::NotFound { path } => {
                write!(f, "asset not found: {}", path.display())
            }
            AssetError::Read { path, source } => {
                write!(f, "failed to read asset {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Clone for AssetError {
    fn clone(&self) -> Self {
        match self {
            AssetError::RootMissing { root } => AssetError::RootMissing { root: root.clone() },
            AssetError::Traversal { path } => AssetError::Traversal { path: path.clone() },
            AssetError::NotFound { path } => AssetError::NotFound { path: path.clone() },
            // io::Error is not Clone; keep the kind and message
            AssetError::Read { path, source } => AssetError::Read {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
        }
    }
}

/// Error type for report rendering operations.
///
/// This error type provides a stable API that doesn't expose implementation
/// details of the underlying template engine. All public rendering functions
/// return this type.
#[derive(Debug)]
pub enum RenderError {
    /// No template is registered under the requested name.
    TemplateNotFound(String),

    /// Template syntax error or evaluation failure.
    Template(String),

    /// Data serialization error.
    Serialization(String),

    /// Local asset resolution failure (see [`AssetError`]).
    Asset(AssetError),

    /// I/O error outside of asset resolution.
    Io(std::io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateNotFound(name) => write!(f, "template not found: {}", name),
            RenderError::Template(msg) => write!(f, "template error: {}", msg),
            RenderError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            RenderError::Asset(err) => write!(f, "{}", err),
            RenderError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Asset(err) => Some(err),
            RenderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<AssetError> for RenderError {
    fn from(err: AssetError) -> Self {
        RenderError::Asset(err)
    }
}

// Conversion from minijinja::Error - this keeps internal compatibility
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        // Asset failures raised inside template helper functions travel out
        // of the engine on the error source chain; recover them as typed
        // failures instead of stringified template errors.
        let mut cause = std::error::Error::source(&err);
        while let Some(current) = cause {
            if let Some(asset) = current.downcast_ref::<AssetError>() {
                return RenderError::Asset(asset.clone());
            }
            cause = current.source();
        }

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::BadSerialization => RenderError::Serialization(err.to_string()),
            _ => RenderError::Template(err.to_string()),
        }
    }
}
