// crates/treegen/src/error.rs
// ============================================================================
// Module: Export Errors
// Description: Stage-tagged error taxonomy for the export pipeline.
// Purpose: Name which stage failed and why, for the CLI and audit events.
// Dependencies: thiserror, treegen-model, treegen-config
// ============================================================================

//! ## Overview
//! [`ExportError`] is the single error type of the export pipeline. Model and
//! configuration errors convert into it, and [`ExportError::stage`] yields the
//! stable label printed by the CLI and recorded in audit events.

use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use treegen_config::ConfigError;
use treegen_model::ModelError;

/// Errors raised by the export pipeline.
///
/// # Invariants
/// - Variant meanings and [`ExportError::stage`] labels are stable for
///   automation and tests.
/// - Every variant aborts the export before any output file is replaced.
///
/// # Examples
/// ```
/// use treegen::ExportError;
///
/// let err = ExportError::InvalidTree("node 4 reached twice".to_string());
/// assert_eq!(err.stage(), "invalid_tree");
/// ```
#[derive(Debug, Error)]
pub enum ExportError {
    /// The fitted tree artifact could not be read or decoded.
    #[error("artifact load failed: {0}")]
    ArtifactLoad(String),
    /// The node graph is malformed.
    #[error("invalid tree: {0}")]
    InvalidTree(String),
    /// A split feature is not part of the feature contract.
    #[error("feature mapping failed: {0}")]
    FeatureMapping(String),
    /// Directory creation or file write failed.
    #[error("filesystem error at {}: {message}", .path.display())]
    Filesystem {
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },
    /// Configuration was rejected.
    #[error("configuration error: {0}")]
    Config(String),
    /// Generated source violated a structural invariant.
    #[error("render error: {0}")]
    Render(String),
    /// On-disk outputs differ from freshly generated ones.
    #[error("drift detected: {0}")]
    Drift(String),
}

impl ExportError {
    /// Returns the stable stage label for this error.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::ArtifactLoad(_) => "artifact_load",
            Self::InvalidTree(_) => "invalid_tree",
            Self::FeatureMapping(_) => "feature_mapping",
            Self::Filesystem {
                ..
            } => "filesystem",
            Self::Config(_) => "config",
            Self::Render(_) => "render",
            Self::Drift(_) => "drift",
        }
    }

    /// Builds a filesystem error for `path`.
    #[must_use]
    pub fn filesystem(path: &Path, err: impl Display) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<ModelError> for ExportError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ArtifactLoad(message) => Self::ArtifactLoad(message),
            ModelError::InvalidTree(message) => Self::InvalidTree(message),
            ModelError::FeatureMapping(message) => Self::FeatureMapping(message),
            ModelError::InvalidContract(message) => Self::Config(message),
        }
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
