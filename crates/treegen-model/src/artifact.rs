// crates/treegen-model/src/artifact.rs
// ============================================================================
// Module: Tree Artifact Loading
// Description: Bounded reads and JSON decoding of fitted-tree artifacts.
// Purpose: Turn the training stage's output file into a validated tree.
// Dependencies: serde_json, crate::tree
// ============================================================================

//! ## Overview
//! The training stage writes the fitted tree as a JSON document of parallel
//! node arrays. [`load_tree`] reads it with a size bound, decodes it, and
//! hands the arrays to [`FittedTree::from_arrays`] for validation. Errors name
//! the artifact path.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::ModelError;
use crate::tree::FittedTree;
use crate::tree::TreeArrays;

/// Default maximum artifact size accepted by [`load_tree`].
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 64 * 1024 * 1024;

/// Reads, decodes, and validates the tree artifact at `path`.
///
/// # Errors
/// Returns [`ModelError::ArtifactLoad`] when the file cannot be read, exceeds
/// `max_bytes`, or is not a tree document, and [`ModelError::InvalidTree`]
/// when the decoded arrays fail validation.
pub fn load_tree(path: &Path, max_bytes: u64) -> Result<FittedTree, ModelError> {
    let bytes = read_artifact_bytes(path, max_bytes)?;
    parse_tree(&bytes).map_err(|err| annotate(err, path))
}

/// Decodes and validates a tree artifact held in memory.
///
/// # Errors
/// Returns [`ModelError::ArtifactLoad`] for malformed JSON and
/// [`ModelError::InvalidTree`] for structural violations.
pub fn parse_tree(bytes: &[u8]) -> Result<FittedTree, ModelError> {
    let arrays: TreeArrays =
        serde_json::from_slice(bytes).map_err(|err| ModelError::ArtifactLoad(err.to_string()))?;
    FittedTree::from_arrays(arrays)
}

/// Reads the artifact with a size limit to avoid memory exhaustion.
fn read_artifact_bytes(path: &Path, max_bytes: u64) -> Result<Vec<u8>, ModelError> {
    let io_err = |err: std::io::Error| ModelError::ArtifactLoad(format!("{}: {err}", path.display()));
    let file = fs::File::open(path).map_err(io_err)?;
    let metadata = file.metadata().map_err(io_err)?;
    if metadata.len() > max_bytes {
        return Err(ModelError::ArtifactLoad(format!(
            "{}: artifact exceeds {max_bytes} bytes",
            path.display()
        )));
    }
    let mut bytes = Vec::new();
    file.take(max_bytes + 1).read_to_end(&mut bytes).map_err(io_err)?;
    let size = u64::try_from(bytes.len()).map_err(|_| {
        ModelError::ArtifactLoad("artifact size exceeds addressable memory".to_string())
    })?;
    if size > max_bytes {
        return Err(ModelError::ArtifactLoad(format!(
            "{}: artifact exceeds {max_bytes} bytes",
            path.display()
        )));
    }
    Ok(bytes)
}

/// Prefixes decode errors with the artifact path.
fn annotate(err: ModelError, path: &Path) -> ModelError {
    match err {
        ModelError::ArtifactLoad(message) => {
            ModelError::ArtifactLoad(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}
