// crates/treegen-model/src/error.rs
// ============================================================================
// Module: Tree Model Errors
// Description: Error taxonomy for artifact loading and tree validation.
// Purpose: Give callers stable variants that name the failing stage.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ModelError`] covers artifact loading, structural tree validation,
//! feature mapping, and contract construction. Payloads are human-readable
//! strings.

use thiserror::Error;

/// Errors raised while loading or querying a fitted tree.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
///
/// # Examples
/// ```
/// use treegen_model::ModelError;
///
/// let err = ModelError::InvalidTree("node 3 reached twice".to_string());
/// assert_eq!(err.to_string(), "invalid tree: node 3 reached twice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The artifact could not be read or deserialized.
    #[error("artifact load error: {0}")]
    ArtifactLoad(String),
    /// The node graph violates the rooted binary tree invariant.
    #[error("invalid tree: {0}")]
    InvalidTree(String),
    /// A split references a feature absent from the feature contract.
    #[error("feature mapping error: {0}")]
    FeatureMapping(String),
    /// The feature contract itself is malformed.
    #[error("invalid feature contract: {0}")]
    InvalidContract(String),
}
