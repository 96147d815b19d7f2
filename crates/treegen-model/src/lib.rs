// crates/treegen-model/src/lib.rs
// ============================================================================
// Module: Tree Model Library
// Description: Fitted decision-tree model and feature contract.
// Purpose: Provide a validated, read-only view of a trained classifier tree.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `treegen-model` owns the input side of the export pipeline. It parses the
//! serialized tree artifact produced by the training stage, validates that the
//! node graph is a finite rooted binary tree, and exposes node queries plus
//! leaf majority labels. The [`FeatureContract`] maps feature names to the
//! array slots used by generated code.
//!
//! ### Security Posture
//! Tree artifacts are treated as untrusted input. Loading enforces a byte
//! limit and validation fails closed on any malformed node graph so that
//! downstream emission can never loop or index out of bounds.
//!
//! ## Index
//! - Tree model: [`FittedTree`], [`Node`], [`TreeArrays`], [`TreeStats`]
//! - Feature contract: [`FeatureContract`], [`FeatureMap`]
//! - Loading: [`load_tree`], [`parse_tree`]
//! - Errors: [`ModelError`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifact;
pub mod contract;
pub mod error;
pub mod tree;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifact::DEFAULT_MAX_ARTIFACT_BYTES;
pub use artifact::load_tree;
pub use artifact::parse_tree;
pub use contract::DEFAULT_FEATURE_NAMES;
pub use contract::FeatureContract;
pub use contract::FeatureMap;
pub use error::ModelError;
pub use tree::FittedTree;
pub use tree::MAX_TREE_NODES;
pub use tree::Node;
pub use tree::NodeValue;
pub use tree::TREE_LEAF;
pub use tree::TREE_UNDEFINED;
pub use tree::TreeArrays;
pub use tree::TreeStats;
pub use tree::majority_class;
