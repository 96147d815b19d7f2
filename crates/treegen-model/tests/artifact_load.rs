// crates/treegen-model/tests/artifact_load.rs
// ============================================================================
// Module: Artifact Load Tests
// Description: Reading tree artifacts from disk with size limits.
// Purpose: Validate bounded reads and fail-closed decoding.
// Dependencies: treegen-model, tempfile
// ============================================================================

//! ## Overview
//! Integration tests covering on-disk artifact loading.
//!
//! ### Security Posture
//! Artifacts are untrusted; oversized or malformed inputs must fail before
//! any emission happens.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use treegen_model::DEFAULT_MAX_ARTIFACT_BYTES;
use treegen_model::ModelError;
use treegen_model::load_tree;

const HUMIDITY_STUMP: &str = r#"{
  "feature_names": ["Temperature", "Humidity", "Pressure"],
  "children_left": [1, -1, -1],
  "children_right": [2, -1, -1],
  "feature": [1, -2, -2],
  "threshold": [65.0, -2.0, -2.0],
  "value": [[10, 10], [10, 0], [0, 10]]
}"#;

#[test]
fn load_tree_reads_valid_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, HUMIDITY_STUMP).unwrap();
    let tree = load_tree(&path, DEFAULT_MAX_ARTIFACT_BYTES).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.leaf_label(1).unwrap(), 0);
    assert_eq!(tree.leaf_label(2).unwrap(), 1);
}

#[test]
fn load_tree_enforces_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, HUMIDITY_STUMP).unwrap();
    match load_tree(&path, 16) {
        Err(ModelError::ArtifactLoad(message)) => assert!(message.contains("exceeds 16 bytes")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected size limit error"),
    }
}

#[test]
fn load_tree_surfaces_structural_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, HUMIDITY_STUMP.replace("[2, -1, -1]", "[5, -1, -1]")).unwrap();
    assert!(matches!(
        load_tree(&path, DEFAULT_MAX_ARTIFACT_BYTES),
        Err(ModelError::InvalidTree(_))
    ));
}

#[test]
fn load_tree_rejects_truncated_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, &HUMIDITY_STUMP[.. HUMIDITY_STUMP.len() / 2]).unwrap();
    match load_tree(&path, DEFAULT_MAX_ARTIFACT_BYTES) {
        Err(ModelError::ArtifactLoad(message)) => assert!(message.contains("model.json")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected decode error"),
    }
}
