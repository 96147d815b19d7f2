// crates/treegen/tests/emit.rs
// ============================================================================
// Module: Emitter Tests
// Description: Exact branch output for known trees.
// Purpose: Pin the generated conditional layout, labels, and precision.
// Dependencies: treegen, treegen-model
// ============================================================================

//! ## Overview
//! End-to-end emission of small trees, threshold formatting, leaf labels,
//! feature slot mapping, and deep trees.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use treegen::EmitOptions;
use treegen::ExportError;
use treegen::emit;
use treegen::emit_with;
use treegen::format_threshold;
use treegen_model::FeatureContract;
use treegen_model::FittedTree;

use crate::common::chain;
use crate::common::humidity_stump;
use crate::common::leaf;
use crate::common::split;

// ============================================================================
// SECTION: Layout
// ============================================================================

#[test]
fn humidity_stump_emits_if_else() {
    let body = emit(&humidity_stump(), &FeatureContract::default(), 1).unwrap();
    assert_eq!(
        body,
        "    if (features[1] <= 65.00) {\n        return 0;\n    } else {\n        return 1;\n    }\n"
    );
}

#[test]
fn base_indent_shifts_every_line() {
    let body = emit(&humidity_stump(), &FeatureContract::default(), 2).unwrap();
    for line in body.lines() {
        assert!(line.starts_with("        "), "line {line:?} should be indented twice");
    }
    let flush = emit(&humidity_stump(), &FeatureContract::default(), 0).unwrap();
    assert!(flush.starts_with("if (features[1] <= 65.00) {\n"));
}

#[test]
fn root_only_tree_emits_single_return() {
    let tree = FittedTree::new(vec![leaf(&[2.0, 9.0, 1.0])], None).unwrap();
    let body = emit(&tree, &FeatureContract::default(), 1).unwrap();
    assert_eq!(body, "    return 1;\n");
    assert!(!body.contains('{'));
}

#[test]
fn nested_tree_recurses_left_first() {
    // Temperature <= 17 ? (Pressure <= 1013.25 ? 1 : 0) : 0
    let tree = FittedTree::new(
        vec![
            split(0, 17.0, 1, 4),
            split(2, 1013.25, 2, 3),
            leaf(&[1.0, 5.0]),
            leaf(&[4.0, 0.0]),
            leaf(&[8.0, 2.0]),
        ],
        None,
    )
    .unwrap();
    let body = emit(&tree, &FeatureContract::default(), 1).unwrap();
    let expected = [
        "    if (features[0] <= 17.00) {",
        "        if (features[2] <= 1013.25) {",
        "            return 1;",
        "        } else {",
        "            return 0;",
        "        }",
        "    } else {",
        "        return 0;",
        "    }",
    ];
    assert_eq!(body.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn input_array_name_is_configurable() {
    let options = EmitOptions {
        input_array: "x".to_string(),
        base_indent: 0,
    };
    let body = emit_with(&humidity_stump(), &FeatureContract::default(), &options).unwrap();
    assert!(body.starts_with("if (x[1] <= 65.00) {\n"));
}

// ============================================================================
// SECTION: Values
// ============================================================================

#[test]
fn thresholds_render_with_two_decimals() {
    assert_eq!(format_threshold(17.0), "17.00");
    assert_eq!(format_threshold(17.256), "17.26");
    assert_eq!(format_threshold(1e6), "1000000.00");
}

#[test]
fn leaf_labels_follow_majority_vote() {
    let majority = FittedTree::new(vec![leaf(&[3.0, 7.0])], None).unwrap();
    assert_eq!(emit(&majority, &FeatureContract::default(), 0).unwrap(), "return 1;\n");
    let tie = FittedTree::new(vec![leaf(&[5.0, 5.0])], None).unwrap();
    assert_eq!(emit(&tie, &FeatureContract::default(), 0).unwrap(), "return 0;\n");
}

// ============================================================================
// SECTION: Feature Mapping
// ============================================================================

#[test]
fn named_tree_uses_contract_slots() {
    // Training columns were ordered Pressure, Humidity; the split is on
    // Pressure, which is slot 2 of the default contract.
    let names = vec!["Pressure".to_string(), "Humidity".to_string()];
    let tree =
        FittedTree::new(vec![split(0, 1000.0, 1, 2), leaf(&[1.0]), leaf(&[0.0, 1.0])], Some(names))
            .unwrap();
    let body = emit(&tree, &FeatureContract::default(), 0).unwrap();
    assert!(body.starts_with("if (features[2] <= 1000.00) {\n"));
}

#[test]
fn unknown_feature_fails_mapping() {
    let names = vec!["Wind".to_string()];
    let tree =
        FittedTree::new(vec![split(0, 3.0, 1, 2), leaf(&[1.0]), leaf(&[0.0, 1.0])], Some(names))
            .unwrap();
    match emit(&tree, &FeatureContract::default(), 1) {
        Err(ExportError::FeatureMapping(message)) => assert!(message.contains("Wind")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unnamed_split_beyond_contract_fails_mapping() {
    let contract = FeatureContract::new(["Temperature"]).unwrap();
    let err = emit(&humidity_stump(), &contract, 1).unwrap_err();
    assert_eq!(err.stage(), "feature_mapping");
}

// ============================================================================
// SECTION: Determinism and Depth
// ============================================================================

#[test]
fn emission_is_idempotent() {
    let tree = humidity_stump();
    let contract = FeatureContract::default();
    assert_eq!(emit(&tree, &contract, 1).unwrap(), emit(&tree, &contract, 1).unwrap());
}

#[test]
fn deep_chain_emits_without_recursion() {
    let depth = 2_000;
    let body = emit(&chain(depth), &FeatureContract::default(), 0).unwrap();
    assert_eq!(body.lines().count(), depth * 4 + 1);
    let innermost = format!("{}return 0;", "    ".repeat(depth));
    assert!(body.lines().any(|line| line == innermost));
    assert_eq!(body.matches('{').count(), body.matches('}').count());
}
