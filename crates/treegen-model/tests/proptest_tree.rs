// crates/treegen-model/tests/proptest_tree.rs
// ============================================================================
// Module: Tree Property-Based Tests
// Description: Validation and label selection over arbitrary node graphs.
// Purpose: Ensure accepted graphs are rooted binary trees and argmax is stable.
// ============================================================================

//! Property-based tests for tree validation invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use treegen_model::FittedTree;
use treegen_model::ModelError;
use treegen_model::Node;
use treegen_model::majority_class;

fn node_strategy(max_index: usize) -> impl Strategy<Value = Node> {
    prop_oneof![
        prop::collection::vec(0.0 .. 50.0_f64, 1 .. 4)
            .prop_map(|class_votes| Node::Leaf { class_votes }),
        (0 .. 3_usize, -100.0 .. 100.0_f64, 0 .. max_index, 0 .. max_index).prop_map(
            |(feature_index, threshold, left_child, right_child)| Node::Internal {
                feature_index,
                threshold,
                left_child,
                right_child,
            }
        ),
    ]
}

fn nodes_strategy() -> impl Strategy<Value = Vec<Node>> {
    (1 .. 12_usize).prop_flat_map(|count| prop::collection::vec(node_strategy(count + 2), count))
}

proptest! {
    #[test]
    fn accepted_graphs_are_full_binary_trees(nodes in nodes_strategy()) {
        match FittedTree::new(nodes.clone(), None) {
            Ok(tree) => {
                let stats = tree.stats();
                let internal = nodes.iter().filter(|node| !node.is_leaf()).count();
                prop_assert_eq!(stats.node_count, nodes.len());
                prop_assert_eq!(stats.leaf_count, internal + 1);
                prop_assert!(stats.depth <= internal);
                for (index, node) in nodes.iter().enumerate() {
                    if node.is_leaf() {
                        prop_assert!(tree.leaf_label(index).is_ok());
                    }
                }
            }
            Err(ModelError::InvalidTree(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn majority_class_picks_first_maximum(votes in prop::collection::vec(0 .. 5_u8, 1 .. 8)) {
        let as_f64: Vec<f64> = votes.iter().map(|vote| f64::from(*vote)).collect();
        let top = votes.iter().max().unwrap();
        let first = votes.iter().position(|vote| vote == top);
        prop_assert_eq!(majority_class(&as_f64), first);
    }
}
