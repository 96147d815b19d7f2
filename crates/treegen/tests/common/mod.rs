// crates/treegen/tests/common/mod.rs
// =============================================================================
// Module: Tree Test Helpers
// Description: Shared tree builders and artifact fixtures.
// Purpose: Reduce duplication across integration tests for treegen.
// =============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "Test helpers are selectively used across suites."
)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use treegen_model::FittedTree;
use treegen_model::Node;
use treegen_model::TreeArrays;

/// Builds a leaf node.
pub fn leaf(votes: &[f64]) -> Node {
    Node::Leaf {
        class_votes: votes.to_vec(),
    }
}

/// Builds an internal node.
pub fn split(feature_index: usize, threshold: f64, left_child: usize, right_child: usize) -> Node {
    Node::Internal {
        feature_index,
        threshold,
        left_child,
        right_child,
    }
}

/// `Humidity <= 65.0` with leaves `[10, 0]` and `[0, 10]`.
pub fn humidity_stump() -> FittedTree {
    FittedTree::new(vec![split(1, 65.0, 1, 2), leaf(&[10.0, 0.0]), leaf(&[0.0, 10.0])], None)
        .unwrap()
}

/// A left-leaning chain of `depth` splits on feature 0.
pub fn chain(depth: usize) -> FittedTree {
    let mut nodes = Vec::with_capacity(depth * 2 + 1);
    for level in 0 .. depth {
        let index = level * 2;
        nodes.push(split(0, 0.5, index + 2, index + 1));
        nodes.push(leaf(&[0.0, 1.0]));
    }
    nodes.push(leaf(&[1.0, 0.0]));
    FittedTree::new(nodes, None).unwrap()
}

/// One step of a generated tree: split or not, feature, threshold, votes.
pub type Decision = (bool, usize, f64, [u8; 2]);

/// Builds a tree breadth-first from `decisions`; slots past the end become
/// leaves. Features are taken modulo `feature_count`.
pub fn build_tree(
    decisions: &[Decision],
    feature_count: usize,
    names: Option<Vec<String>>,
) -> FittedTree {
    let mut nodes = vec![leaf(&[])];
    let mut queue = VecDeque::from([0_usize]);
    let mut steps = decisions.iter();
    while let Some(index) = queue.pop_front() {
        nodes[index] = match steps.next() {
            Some(&(true, feature, threshold, _)) => {
                let left = nodes.len();
                nodes.push(leaf(&[]));
                nodes.push(leaf(&[]));
                queue.push_back(left);
                queue.push_back(left + 1);
                split(feature % feature_count, threshold, left, left + 1)
            }
            Some(&(false, _, _, [a, b])) => leaf(&[f64::from(a), f64::from(b)]),
            None => leaf(&[1.0, 0.0]),
        };
    }
    FittedTree::new(nodes, names).unwrap()
}

/// Returns the split feature of every internal node in pre-order.
pub fn preorder_split_features(tree: &FittedTree) -> Vec<usize> {
    let mut features = Vec::new();
    let mut stack = vec![0_usize];
    while let Some(index) = stack.pop() {
        if let Node::Internal {
            feature_index,
            left_child,
            right_child,
            ..
        } = tree.node(index).unwrap()
        {
            features.push(*feature_index);
            stack.push(*right_child);
            stack.push(*left_child);
        }
    }
    features
}

/// Serializes `tree` as a JSON artifact under `dir`.
pub fn write_artifact(dir: &Path, name: &str, tree: &FittedTree) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_vec_pretty(&TreeArrays::from(tree)).unwrap();
    fs::write(&path, json).unwrap();
    path
}
