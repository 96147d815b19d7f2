// crates/treegen-model/src/tree.rs
// ============================================================================
// Module: Fitted Tree Model
// Description: Index-addressed decision-tree nodes with structural validation.
// Purpose: Expose node queries and leaf majority labels for code emission.
// Dependencies: serde, crate::error
// ============================================================================

//! ## Overview
//! A [`FittedTree`] is an index-addressed node list where node 0 is the root.
//! Construction always validates the graph: every internal node has two
//! in-range children, no node is reached twice, and every node is reachable
//! from the root. Validation walks an explicit stack, so malformed input
//! (cycles, shared children) is rejected without recursion or looping.
//!
//! [`TreeArrays`] mirrors the parallel arrays a fitted estimator keeps
//! internally (`children_left`, `children_right`, `feature`, `threshold`,
//! `value`) and is the serialized artifact shape.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ModelError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Child index marking a leaf in the serialized arrays.
pub const TREE_LEAF: i64 = -1;

/// Feature index marking "no split" in the serialized arrays.
pub const TREE_UNDEFINED: i64 = -2;

/// Maximum number of nodes accepted in a single tree.
pub const MAX_TREE_NODES: usize = 1 << 22;

// ============================================================================
// SECTION: Node Model
// ============================================================================

/// A single node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Threshold test on one feature.
    Internal {
        /// Index of the split feature in the tree's feature ordering.
        feature_index: usize,
        /// Samples with `x[feature] <= threshold` go left.
        threshold: f64,
        /// Node index taken when the test holds.
        left_child: usize,
        /// Node index taken when the test fails.
        right_child: usize,
    },
    /// Terminal node carrying per-class sample counts.
    Leaf {
        /// Vote count (or weighted count) per class index.
        class_votes: Vec<f64>,
    },
}

impl Node {
    /// Returns true for leaf nodes.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// Summary statistics of a validated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Total node count.
    pub node_count: usize,
    /// Number of leaves.
    pub leaf_count: usize,
    /// Longest root-to-leaf edge count (0 for a single leaf).
    pub depth: usize,
}

/// Validated, read-only fitted decision tree.
///
/// # Invariants
/// - At least one node; node 0 is the root.
/// - The node graph is a rooted binary tree: no cycles, no shared children,
///   every node reachable from the root.
/// - Thresholds and votes are finite; every leaf has at least one vote slot.
/// - When `feature_names` is present, every split index is in range.
///
/// # Examples
/// ```
/// use treegen_model::FittedTree;
/// use treegen_model::Node;
///
/// # fn main() -> Result<(), treegen_model::ModelError> {
/// let tree = FittedTree::new(
///     vec![Node::Leaf {
///         class_votes: vec![3.0, 7.0],
///     }],
///     None,
/// )?;
/// assert_eq!(tree.leaf_label(0)?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FittedTree {
    /// Index-addressed nodes; node 0 is the root.
    nodes: Vec<Node>,
    /// Training-time feature names indexed by `feature_index`.
    feature_names: Option<Vec<String>>,
}

impl FittedTree {
    /// Builds a tree from nodes and validates its structure.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidTree`] when the graph is not a finite
    /// rooted binary tree or carries non-finite numbers.
    pub fn new(nodes: Vec<Node>, feature_names: Option<Vec<String>>) -> Result<Self, ModelError> {
        let tree = Self {
            nodes,
            feature_names,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Builds a tree from the serialized parallel-array form.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidTree`] when the arrays disagree in length,
    /// encode a half-leaf node, or fail structural validation.
    pub fn from_arrays(arrays: TreeArrays) -> Result<Self, ModelError> {
        let count = arrays.children_left.len();
        let lengths = [
            ("children_right", arrays.children_right.len()),
            ("feature", arrays.feature.len()),
            ("threshold", arrays.threshold.len()),
            ("value", arrays.value.len()),
        ];
        for (name, len) in lengths {
            if len != count {
                return Err(ModelError::InvalidTree(format!(
                    "{name} has {len} entries but children_left has {count}"
                )));
            }
        }
        if count > MAX_TREE_NODES {
            return Err(ModelError::InvalidTree(format!(
                "tree has {count} nodes, limit is {MAX_TREE_NODES}"
            )));
        }

        let mut nodes = Vec::with_capacity(count);
        let rows = arrays
            .children_left
            .iter()
            .zip(&arrays.children_right)
            .zip(&arrays.feature)
            .zip(&arrays.threshold)
            .zip(arrays.value);
        for (index, ((((&left, &right), &feature), &threshold), value)) in rows.enumerate() {
            let node = if left == TREE_LEAF && right == TREE_LEAF {
                Node::Leaf {
                    class_votes: value.into_votes(index)?,
                }
            } else {
                let feature_index = usize::try_from(feature).map_err(|_| {
                    ModelError::InvalidTree(format!(
                        "node {index} has children but undefined split feature {feature}"
                    ))
                })?;
                Node::Internal {
                    feature_index,
                    threshold,
                    left_child: child_index(index, "left", left)?,
                    right_child: child_index(index, "right", right)?,
                }
            };
            nodes.push(node);
        }
        Self::new(nodes, arrays.feature_names)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a validated tree; provided for API symmetry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all nodes in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the training-time feature names, when the artifact carried them.
    #[must_use]
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Returns the node at `index`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidTree`] when `index` is out of range.
    pub fn node(&self, index: usize) -> Result<&Node, ModelError> {
        self.nodes.get(index).ok_or_else(|| {
            ModelError::InvalidTree(format!(
                "node index {index} outside {} nodes",
                self.nodes.len()
            ))
        })
    }

    /// Returns the majority class label of the leaf at `index`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidTree`] when the node is missing or is not
    /// a leaf.
    pub fn leaf_label(&self, index: usize) -> Result<usize, ModelError> {
        match self.node(index)? {
            Node::Leaf {
                class_votes,
            } => majority_class(class_votes).ok_or_else(|| {
                ModelError::InvalidTree(format!("leaf {index} has no class votes"))
            }),
            Node::Internal {
                ..
            } => Err(ModelError::InvalidTree(format!("node {index} is not a leaf"))),
        }
    }

    /// Computes node, leaf, and depth statistics.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut leaf_count = 0;
        let mut depth = 0;
        let mut stack = vec![(0_usize, 0_usize)];
        while let Some((index, level)) = stack.pop() {
            match self.nodes.get(index) {
                Some(Node::Internal {
                    left_child,
                    right_child,
                    ..
                }) => {
                    stack.push((*right_child, level + 1));
                    stack.push((*left_child, level + 1));
                }
                Some(Node::Leaf {
                    ..
                }) => {
                    leaf_count += 1;
                    depth = depth.max(level);
                }
                None => {}
            }
        }
        TreeStats {
            node_count: self.nodes.len(),
            leaf_count,
            depth,
        }
    }

    /// Checks the rooted binary tree invariant with an explicit stack.
    fn validate(&self) -> Result<(), ModelError> {
        let count = self.nodes.len();
        if count == 0 {
            return Err(ModelError::InvalidTree("tree has no nodes".to_string()));
        }
        if count > MAX_TREE_NODES {
            return Err(ModelError::InvalidTree(format!(
                "tree has {count} nodes, limit is {MAX_TREE_NODES}"
            )));
        }

        let mut visited = vec![false; count];
        let mut stack = vec![0_usize];
        while let Some(index) = stack.pop() {
            if visited[index] {
                return Err(ModelError::InvalidTree(format!(
                    "node {index} reached twice (cycle or shared child)"
                )));
            }
            visited[index] = true;
            match &self.nodes[index] {
                Node::Internal {
                    feature_index,
                    threshold,
                    left_child,
                    right_child,
                } => {
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidTree(format!(
                            "node {index} has non-finite threshold"
                        )));
                    }
                    if let Some(names) = &self.feature_names
                        && *feature_index >= names.len()
                    {
                        return Err(ModelError::InvalidTree(format!(
                            "node {index} splits on feature {feature_index} but the tree names \
                             only {} features",
                            names.len()
                        )));
                    }
                    for child in [*left_child, *right_child] {
                        if child >= count {
                            return Err(ModelError::InvalidTree(format!(
                                "node {index} references child {child} outside {count} nodes"
                            )));
                        }
                        if child == 0 {
                            return Err(ModelError::InvalidTree(format!(
                                "node {index} references the root as a child"
                            )));
                        }
                        stack.push(child);
                    }
                }
                Node::Leaf {
                    class_votes,
                } => {
                    if class_votes.is_empty() {
                        return Err(ModelError::InvalidTree(format!(
                            "leaf {index} has no class votes"
                        )));
                    }
                    if class_votes.iter().any(|vote| !vote.is_finite() || *vote < 0.0) {
                        return Err(ModelError::InvalidTree(format!(
                            "leaf {index} has a negative or non-finite vote"
                        )));
                    }
                }
            }
        }
        if let Some(orphan) = visited.iter().position(|seen| !seen) {
            return Err(ModelError::InvalidTree(format!("node {orphan} is unreachable from the root")));
        }
        Ok(())
    }
}

/// Returns the index of the largest vote, preferring the lowest index on ties.
///
/// Returns `None` for an empty vote vector.
///
/// # Examples
/// ```
/// use treegen_model::majority_class;
///
/// assert_eq!(majority_class(&[3.0, 7.0]), Some(1));
/// assert_eq!(majority_class(&[5.0, 5.0]), Some(0));
/// ```
#[must_use]
pub fn majority_class(votes: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &vote) in votes.iter().enumerate() {
        match best {
            Some((_, top)) if vote <= top => {}
            _ => best = Some((index, vote)),
        }
    }
    best.map(|(index, _)| index)
}

/// Converts a serialized child pointer into a node index.
fn child_index(node: usize, side: &str, raw: i64) -> Result<usize, ModelError> {
    usize::try_from(raw).map_err(|_| {
        ModelError::InvalidTree(format!("node {node} has invalid {side} child {raw}"))
    })
}

// ============================================================================
// SECTION: Serialized Form
// ============================================================================

/// Per-node class distribution as stored in the artifact.
///
/// Estimators export either one vote vector per node or one vector per
/// output; only single-output trees are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    /// Flat per-class votes.
    Votes(Vec<f64>),
    /// Per-output per-class votes.
    Outputs(Vec<Vec<f64>>),
}

impl NodeValue {
    /// Extracts the single-output vote vector for node `index`.
    fn into_votes(self, index: usize) -> Result<Vec<f64>, ModelError> {
        match self {
            Self::Votes(votes) => Ok(votes),
            Self::Outputs(mut outputs) => {
                if outputs.len() != 1 {
                    return Err(ModelError::InvalidTree(format!(
                        "leaf {index} has {} outputs; only single-output trees are supported",
                        outputs.len()
                    )));
                }
                Ok(outputs.swap_remove(0))
            }
        }
    }
}

/// Parallel-array artifact layout of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeArrays {
    /// Training-time feature names, indexed by `feature`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Left child per node, or [`TREE_LEAF`].
    pub children_left: Vec<i64>,
    /// Right child per node, or [`TREE_LEAF`].
    pub children_right: Vec<i64>,
    /// Split feature per node, or [`TREE_UNDEFINED`] for leaves.
    pub feature: Vec<i64>,
    /// Split threshold per node (ignored for leaves).
    pub threshold: Vec<f64>,
    /// Class distribution per node.
    pub value: Vec<NodeValue>,
}

impl From<&FittedTree> for TreeArrays {
    fn from(tree: &FittedTree) -> Self {
        let count = tree.nodes.len();
        let mut arrays = Self {
            feature_names: tree.feature_names.clone(),
            children_left: Vec::with_capacity(count),
            children_right: Vec::with_capacity(count),
            feature: Vec::with_capacity(count),
            threshold: Vec::with_capacity(count),
            value: Vec::with_capacity(count),
        };
        for node in &tree.nodes {
            match node {
                Node::Internal {
                    feature_index,
                    threshold,
                    left_child,
                    right_child,
                } => {
                    arrays.children_left.push(i64::try_from(*left_child).unwrap_or(TREE_LEAF));
                    arrays.children_right.push(i64::try_from(*right_child).unwrap_or(TREE_LEAF));
                    arrays.feature.push(i64::try_from(*feature_index).unwrap_or(TREE_UNDEFINED));
                    arrays.threshold.push(*threshold);
                    arrays.value.push(NodeValue::Votes(Vec::new()));
                }
                Node::Leaf {
                    class_votes,
                } => {
                    arrays.children_left.push(TREE_LEAF);
                    arrays.children_right.push(TREE_LEAF);
                    arrays.feature.push(TREE_UNDEFINED);
                    arrays.threshold.push(-2.0);
                    arrays.value.push(NodeValue::Votes(class_votes.clone()));
                }
            }
        }
        arrays
    }
}
