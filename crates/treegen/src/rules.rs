// crates/treegen/src/rules.rs
// ============================================================================
// Module: Rule Listing
// Description: Human-readable text rendering of a fitted tree.
// Purpose: Review a tree's splits without reading generated C.
// Dependencies: treegen-model
// ============================================================================

//! ## Overview
//! Renders the tree as an indented rule listing, one line per branch and
//! leaf:
//!
//! ```text
//! |--- Humidity <= 65.00
//! |   |--- class: 0
//! |--- Humidity >  65.00
//! |   |--- class: 1
//! ```
//!
//! Thresholds use the same precision as the generated code so the listing
//! and the C source agree.

use treegen_model::FeatureContract;
use treegen_model::FeatureMap;
use treegen_model::FittedTree;
use treegen_model::Node;

use crate::emit::format_threshold;
use crate::error::ExportError;

/// Prefix added per nesting level.
const LEVEL_PREFIX: &str = "|   ";
/// Marker before every rule.
const RULE_MARKER: &str = "|--- ";

/// Work item on the rendering stack.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Render the subtree rooted at `node`.
    Visit {
        /// Node index.
        node: usize,
        /// Nesting level.
        depth: usize,
    },
    /// Render the `>` branch of internal node `node`.
    Upper {
        /// Internal node index.
        node: usize,
        /// Nesting level of the split line.
        depth: usize,
    },
}

/// Renders `tree` as an indented rule listing.
///
/// Feature names come from the tree when it carries them, otherwise from
/// `contract` by index.
///
/// # Errors
/// Returns [`ExportError::FeatureMapping`] when a split feature has no name
/// and [`ExportError::InvalidTree`] for failed node lookups.
///
/// # Examples
/// ```
/// use treegen::render_rules;
/// use treegen_model::FeatureContract;
/// use treegen_model::FittedTree;
/// use treegen_model::Node;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tree = FittedTree::new(vec![Node::Leaf { class_votes: vec![1.0, 4.0] }], None)?;
/// assert_eq!(render_rules(&tree, &FeatureContract::default())?, "|--- class: 1\n");
/// # Ok(())
/// # }
/// ```
pub fn render_rules(tree: &FittedTree, contract: &FeatureContract) -> Result<String, ExportError> {
    let features = contract.resolve(tree);
    let mut out = String::new();
    let mut stack = vec![Frame::Visit {
        node: 0,
        depth: 0,
    }];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit {
                node,
                depth,
            } => match tree.node(node)? {
                Node::Leaf {
                    ..
                } => {
                    let label = tree.leaf_label(node)?;
                    push_rule(&mut out, depth, &format!("class: {label}"));
                }
                Node::Internal {
                    feature_index,
                    threshold,
                    left_child,
                    ..
                } => {
                    let name = feature_name(&features, *feature_index)?;
                    push_rule(
                        &mut out,
                        depth,
                        &format!("{name} <= {}", format_threshold(*threshold)),
                    );
                    stack.push(Frame::Upper {
                        node,
                        depth,
                    });
                    stack.push(Frame::Visit {
                        node: *left_child,
                        depth: depth + 1,
                    });
                }
            },
            Frame::Upper {
                node,
                depth,
            } => {
                if let Node::Internal {
                    feature_index,
                    threshold,
                    right_child,
                    ..
                } = tree.node(node)?
                {
                    let name = feature_name(&features, *feature_index)?;
                    push_rule(&mut out, depth, &format!("{name} >  {}", format_threshold(*threshold)));
                    stack.push(Frame::Visit {
                        node: *right_child,
                        depth: depth + 1,
                    });
                }
            }
        }
    }
    Ok(out)
}

/// Looks up the display name of a split feature.
fn feature_name(features: &FeatureMap, feature_index: usize) -> Result<&str, ExportError> {
    features.name(feature_index).ok_or_else(|| {
        ExportError::FeatureMapping(format!("split feature index {feature_index} has no name"))
    })
}

/// Appends one rule line at `depth`.
fn push_rule(out: &mut String, depth: usize, text: &str) {
    for _ in 0 .. depth {
        out.push_str(LEVEL_PREFIX);
    }
    out.push_str(RULE_MARKER);
    out.push_str(text);
    out.push('\n');
}
