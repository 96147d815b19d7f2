// crates/treegen/src/emit.rs
// ============================================================================
// Module: Tree Walker / Code Emitter
// Description: Lowers a fitted tree into nested C conditionals.
// Purpose: Produce a deterministic, brace-balanced function body fragment.
// Dependencies: treegen-model
// ============================================================================

//! ## Overview
//! The emitter walks the tree depth-first, pre-order, and writes one line per
//! construct:
//!
//! ```text
//! if (features[1] <= 65.00) {
//!     return 0;
//! } else {
//!     return 1;
//! }
//! ```
//!
//! Traversal uses an explicit frame stack instead of recursion, so trees of
//! any depth are emitted without growing the call stack. Lines go through a
//! [`SourceBuilder`] that tracks open blocks and refuses to finish with an
//! unbalanced brace count.
//!
//! Thresholds are always rendered with [`THRESHOLD_DECIMALS`] digits after
//! the point. Changing that constant changes predictions for inputs close to
//! a threshold.

use std::fmt::Write;

use treegen_model::FeatureContract;
use treegen_model::FittedTree;
use treegen_model::Node;

use crate::error::ExportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// One indentation level of generated code.
pub const INDENT_UNIT: &str = "    ";

/// Digits after the decimal point in emitted thresholds.
pub const THRESHOLD_DECIMALS: usize = 2;

/// Default name of the feature array the branches index.
pub const DEFAULT_INPUT_ARRAY: &str = "features";

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Emission settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Identifier of the feature array.
    pub input_array: String,
    /// Indentation level of the outermost emitted line.
    pub base_indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            input_array: DEFAULT_INPUT_ARRAY.to_string(),
            base_indent: 1,
        }
    }
}

/// Emits the branch program for `tree` starting at `base_indent` levels.
///
/// # Errors
/// Returns [`ExportError::FeatureMapping`] when a split feature is missing
/// from `contract`, and [`ExportError::InvalidTree`] for node lookups that
/// fail.
///
/// # Examples
/// ```
/// use treegen::emit;
/// use treegen_model::FeatureContract;
/// use treegen_model::FittedTree;
/// use treegen_model::Node;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tree = FittedTree::new(vec![Node::Leaf { class_votes: vec![5.0, 5.0] }], None)?;
/// let body = emit(&tree, &FeatureContract::default(), 0)?;
/// assert_eq!(body, "return 0;\n");
/// # Ok(())
/// # }
/// ```
pub fn emit(
    tree: &FittedTree,
    contract: &FeatureContract,
    base_indent: usize,
) -> Result<String, ExportError> {
    let options = EmitOptions {
        base_indent,
        ..EmitOptions::default()
    };
    emit_with(tree, contract, &options)
}

/// Emits the branch program for `tree` with explicit options.
///
/// # Errors
/// Same as [`emit`], plus [`ExportError::Render`] if the produced text is not
/// brace balanced.
pub fn emit_with(
    tree: &FittedTree,
    contract: &FeatureContract,
    options: &EmitOptions,
) -> Result<String, ExportError> {
    let features = contract.resolve(tree);
    let mut builder = SourceBuilder::new();
    let mut stack = vec![Frame::Visit {
        node: 0,
        depth: options.base_indent,
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
                    builder.line(depth, &format!("return {label};"));
                }
                Node::Internal {
                    feature_index,
                    threshold,
                    left_child,
                    right_child,
                } => {
                    let slot = features.slot(*feature_index)?;
                    builder.open(
                        depth,
                        &format!(
                            "if ({}[{slot}] <= {})",
                            options.input_array,
                            format_threshold(*threshold)
                        ),
                    );
                    stack.push(Frame::Pending {
                        depth,
                        closing: Closing::Block,
                    });
                    stack.push(Frame::Visit {
                        node: *right_child,
                        depth: depth + 1,
                    });
                    stack.push(Frame::Pending {
                        depth,
                        closing: Closing::Else,
                    });
                    stack.push(Frame::Visit {
                        node: *left_child,
                        depth: depth + 1,
                    });
                }
            },
            Frame::Pending {
                depth,
                closing: Closing::Else,
            } => builder.reopen(depth, "else")?,
            Frame::Pending {
                depth,
                closing: Closing::Block,
            } => builder.close(depth)?,
        }
    }
    builder.finish()
}

/// Formats a split threshold with the fixed emitted precision.
///
/// Rounding is applied to the exact binary value of `threshold`.
///
/// # Examples
/// ```
/// use treegen::format_threshold;
///
/// assert_eq!(format_threshold(17.0), "17.00");
/// assert_eq!(format_threshold(17.256), "17.26");
/// ```
#[must_use]
pub fn format_threshold(threshold: f64) -> String {
    format!("{threshold:.prec$}", prec = THRESHOLD_DECIMALS)
}

// ============================================================================
// SECTION: Traversal Frames
// ============================================================================

/// Work item on the emission stack.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Emit the subtree rooted at `node`.
    Visit {
        /// Node index.
        node: usize,
        /// Indentation level of the subtree's first line.
        depth: usize,
    },
    /// Emit closing text for a conditional opened at `depth`.
    Pending {
        /// Indentation level of the matching `if`.
        depth: usize,
        /// Which closing text is due.
        closing: Closing,
    },
}

/// Closing text owed to an open conditional.
#[derive(Debug, Clone, Copy)]
enum Closing {
    /// `} else {` between the two branches.
    Else,
    /// Final `}`.
    Block,
}

// ============================================================================
// SECTION: Source Builder
// ============================================================================

/// Append-only C source buffer that tracks brace balance.
#[derive(Debug, Default)]
pub(crate) struct SourceBuilder {
    /// Rendered text.
    out: String,
    /// Number of currently open blocks.
    open_blocks: usize,
}

impl SourceBuilder {
    /// Creates an empty builder.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends an indented statement line.
    pub(crate) fn line(&mut self, depth: usize, text: &str) {
        self.indent(depth);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Appends `header {` and opens a block.
    pub(crate) fn open(&mut self, depth: usize, header: &str) {
        self.indent(depth);
        self.out.push_str(header);
        self.out.push_str(" {\n");
        self.open_blocks += 1;
    }

    /// Appends `} keyword {`, keeping the block count.
    pub(crate) fn reopen(&mut self, depth: usize, keyword: &str) -> Result<(), ExportError> {
        if self.open_blocks == 0 {
            return Err(ExportError::Render(format!("`{keyword}` without an open block")));
        }
        self.indent(depth);
        let _ = writeln!(self.out, "}} {keyword} {{");
        Ok(())
    }

    /// Appends `}` and closes a block.
    pub(crate) fn close(&mut self, depth: usize) -> Result<(), ExportError> {
        self.open_blocks = self
            .open_blocks
            .checked_sub(1)
            .ok_or_else(|| ExportError::Render("closing brace without an open block".to_string()))?;
        self.indent(depth);
        self.out.push_str("}\n");
        Ok(())
    }

    /// Appends pre-rendered, already balanced text verbatim.
    pub(crate) fn fragment(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Appends an empty line.
    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Returns the text, failing if any block is still open.
    pub(crate) fn finish(self) -> Result<String, ExportError> {
        if self.open_blocks != 0 {
            return Err(ExportError::Render(format!(
                "{} block(s) left open in generated source",
                self.open_blocks
            )));
        }
        Ok(self.out)
    }

    /// Writes `depth` indentation units.
    fn indent(&mut self, depth: usize) {
        for _ in 0 .. depth {
            self.out.push_str(INDENT_UNIT);
        }
    }
}
