// crates/treegen-model/src/contract.rs
// ============================================================================
// Module: Feature Contract
// Description: Ordered feature names and their generated-code array slots.
// Purpose: Keep training-time feature order and emitted indices in lockstep.
// Dependencies: crate::error, crate::tree
// ============================================================================

//! ## Overview
//! The feature contract is the fixed, ordered list of input names. A name's
//! position is the slot of the generated function's input array. The contract
//! cannot check itself against the training columns (no shape information
//! survives into the tree arrays); it only resolves names to slots.

use std::collections::BTreeSet;

use crate::error::ModelError;
use crate::tree::FittedTree;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Feature order used by the weather-station model.
pub const DEFAULT_FEATURE_NAMES: [&str; 3] = ["Temperature", "Humidity", "Pressure"];

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Ordered, duplicate-free list of feature names.
///
/// # Invariants
/// - At least one name; names are non-blank and unique.
///
/// # Examples
/// ```
/// use treegen_model::FeatureContract;
///
/// let contract = FeatureContract::default();
/// assert_eq!(contract.index_of("Humidity"), Some(1));
/// assert_eq!(contract.index_of("WindSpeed"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureContract {
    /// Feature names in slot order.
    names: Vec<String>,
}

impl FeatureContract {
    /// Builds a contract from ordered names.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidContract`] for an empty list, a blank
    /// name, or a duplicate name.
    pub fn new<I, S>(names: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ModelError::InvalidContract("feature list is empty".to_string()));
        }
        let mut seen = BTreeSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(ModelError::InvalidContract("feature names must be non-blank".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelError::InvalidContract(format!("duplicate feature name {name}")));
            }
        }
        Ok(Self {
            names,
        })
    }

    /// Returns the slot of `name`, if present.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Returns the names in slot order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the name at `slot`.
    #[must_use]
    pub fn name(&self, slot: usize) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    /// Returns the number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed contract.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Builds the tree-feature to contract-slot mapping for `tree`.
    ///
    /// When the tree carries its training-time names each name is looked up
    /// with [`FeatureContract::index_of`]; otherwise tree feature indices are
    /// taken to be contract slots. Unresolvable entries only fail when a
    /// split actually uses them (see [`FeatureMap::slot`]).
    #[must_use]
    pub fn resolve(&self, tree: &FittedTree) -> FeatureMap {
        let entries = tree.feature_names().map_or_else(
            || self.names.iter().enumerate().map(|(slot, name)| (name.clone(), Some(slot))).collect(),
            |names| names.iter().map(|name| (name.clone(), self.index_of(name))).collect(),
        );
        FeatureMap {
            entries,
        }
    }
}

impl Default for FeatureContract {
    fn default() -> Self {
        Self {
            names: DEFAULT_FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        }
    }
}

// ============================================================================
// SECTION: Feature Map
// ============================================================================

/// Resolved mapping from a tree's feature indices to contract slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMap {
    /// Per tree feature index: its name and contract slot, if any.
    entries: Vec<(String, Option<usize>)>,
}

impl FeatureMap {
    /// Returns the name of tree feature `feature_index`, if known.
    #[must_use]
    pub fn name(&self, feature_index: usize) -> Option<&str> {
        self.entries.get(feature_index).map(|(name, _)| name.as_str())
    }

    /// Returns the contract slot for a split on `feature_index`.
    ///
    /// # Errors
    /// Returns [`ModelError::FeatureMapping`] when the index is unknown or
    /// its name is absent from the contract.
    pub fn slot(&self, feature_index: usize) -> Result<usize, ModelError> {
        match self.entries.get(feature_index) {
            Some((_, Some(slot))) => Ok(*slot),
            Some((name, None)) => Err(ModelError::FeatureMapping(format!(
                "split feature {name} is not in the feature contract"
            ))),
            None => Err(ModelError::FeatureMapping(format!(
                "split feature index {feature_index} exceeds the {} known features",
                self.entries.len()
            ))),
        }
    }
}
