// crates/treegen-config/src/lib.rs
// ============================================================================
// Module: treegen Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for treegen.toml semantics.
// Dependencies: treegen-model, serde, toml
// ============================================================================

//! ## Overview
//! `treegen-config` defines the configuration for a tree export run: where
//! the fitted tree lives, the feature contract, which target profile to
//! generate, and where the generated sources go. Validation is strict and
//! fails closed; every identifier that lands in generated C is checked.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
