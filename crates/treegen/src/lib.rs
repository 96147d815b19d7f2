// crates/treegen/src/lib.rs
// ============================================================================
// Module: treegen Library
// Description: Decision tree to embedded C code generation.
// Purpose: Deterministic branch code and headers from a fitted tree artifact.
// Dependencies: treegen-model, treegen-config, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `treegen` lowers a fitted binary decision tree into a dependency-free C
//! function of nested `if`/`else` branches plus a matching header, so an
//! embedded target can classify sensor readings without any ML runtime.
//!
//! The pipeline is: load the tree ([`treegen_model::load_tree`]), map split
//! features to contract slots, [`emit`] the branch body, [`package`] it for a
//! [`TargetProfile`], and write both files. [`Exporter`] runs the whole
//! pipeline from a [`treegen_config::TreegenConfig`].
//!
//! Generated text is byte-deterministic: the same tree, contract, and
//! profile always produce the same files.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod emit;
pub mod error;
pub mod export;
pub mod output;
pub mod package;
pub mod profile;
pub mod rules;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ExportAuditEvent;
pub use audit::ExportAuditSink;
pub use emit::EmitOptions;
pub use emit::INDENT_UNIT;
pub use emit::THRESHOLD_DECIMALS;
pub use emit::emit;
pub use emit::emit_with;
pub use emit::format_threshold;
pub use error::ExportError;
pub use export::ExportReport;
pub use export::Exporter;
pub use output::check_outputs;
pub use output::write_outputs;
pub use package::EmittedArtifact;
pub use package::GENERATED_BANNER;
pub use package::package;
pub use profile::ProfileKind;
pub use profile::TargetProfile;
pub use rules::render_rules;
