// crates/treegen/src/export.rs
// ============================================================================
// Module: Export Pipeline
// Description: Load -> validate -> emit -> package -> write orchestration.
// Purpose: Run one export command end to end and audit the outcome.
// Dependencies: treegen-config, treegen-model
// ============================================================================

//! ## Overview
//! An [`Exporter`] owns a validated configuration and runs the one-shot
//! pipeline. Both generated texts are rendered completely before any file is
//! touched, so a malformed tree or an unmapped feature writes nothing. Every
//! command records one audit event, success or failure.

use std::path::Path;
use std::path::PathBuf;

use treegen_config::ProfileName;
use treegen_config::TreegenConfig;
use treegen_model::FeatureContract;
use treegen_model::FittedTree;
use treegen_model::TreeStats;
use treegen_model::load_tree;

use crate::audit::ExportAuditEvent;
use crate::audit::ExportAuditEventParams;
use crate::audit::ExportAuditSink;
use crate::audit::ExportCommand;
use crate::audit::ExportOutcome;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::emit::emit_with;
use crate::error::ExportError;
use crate::output::check_outputs;
use crate::output::write_outputs;
use crate::package::EmittedArtifact;
use crate::package::package;
use crate::profile::TargetProfile;
use crate::rules::render_rules;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Summary of a successful export or check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Implementation file path.
    pub implementation_path: PathBuf,
    /// Interface file path.
    pub interface_path: PathBuf,
    /// Statistics of the exported tree.
    pub stats: TreeStats,
    /// Profile the sources were generated for.
    pub profile: ProfileName,
}

/// Runs export commands for one configuration.
pub struct Exporter {
    /// Validated configuration.
    config: TreegenConfig,
    /// Feature contract built from the configuration.
    contract: FeatureContract,
    /// Selected target profile.
    profile: TargetProfile,
    /// Audit sink for command events.
    audit: Box<dyn ExportAuditSink>,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl Exporter {
    /// Validates `config` and prepares the pipeline.
    ///
    /// The audit sink follows `[audit]`: a JSON-lines file when a path is
    /// set, stderr otherwise, nothing when disabled.
    ///
    /// # Errors
    /// Returns [`ExportError::Config`] for invalid configuration and
    /// [`ExportError::Filesystem`] when the audit log cannot be opened.
    pub fn new(config: TreegenConfig) -> Result<Self, ExportError> {
        config.validate()?;
        let contract = config.feature_contract()?;
        let profile = TargetProfile::from_config(&config);
        let audit = audit_sink(&config)?;
        Ok(Self {
            config,
            contract,
            profile,
            audit,
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Box<dyn ExportAuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TreegenConfig {
        &self.config
    }

    /// Returns the feature contract.
    #[must_use]
    pub const fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    /// Returns the selected target profile.
    #[must_use]
    pub const fn profile(&self) -> &TargetProfile {
        &self.profile
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

impl Exporter {
    /// Loads and validates the configured tree artifact.
    ///
    /// # Errors
    /// Returns [`ExportError::ArtifactLoad`] or [`ExportError::InvalidTree`].
    pub fn load_tree(&self) -> Result<FittedTree, ExportError> {
        Ok(load_tree(&self.config.model_path(), self.config.model.max_bytes)?)
    }

    /// Renders both source texts for `tree` without touching disk.
    ///
    /// # Errors
    /// Returns [`ExportError::FeatureMapping`] or [`ExportError::Render`].
    pub fn render(&self, tree: &FittedTree) -> Result<EmittedArtifact, ExportError> {
        let body = emit_with(tree, &self.contract, &self.profile.emit_options())?;
        package(&body, &self.profile)
    }

    /// Generates and writes the implementation and interface files.
    ///
    /// # Errors
    /// Returns the first pipeline failure; no file is replaced on failure
    /// before the write stage.
    pub fn export(&self) -> Result<ExportReport, ExportError> {
        let mut stats = None;
        let result = self.run_export(&mut stats);
        self.record(ExportCommand::Export, stats, self.output_paths(), &result);
        result
    }

    /// Regenerates in memory and compares with the files on disk.
    ///
    /// # Errors
    /// Returns [`ExportError::Drift`] when any file differs.
    pub fn check(&self) -> Result<ExportReport, ExportError> {
        let mut stats = None;
        let result = self.run_check(&mut stats);
        self.record(ExportCommand::Check, stats, self.output_paths(), &result);
        result
    }

    /// Renders the rule listing, writing it to `out` when given.
    ///
    /// # Errors
    /// Returns loading, mapping, or filesystem failures.
    pub fn rules(&self, out: Option<&Path>) -> Result<String, ExportError> {
        let mut stats = None;
        let result = self.run_rules(out, &mut stats);
        let outputs = out.map(|path| vec![path.display().to_string()]).unwrap_or_default();
        self.record(ExportCommand::Rules, stats, outputs, &result);
        result
    }

    /// Export body; fills `stats` once the tree is loaded.
    fn run_export(&self, stats: &mut Option<TreeStats>) -> Result<ExportReport, ExportError> {
        let tree = self.load_tree()?;
        *stats = Some(tree.stats());
        let artifact = self.render(&tree)?;
        let report = self.report(tree.stats());
        write_outputs(&[
            (report.implementation_path.as_path(), artifact.implementation.as_str()),
            (report.interface_path.as_path(), artifact.interface.as_str()),
        ])?;
        Ok(report)
    }

    /// Check body; fills `stats` once the tree is loaded.
    fn run_check(&self, stats: &mut Option<TreeStats>) -> Result<ExportReport, ExportError> {
        let tree = self.load_tree()?;
        *stats = Some(tree.stats());
        let artifact = self.render(&tree)?;
        let report = self.report(tree.stats());
        check_outputs(&[
            (report.implementation_path.as_path(), artifact.implementation.as_str()),
            (report.interface_path.as_path(), artifact.interface.as_str()),
        ])?;
        Ok(report)
    }

    /// Rules body; fills `stats` once the tree is loaded.
    fn run_rules(
        &self,
        out: Option<&Path>,
        stats: &mut Option<TreeStats>,
    ) -> Result<String, ExportError> {
        let tree = self.load_tree()?;
        *stats = Some(tree.stats());
        let text = render_rules(&tree, &self.contract)?;
        if let Some(path) = out {
            write_outputs(&[(path, text.as_str())])?;
        }
        Ok(text)
    }

    /// Builds the report for the configured outputs.
    fn report(&self, stats: TreeStats) -> ExportReport {
        ExportReport {
            implementation_path: self.config.implementation_path(),
            interface_path: self.config.interface_path(),
            stats,
            profile: self.profile.name(),
        }
    }

    /// Display strings of both output paths.
    fn output_paths(&self) -> Vec<String> {
        vec![
            self.config.implementation_path().display().to_string(),
            self.config.interface_path().display().to_string(),
        ]
    }

    /// Records one audit event for a finished command.
    fn record<T>(
        &self,
        command: ExportCommand,
        stats: Option<TreeStats>,
        outputs: Vec<String>,
        result: &Result<T, ExportError>,
    ) {
        let (outcome, error_kind, error) = match result {
            Ok(_) => (ExportOutcome::Success, None, None),
            Err(err) => (ExportOutcome::Failure, Some(err.stage()), Some(err.to_string())),
        };
        self.audit.record(&ExportAuditEvent::new(ExportAuditEventParams {
            command,
            outcome,
            model_path: self.config.model_path().display().to_string(),
            profile: self.profile.name(),
            stats,
            outputs,
            error_kind,
            error,
        }));
    }
}

/// Builds the audit sink selected by `config`.
fn audit_sink(config: &TreegenConfig) -> Result<Box<dyn ExportAuditSink>, ExportError> {
    if !config.audit.enabled {
        return Ok(Box::new(NoopAuditSink));
    }
    match config.audit_path() {
        Some(path) => {
            let sink = FileAuditSink::new(&path).map_err(|err| ExportError::filesystem(&path, err))?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(StderrAuditSink)),
    }
}
