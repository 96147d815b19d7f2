// crates/treegen/src/audit.rs
// ============================================================================
// Module: Export Audit Logging
// Description: Structured audit events for export runs.
// Purpose: Record what was generated, from which artifact, and why it failed.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each CLI command produces one [`ExportAuditEvent`], serialized as a JSON
//! line. Sinks swallow their own failures; auditing never fails an export.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use treegen_config::ProfileName;
use treegen_model::TreeStats;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Command that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportCommand {
    /// Generate and write sources.
    Export,
    /// Compare generated sources with disk.
    Check,
    /// Render the rule listing.
    Rules,
}

/// Command outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Command completed.
    Success,
    /// Command failed.
    Failure,
}

/// Export audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ExportAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Command that ran.
    pub command: ExportCommand,
    /// Command outcome.
    pub outcome: ExportOutcome,
    /// Tree artifact path.
    pub model_path: String,
    /// Selected target profile.
    pub profile: ProfileName,
    /// Node count, when the tree loaded.
    pub node_count: Option<usize>,
    /// Leaf count, when the tree loaded.
    pub leaf_count: Option<usize>,
    /// Tree depth, when the tree loaded.
    pub depth: Option<usize>,
    /// Files written or compared.
    pub outputs: Vec<String>,
    /// Failing stage label.
    pub error_kind: Option<&'static str>,
    /// Failure message.
    pub error: Option<String>,
}

/// Inputs required to construct an export audit event.
pub struct ExportAuditEventParams {
    /// Command that ran.
    pub command: ExportCommand,
    /// Command outcome.
    pub outcome: ExportOutcome,
    /// Tree artifact path.
    pub model_path: String,
    /// Selected target profile.
    pub profile: ProfileName,
    /// Tree statistics, when the tree loaded.
    pub stats: Option<TreeStats>,
    /// Files written or compared.
    pub outputs: Vec<String>,
    /// Failing stage label.
    pub error_kind: Option<&'static str>,
    /// Failure message.
    pub error: Option<String>,
}

impl ExportAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ExportAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "tree_export",
            timestamp_ms,
            command: params.command,
            outcome: params.outcome,
            model_path: params.model_path,
            profile: params.profile,
            node_count: params.stats.map(|stats| stats.node_count),
            leaf_count: params.stats.map(|stats| stats.leaf_count),
            depth: params.stats.map(|stats| stats.depth),
            outputs: params.outputs,
            error_kind: params.error_kind,
            error: params.error,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for export events.
pub trait ExportAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ExportAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ExportAuditSink for StderrAuditSink {
    fn record(&self, event: &ExportAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ExportAuditSink for FileAuditSink {
    fn record(&self, event: &ExportAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ExportAuditSink for NoopAuditSink {
    fn record(&self, _event: &ExportAuditEvent) {}
}
