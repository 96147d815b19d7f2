// crates/treegen/src/main.rs
// ============================================================================
// Module: treegen CLI
// Description: CLI entrypoint for decision tree C export.
// Purpose: Generate, verify, and inspect embedded tree code from the shell.
// Dependencies: clap, treegen, treegen-config
// ============================================================================

//! ## Overview
//! `treegen export` writes the implementation and header for a fitted tree,
//! `treegen check` verifies on-disk outputs still match, and `treegen rules`
//! prints the tree as a text rule listing. Flags override the loaded
//! `treegen.toml`; relative flag paths resolve against the working
//! directory.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use treegen::ExportError;
use treegen::ExportReport;
use treegen::Exporter;
use treegen_config::ProfileName;
use treegen_config::TreegenConfig;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// CLI arguments for tree export.
#[derive(Debug, Parser)]
#[command(name = "treegen", about = "Export a fitted decision tree as embedded C code.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Generate and write the implementation and interface files.
    Export(TargetArgs),
    /// Verify the generated files on disk match the tree.
    Check(TargetArgs),
    /// Print the tree as an indented rule listing.
    Rules {
        /// Config and model selection.
        #[command(flatten)]
        source: SourceArgs,
        /// Write the listing to this file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

/// Config and model selection shared by every command.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Path to treegen.toml (defaults to ./treegen.toml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Tree artifact path, overriding `[model] path`.
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,
}

/// Overrides for commands that generate sources.
#[derive(Debug, Args)]
struct TargetArgs {
    /// Config and model selection.
    #[command(flatten)]
    source: SourceArgs,
    /// Output directory, overriding `[output] dir`.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Target profile, overriding `[target] profile`.
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,
    /// Body indentation level, overriding `[target] base_indent`.
    #[arg(long, value_name = "N")]
    base_indent: Option<usize>,
}

/// Profile choices on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// `int f(const record_t *data)` with an init hook.
    #[value(name = "struct_input")]
    StructInput,
    /// `int f(const float features[N])`.
    #[value(name = "flat_array")]
    FlatArray,
}

impl From<ProfileArg> for ProfileName {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::StructInput => Self::StructInput,
            ProfileArg::FlatArray => Self::FlatArray,
        }
    }
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

/// Dispatches the CLI command.
fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Export(args) => {
            let report = exporter(&args)?.export()?;
            write_stdout(&format!("wrote {}", summary(&report)))
        }
        Command::Check(args) => {
            let report = exporter(&args)?.check()?;
            write_stdout(&format!("up to date: {}", summary(&report)))
        }
        Command::Rules {
            source,
            out,
        } => {
            let out = out.map(|path| absolute(&path)).transpose()?;
            let config = load_config(&source)?;
            let text = Exporter::new(config)?.rules(out.as_deref())?;
            match out {
                Some(path) => write_stdout(&format!("wrote rules to {}", path.display())),
                None => write_stdout(text.trim_end()),
            }
        }
    }
}

/// Loads configuration and applies every target override.
fn exporter(args: &TargetArgs) -> Result<Exporter, ExportError> {
    let mut config = load_config(&args.source)?;
    if let Some(dir) = &args.out_dir {
        config.output.dir = path_string(&absolute(dir)?)?;
    }
    if let Some(profile) = args.profile {
        config.target.profile = profile.into();
    }
    if let Some(base_indent) = args.base_indent {
        config.target.base_indent = base_indent;
    }
    Exporter::new(config)
}

/// Loads configuration and applies the model override.
fn load_config(source: &SourceArgs) -> Result<TreegenConfig, ExportError> {
    let mut config = TreegenConfig::load(source.config.as_deref())?;
    if let Some(model) = &source.model {
        config.model.path = path_string(&absolute(model)?)?;
    }
    Ok(config)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a CLI path against the working directory.
fn absolute(path: &Path) -> Result<PathBuf, ExportError> {
    std::path::absolute(path).map_err(|err| ExportError::filesystem(path, err))
}

/// Converts a path into the UTF-8 form configuration stores.
fn path_string(path: &Path) -> Result<String, ExportError> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| ExportError::Config(format!("{} is not valid utf-8", path.display())))
}

/// Formats the one-line run summary.
fn summary(report: &ExportReport) -> String {
    format!(
        "{} and {} ({}: {} nodes, {} leaves, depth {})",
        report.implementation_path.display(),
        report.interface_path.display(),
        report.profile,
        report.stats.node_count,
        report.stats.leaf_count,
        report.stats.depth
    )
}

/// Writes one line to stdout.
fn write_stdout(line: &str) -> Result<(), ExportError> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{line}").map_err(|err| ExportError::filesystem(Path::new("<stdout>"), err))
}

/// Reports a CLI error to stderr.
fn report_error(err: &ExportError) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "treegen {} failed: {err}", err.stage());
    ExitCode::FAILURE
}
