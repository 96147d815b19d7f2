// crates/treegen-config/src/config.rs
// ============================================================================
// Module: treegen Configuration
// Description: Configuration loading and validation for tree exports.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: treegen-model, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with size and path limits. Every
//! section has defaults that reproduce the weather-station export, so an
//! empty file (or no file at all) is a valid configuration. Names that end up
//! in generated C source are validated as C identifiers.
//!
//! Relative paths resolve against the directory of the loaded config file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use treegen_model::DEFAULT_FEATURE_NAMES;
use treegen_model::DEFAULT_MAX_ARTIFACT_BYTES;
use treegen_model::FeatureContract;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "treegen.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum indentation depth the emitted body may start at.
pub const MAX_BASE_INDENT: usize = 16;
/// Maximum length of a generated C identifier.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 63;
/// Maximum number of features in the contract.
pub(crate) const MAX_FEATURES: usize = 1024;
/// Maximum length of the init hook log message.
pub(crate) const MAX_INIT_MESSAGE_LENGTH: usize = 256;

/// Reserved C keywords that cannot be used as generated identifiers.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Tree export configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreegenConfig {
    /// Fitted tree artifact input.
    #[serde(default)]
    pub model: ModelConfig,
    /// Feature contract.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Generated function shape.
    #[serde(default)]
    pub target: TargetConfig,
    /// Generated file locations.
    #[serde(default)]
    pub output: OutputConfig,
    /// Audit logging.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Directory relative paths resolve against (not serialized).
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl TreegenConfig {
    /// Loads configuration from disk.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_NAME`] in
    /// the working directory is used when present, otherwise the built-in
    /// defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_NAME);
                if !fallback.is_file() {
                    let config = Self::default();
                    config.validate()?;
                    return Ok(config);
                }
                fallback
            }
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::parse(content)?;
        config.source_dir = resolved
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.features.validate()?;
        self.output.validate()?;
        self.audit.validate()?;
        self.target.validate(&self.features.names)?;
        if self.output.implementation == self.output.interface {
            return Err(ConfigError::Invalid(
                "output.implementation and output.interface must differ".to_string(),
            ));
        }
        if self.target.profile == ProfileName::StructInput {
            validate_identifier("target.struct_input.log_module", &self.log_module())?;
        }
        Ok(())
    }

    /// Builds the feature contract from `[features]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the names do not form a contract.
    pub fn feature_contract(&self) -> Result<FeatureContract, ConfigError> {
        FeatureContract::new(self.features.names.iter().cloned())
            .map_err(|err| ConfigError::Invalid(format!("features.names: {err}")))
    }

    /// Returns the log module name for the struct-input init hook.
    ///
    /// Defaults to the interface file stem (`rain_model.h` -> `rain_model`).
    #[must_use]
    pub fn log_module(&self) -> String {
        self.target.struct_input.log_module.clone().unwrap_or_else(|| {
            Path::new(&self.output.interface)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    /// Resolves a configured path against the config file directory.
    #[must_use]
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        match &self.source_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Returns the resolved tree artifact path.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.resolve_path(&self.model.path)
    }

    /// Returns the resolved implementation file path.
    #[must_use]
    pub fn implementation_path(&self) -> PathBuf {
        self.resolve_path(&self.output.dir).join(&self.output.implementation)
    }

    /// Returns the resolved interface file path.
    #[must_use]
    pub fn interface_path(&self) -> PathBuf {
        self.resolve_path(&self.output.dir).join(&self.output.interface)
    }

    /// Returns the resolved audit log path, when configured.
    #[must_use]
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.audit.path.as_deref().map(|path| self.resolve_path(path))
    }
}

/// Fitted tree artifact configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Path to the JSON tree artifact.
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Maximum artifact size in bytes.
    #[serde(default = "default_model_max_bytes")]
    pub max_bytes: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            max_bytes: default_model_max_bytes(),
        }
    }
}

impl ModelConfig {
    /// Validates artifact input settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("model.path", &self.path)?;
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid("model.max_bytes must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Feature contract configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Feature names in input-array slot order.
    #[serde(default = "default_feature_names")]
    pub names: Vec<String>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            names: default_feature_names(),
        }
    }
}

impl FeaturesConfig {
    /// Validates the contract names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.names.len() > MAX_FEATURES {
            return Err(ConfigError::Invalid(format!(
                "features.names exceeds {MAX_FEATURES} entries"
            )));
        }
        FeatureContract::new(self.names.iter().cloned())
            .map_err(|err| ConfigError::Invalid(format!("features.names: {err}")))?;
        Ok(())
    }
}

/// Generated function signature profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// Function takes a pointer to a sensor record.
    #[default]
    StructInput,
    /// Function takes a fixed-size numeric array.
    FlatArray,
}

impl ProfileName {
    /// Returns the stable configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructInput => "struct_input",
            Self::FlatArray => "flat_array",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric element types available to generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericType {
    /// 32-bit `float`.
    Float,
    /// 64-bit `double`.
    Double,
}

impl NumericType {
    /// Returns the C spelling of the type.
    #[must_use]
    pub const fn c_name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

/// Generated function configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Selected signature profile.
    #[serde(default)]
    pub profile: ProfileName,
    /// Name of the prediction function.
    #[serde(default = "default_function_name")]
    pub function_name: String,
    /// Name of the feature array the branches index.
    #[serde(default = "default_input_array")]
    pub input_array: String,
    /// Indentation level of the first emitted branch line.
    #[serde(default = "default_base_indent")]
    pub base_indent: usize,
    /// Struct-input profile settings.
    #[serde(default)]
    pub struct_input: StructInputConfig,
    /// Flat-array profile settings.
    #[serde(default)]
    pub flat_array: FlatArrayConfig,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            profile: ProfileName::default(),
            function_name: default_function_name(),
            input_array: default_input_array(),
            base_indent: default_base_indent(),
            struct_input: StructInputConfig::default(),
            flat_array: FlatArrayConfig::default(),
        }
    }
}

impl TargetConfig {
    /// Validates the selected profile against the feature names.
    fn validate(&self, feature_names: &[String]) -> Result<(), ConfigError> {
        validate_identifier("target.function_name", &self.function_name)?;
        validate_identifier("target.input_array", &self.input_array)?;
        if self.base_indent > MAX_BASE_INDENT {
            return Err(ConfigError::Invalid(format!(
                "target.base_indent must be at most {MAX_BASE_INDENT}"
            )));
        }
        if self.function_name == self.input_array {
            return Err(ConfigError::Invalid(
                "target.function_name and target.input_array must differ".to_string(),
            ));
        }
        match self.profile {
            ProfileName::StructInput => self.validate_struct_input(feature_names),
            ProfileName::FlatArray => Ok(()),
        }
    }

    /// Validates struct-input names and the field list.
    fn validate_struct_input(&self, feature_names: &[String]) -> Result<(), ConfigError> {
        let config = &self.struct_input;
        validate_identifier("target.struct_input.record_type", &config.record_type)?;
        validate_identifier("target.struct_input.record_param", &config.record_param)?;
        validate_identifier("target.struct_input.init_function", &config.init_function)?;
        validate_file_name("target.struct_input.record_header", &config.record_header)?;
        validate_message("target.struct_input.init_message", &config.init_message)?;

        let names = [
            self.function_name.as_str(),
            self.input_array.as_str(),
            config.record_param.as_str(),
            config.init_function.as_str(),
            config.record_type.as_str(),
        ];
        for (index, name) in names.iter().enumerate() {
            if names[.. index].contains(name) {
                return Err(ConfigError::Invalid(format!(
                    "target identifier {name} is used more than once"
                )));
            }
        }

        let fields = config.field_names(feature_names);
        if fields.len() != feature_names.len() {
            return Err(ConfigError::Invalid(format!(
                "target.struct_input.fields has {} entries but there are {} features",
                fields.len(),
                feature_names.len()
            )));
        }
        for (index, field) in fields.iter().enumerate() {
            validate_identifier("target.struct_input.fields", field)?;
            if fields[.. index].contains(field) {
                return Err(ConfigError::Invalid(format!(
                    "target.struct_input.fields repeats {field}"
                )));
            }
        }
        Ok(())
    }
}

/// Struct-input profile configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructInputConfig {
    /// Sensor record type name (defined externally).
    #[serde(default = "default_record_type")]
    pub record_type: String,
    /// Header that defines the record type.
    #[serde(default = "default_record_header")]
    pub record_header: String,
    /// Parameter name of the record pointer.
    #[serde(default = "default_record_param")]
    pub record_param: String,
    /// Record field per feature, in contract order; defaults to the
    /// lower-cased feature names.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Element type of the local feature array.
    #[serde(default = "default_local_type")]
    pub local_type: NumericType,
    /// Name of the init hook.
    #[serde(default = "default_init_function")]
    pub init_function: String,
    /// Message the init hook logs.
    #[serde(default = "default_init_message")]
    pub init_message: String,
    /// Log module name; defaults to the interface file stem.
    #[serde(default)]
    pub log_module: Option<String>,
}

impl Default for StructInputConfig {
    fn default() -> Self {
        Self {
            record_type: default_record_type(),
            record_header: default_record_header(),
            record_param: default_record_param(),
            fields: None,
            local_type: default_local_type(),
            init_function: default_init_function(),
            init_message: default_init_message(),
            log_module: None,
        }
    }
}

impl StructInputConfig {
    /// Returns the record field per feature in contract order.
    #[must_use]
    pub fn field_names(&self, feature_names: &[String]) -> Vec<String> {
        self.fields.clone().unwrap_or_else(|| {
            feature_names.iter().map(|name| name.to_ascii_lowercase()).collect()
        })
    }
}

/// Flat-array profile configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlatArrayConfig {
    /// Element type of the input array parameter.
    #[serde(default = "default_element_type")]
    pub element_type: NumericType,
}

impl Default for FlatArrayConfig {
    fn default() -> Self {
        Self {
            element_type: default_element_type(),
        }
    }
}

/// Generated file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Destination directory.
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Implementation file name.
    #[serde(default = "default_implementation_file")]
    pub implementation: String,
    /// Interface (header) file name.
    #[serde(default = "default_interface_file")]
    pub interface: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            implementation: default_implementation_file(),
            interface: default_interface_file(),
        }
    }
}

impl OutputConfig {
    /// Validates output locations.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("output.dir", &self.dir)?;
        validate_file_name("output.implementation", &self.implementation)?;
        validate_file_name("output.interface", &self.interface)?;
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default artifact path.
fn default_model_path() -> String {
    "model.json".to_string()
}

/// Default artifact size limit.
const fn default_model_max_bytes() -> u64 {
    DEFAULT_MAX_ARTIFACT_BYTES
}

/// Default feature contract names.
fn default_feature_names() -> Vec<String> {
    DEFAULT_FEATURE_NAMES.iter().map(ToString::to_string).collect()
}

/// Default prediction function name.
fn default_function_name() -> String {
    "predict_rain".to_string()
}

/// Default feature array name.
fn default_input_array() -> String {
    "features".to_string()
}

/// Default body indentation (directly inside the function).
const fn default_base_indent() -> usize {
    1
}

/// Default sensor record type.
fn default_record_type() -> String {
    "bme280_data_t".to_string()
}

/// Default sensor record header.
fn default_record_header() -> String {
    "bme280.h".to_string()
}

/// Default record parameter name.
fn default_record_param() -> String {
    "data".to_string()
}

/// Default local array type for the struct-input profile.
const fn default_local_type() -> NumericType {
    NumericType::Double
}

/// Default init hook name.
fn default_init_function() -> String {
    "ml_model_init".to_string()
}

/// Default init hook log line.
fn default_init_message() -> String {
    "ML model initialized".to_string()
}

/// Default parameter element type for the flat-array profile.
const fn default_element_type() -> NumericType {
    NumericType::Float
}

/// Default output directory.
fn default_output_dir() -> String {
    "src".to_string()
}

/// Default implementation file name.
fn default_implementation_file() -> String {
    "rain_model.c".to_string()
}

/// Default interface file name.
fn default_interface_file() -> String {
    "rain_model.h".to_string()
}

/// Audit logging is on by default.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the resolved config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a bare file name that may also appear in an `#include`.
fn validate_file_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} must be 1..={MAX_PATH_COMPONENT_LENGTH} bytes"
        )));
    }
    let mut components = Path::new(value).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || value.contains(['/', '\\']) {
        return Err(ConfigError::Invalid(format!("{field} must be a bare file name")));
    }
    if value.chars().any(|c| c.is_control() || matches!(c, '"' | '<' | '>')) {
        return Err(ConfigError::Invalid(format!("{field} contains characters unsafe in #include")));
    }
    Ok(())
}

/// Validates a C identifier.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid_start = chars.next().is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    if !valid_start || !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Invalid(format!("{field} must be a C identifier, got {value:?}")));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }
    if C_KEYWORDS.contains(&value) {
        return Err(ConfigError::Invalid(format!("{field} must not be the C keyword {value}")));
    }
    Ok(())
}

/// Validates text embedded in a C string literal.
fn validate_message(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() > MAX_INIT_MESSAGE_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_INIT_MESSAGE_LENGTH} bytes"
        )));
    }
    if value.chars().any(|c| c.is_control() || matches!(c, '"' | '\\' | '%')) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain quotes, backslashes, percent signs, or control characters"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
