// crates/treegen/src/profile.rs
// ============================================================================
// Module: Target Profiles
// Description: Resolved signature shape of the generated prediction function.
// Purpose: Turn validated configuration into the inputs the packager needs.
// Dependencies: treegen-config
// ============================================================================

//! ## Overview
//! A [`TargetProfile`] is the packager's view of a run: the function name,
//! the feature array, and one of two signature shapes. Exactly one shape is
//! selected per run.

use treegen_config::NumericType;
use treegen_config::ProfileName;
use treegen_config::TreegenConfig;

use crate::emit::EmitOptions;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Signature shape and names for the generated function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProfile {
    /// Prediction function name.
    pub function_name: String,
    /// Feature array identifier used by the emitted branches.
    pub input_array: String,
    /// Indentation level of the emitted body.
    pub base_indent: usize,
    /// Interface file name, included by the implementation.
    pub interface_file: String,
    /// Feature names in slot order.
    pub feature_names: Vec<String>,
    /// Profile-specific settings.
    pub kind: ProfileKind,
}

/// The two supported signature shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileKind {
    /// `int f(const record_t *data)` with an init hook.
    StructInput(StructInput),
    /// `int f(const float features[N])`.
    FlatArray(FlatArray),
}

/// Struct-input profile settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInput {
    /// Externally defined record type.
    pub record_type: String,
    /// Header that defines the record type.
    pub record_header: String,
    /// Record pointer parameter name.
    pub record_param: String,
    /// Record field per feature slot.
    pub fields: Vec<String>,
    /// Element type of the local feature array.
    pub local_type: NumericType,
    /// Init hook name.
    pub init_function: String,
    /// Init hook log line.
    pub init_message: String,
    /// Log module registered by the implementation.
    pub log_module: String,
}

/// Flat-array profile settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatArray {
    /// Element type of the array parameter.
    pub element_type: NumericType,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl TargetProfile {
    /// Builds the profile selected by `config`.
    ///
    /// `config` is expected to be validated already.
    #[must_use]
    pub fn from_config(config: &TreegenConfig) -> Self {
        let target = &config.target;
        let kind = match target.profile {
            ProfileName::StructInput => {
                let settings = &target.struct_input;
                ProfileKind::StructInput(StructInput {
                    record_type: settings.record_type.clone(),
                    record_header: settings.record_header.clone(),
                    record_param: settings.record_param.clone(),
                    fields: settings.field_names(&config.features.names),
                    local_type: settings.local_type,
                    init_function: settings.init_function.clone(),
                    init_message: settings.init_message.clone(),
                    log_module: config.log_module(),
                })
            }
            ProfileName::FlatArray => ProfileKind::FlatArray(FlatArray {
                element_type: target.flat_array.element_type,
            }),
        };
        Self {
            function_name: target.function_name.clone(),
            input_array: target.input_array.clone(),
            base_indent: target.base_indent,
            interface_file: config.output.interface.clone(),
            feature_names: config.features.names.clone(),
            kind,
        }
    }

    /// Returns the configuration label of this profile.
    #[must_use]
    pub const fn name(&self) -> ProfileName {
        match self.kind {
            ProfileKind::StructInput(_) => ProfileName::StructInput,
            ProfileKind::FlatArray(_) => ProfileName::FlatArray,
        }
    }

    /// Returns the emitter settings matching this profile.
    #[must_use]
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            input_array: self.input_array.clone(),
            base_indent: self.base_indent,
        }
    }

    /// Number of feature slots in the generated array.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }
}
