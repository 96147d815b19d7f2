// crates/treegen/src/package.rs
// ============================================================================
// Module: Artifact Packager
// Description: Wraps an emitted branch body into C implementation + header.
// Purpose: Produce byte-deterministic compilation units for a target profile.
// Dependencies: treegen-config
// ============================================================================

//! ## Overview
//! [`package`] turns the fragment produced by [`crate::emit`] into two texts:
//! an implementation file defining the prediction function and an interface
//! header declaring it. The signature follows the selected
//! [`TargetProfile`]:
//!
//! - struct-input: `int predict_rain(const bme280_data_t *data)` copies the
//!   record fields into a local feature array and also defines a logging init
//!   hook.
//! - flat-array: `int predict_rain(const float features[3])` indexes the
//!   caller's array directly.
//!
//! The record type is never defined here; the header only includes the file
//! that defines it. The return value is the integer class label chosen by the
//! leaf's majority vote.

use treegen_config::NumericType;

use crate::emit::SourceBuilder;
use crate::error::ExportError;
use crate::profile::FlatArray;
use crate::profile::ProfileKind;
use crate::profile::StructInput;
use crate::profile::TargetProfile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// First line of every generated file.
pub const GENERATED_BANNER: &str = "/* This file is @generated by treegen. DO NOT EDIT. */";

/// Documentation line for the prediction return value.
const RETURN_DOC: &str = "@return Predicted class label (majority class index of the reached leaf).";

// ============================================================================
// SECTION: Types
// ============================================================================

/// The two generated source texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifact {
    /// Implementation (`.c`) text.
    pub implementation: String,
    /// Interface (`.h`) text.
    pub interface: String,
}

// ============================================================================
// SECTION: Packaging
// ============================================================================

/// Wraps `body` into implementation and interface texts for `profile`.
///
/// `body` is expected to be emitted at `profile.base_indent`.
///
/// # Errors
/// Returns [`ExportError::Render`] when `body` is not brace balanced.
pub fn package(body: &str, profile: &TargetProfile) -> Result<EmittedArtifact, ExportError> {
    ensure_balanced(body)?;
    let guard = include_guard(&profile.interface_file);
    let (implementation, interface) = match &profile.kind {
        ProfileKind::StructInput(settings) => (
            struct_implementation(body, profile, settings)?,
            struct_interface(profile, settings, &guard),
        ),
        ProfileKind::FlatArray(settings) => (
            flat_implementation(body, profile, settings)?,
            flat_interface(profile, settings, &guard),
        ),
    };
    Ok(EmittedArtifact {
        implementation,
        interface,
    })
}

/// Derives the include guard macro from the interface file name.
///
/// # Examples
/// ```
/// use treegen::package::include_guard;
///
/// assert_eq!(include_guard("rain_model.h"), "RAIN_MODEL_H");
/// assert_eq!(include_guard("2-tree.h"), "H_2_TREE_H");
/// ```
#[must_use]
pub fn include_guard(interface_file: &str) -> String {
    let mut guard: String = interface_file
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if !guard.starts_with(|c: char| c.is_ascii_alphabetic()) {
        guard.insert_str(0, "H_");
    }
    guard
}

// ============================================================================
// SECTION: Struct-Input Profile
// ============================================================================

/// Renders the struct-input implementation.
fn struct_implementation(
    body: &str,
    profile: &TargetProfile,
    settings: &StructInput,
) -> Result<String, ExportError> {
    let mut out = SourceBuilder::new();
    out.line(0, GENERATED_BANNER);
    out.blank();
    out.line(0, "#include <zephyr/logging/log.h>");
    out.line(0, &format!("#include \"{}\"", profile.interface_file));
    out.blank();
    out.line(0, &format!("LOG_MODULE_REGISTER({}, CONFIG_LOG_DEFAULT_LEVEL);", settings.log_module));
    out.blank();
    out.open(0, &format!("void {}(void)", settings.init_function));
    out.line(1, &format!("LOG_INF(\"{}\");", settings.init_message));
    out.close(0)?;
    out.blank();
    out.open(0, &struct_signature(profile, settings));
    let local_type = settings.local_type.c_name();
    out.line(1, &format!("{local_type} {}[{}];", profile.input_array, profile.feature_count()));
    for (slot, field) in settings.fields.iter().enumerate() {
        out.line(
            1,
            &format!(
                "{}[{slot}] = ({local_type}){}->{field};",
                profile.input_array, settings.record_param
            ),
        );
    }
    out.fragment(body);
    out.close(0)?;
    out.finish()
}

/// Renders the struct-input interface.
fn struct_interface(profile: &TargetProfile, settings: &StructInput, guard: &str) -> String {
    let mut doc = vec![
        "@brief Classifies one sensor record with the decision tree.".to_string(),
        String::new(),
        "Feature slots:".to_string(),
    ];
    for (slot, (name, field)) in profile.feature_names.iter().zip(&settings.fields).enumerate() {
        doc.push(format!("  [{slot}] {} <- {}->{field}", doc_text(name), settings.record_param));
    }
    doc.push(String::new());
    doc.push(format!("@param {} Sensor record to classify.", settings.record_param));
    doc.push(RETURN_DOC.to_string());

    let mut out = String::new();
    open_interface(&mut out, guard);
    out.push_str(&format!("#include \"{}\"\n\n", settings.record_header));
    push_doc(&mut out, &["@brief Initializes the decision tree model.".to_string()]);
    out.push_str(&format!("void {}(void);\n\n", settings.init_function));
    push_doc(&mut out, &doc);
    out.push_str(&format!("{};\n", struct_signature(profile, settings)));
    close_interface(&mut out, guard);
    out
}

/// Returns the struct-input function signature.
fn struct_signature(profile: &TargetProfile, settings: &StructInput) -> String {
    format!(
        "int {}(const {} *{})",
        profile.function_name, settings.record_type, settings.record_param
    )
}

// ============================================================================
// SECTION: Flat-Array Profile
// ============================================================================

/// Renders the flat-array implementation.
fn flat_implementation(
    body: &str,
    profile: &TargetProfile,
    settings: &FlatArray,
) -> Result<String, ExportError> {
    let mut out = SourceBuilder::new();
    out.line(0, GENERATED_BANNER);
    out.blank();
    out.line(0, &format!("#include \"{}\"", profile.interface_file));
    out.blank();
    out.open(0, &flat_signature(profile, settings.element_type));
    out.fragment(body);
    out.close(0)?;
    out.finish()
}

/// Renders the flat-array interface.
fn flat_interface(profile: &TargetProfile, settings: &FlatArray, guard: &str) -> String {
    let mut doc = vec![
        "@brief Classifies one feature vector with the decision tree.".to_string(),
        String::new(),
        format!("@param {} Feature values in slot order:", profile.input_array),
    ];
    for (slot, name) in profile.feature_names.iter().enumerate() {
        doc.push(format!("  [{slot}] {}", doc_text(name)));
    }
    doc.push(RETURN_DOC.to_string());

    let mut out = String::new();
    open_interface(&mut out, guard);
    push_doc(&mut out, &doc);
    out.push_str(&format!("{};\n", flat_signature(profile, settings.element_type)));
    close_interface(&mut out, guard);
    out
}

/// Returns the flat-array function signature.
fn flat_signature(profile: &TargetProfile, element_type: NumericType) -> String {
    format!(
        "int {}(const {} {}[{}])",
        profile.function_name,
        element_type.c_name(),
        profile.input_array,
        profile.feature_count()
    )
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes the banner and opening include guard.
fn open_interface(out: &mut String, guard: &str) {
    out.push_str(GENERATED_BANNER);
    out.push_str("\n\n");
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
}

/// Writes the closing include guard.
fn close_interface(out: &mut String, guard: &str) {
    out.push_str(&format!("\n#endif /* {guard} */\n"));
}

/// Writes a `/** ... */` block, one ` * ` line per entry.
fn push_doc(out: &mut String, lines: &[String]) {
    out.push_str("/**\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(" */\n");
}

/// Makes free text safe inside a block comment.
fn doc_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .replace("*/", "* /")
}

/// Rejects fragments whose braces do not balance.
fn ensure_balanced(body: &str) -> Result<(), ExportError> {
    let mut open: usize = 0;
    for c in body.chars() {
        match c {
            '{' => open += 1,
            '}' => {
                open = open.checked_sub(1).ok_or_else(|| {
                    ExportError::Render("function body closes a block it never opened".to_string())
                })?;
            }
            _ => {}
        }
    }
    if open != 0 {
        return Err(ExportError::Render(format!("function body leaves {open} block(s) open")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_cannot_close_the_block() {
        assert_eq!(doc_text("a */ b\nc"), "a * / b c");
    }

    #[test]
    fn unbalanced_bodies_are_rejected() {
        assert!(ensure_balanced("    }\n    {\n").is_err());
        assert!(ensure_balanced("    if (x) {\n").is_err());
        assert!(ensure_balanced("    return 0;\n").is_ok());
    }

    #[test]
    fn guards_are_identifiers() {
        assert_eq!(include_guard("weather-tree.hpp"), "WEATHER_TREE_HPP");
        assert_eq!(include_guard("_x.h"), "H__X_H");
    }
}
