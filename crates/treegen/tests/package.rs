// crates/treegen/tests/package.rs
// ============================================================================
// Module: Packager Tests
// Description: Exact implementation and interface texts per profile.
// Purpose: Pin generated file layout so embedded builds stay reproducible.
// Dependencies: treegen, treegen-config, treegen-model
// ============================================================================

//! ## Overview
//! Golden-text tests for the struct-input and flat-array profiles, plus
//! header hygiene checks.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use treegen::ExportError;
use treegen::GENERATED_BANNER;
use treegen::TargetProfile;
use treegen::emit_with;
use treegen::package;
use treegen_config::TreegenConfig;
use treegen_model::FeatureContract;

use crate::common::humidity_stump;

fn render(toml: &str) -> (String, String) {
    let config = TreegenConfig::parse(toml).unwrap();
    let profile = TargetProfile::from_config(&config);
    let contract = config.feature_contract().unwrap();
    let body = emit_with(&humidity_stump(), &contract, &profile.emit_options()).unwrap();
    let artifact = package(&body, &profile).unwrap();
    (artifact.implementation, artifact.interface)
}

// ============================================================================
// SECTION: Struct-Input Profile
// ============================================================================

#[test]
fn struct_input_implementation_matches_weather_station_layout() {
    let (implementation, _) = render("");
    let expected = "\
/* This file is @generated by treegen. DO NOT EDIT. */

#include <zephyr/logging/log.h>
#include \"rain_model.h\"

LOG_MODULE_REGISTER(rain_model, CONFIG_LOG_DEFAULT_LEVEL);

void ml_model_init(void) {
    LOG_INF(\"ML model initialized\");
}

int predict_rain(const bme280_data_t *data) {
    double features[3];
    features[0] = (double)data->temperature;
    features[1] = (double)data->humidity;
    features[2] = (double)data->pressure;
    if (features[1] <= 65.00) {
        return 0;
    } else {
        return 1;
    }
}
";
    assert_eq!(implementation, expected);
}

#[test]
fn struct_input_interface_declares_both_functions() {
    let (_, interface) = render("");
    let expected = "\
/* This file is @generated by treegen. DO NOT EDIT. */

#ifndef RAIN_MODEL_H
#define RAIN_MODEL_H

#include \"bme280.h\"

/**
 * @brief Initializes the decision tree model.
 */
void ml_model_init(void);

/**
 * @brief Classifies one sensor record with the decision tree.
 *
 * Feature slots:
 *   [0] Temperature <- data->temperature
 *   [1] Humidity <- data->humidity
 *   [2] Pressure <- data->pressure
 *
 * @param data Sensor record to classify.
 * @return Predicted class label (majority class index of the reached leaf).
 */
int predict_rain(const bme280_data_t *data);

#endif /* RAIN_MODEL_H */
";
    assert_eq!(interface, expected);
    assert!(!interface.contains("percent"));
    assert!(!interface.contains("typedef"));
}

#[test]
fn struct_input_honors_custom_names() {
    let (implementation, interface) = render(
        r#"
        [target]
        function_name = "classify"
        input_array = "x"

        [target.struct_input]
        record_type = "sensor_sample_t"
        record_header = "sensor.h"
        record_param = "sample"
        fields = ["temp_c", "rh", "hpa"]
        local_type = "float"
        init_function = "classifier_init"
        log_module = "classifier"

        [output]
        implementation = "classifier.c"
        interface = "classifier.h"
        "#,
    );
    assert!(implementation.contains("LOG_MODULE_REGISTER(classifier, CONFIG_LOG_DEFAULT_LEVEL);"));
    assert!(implementation.contains("void classifier_init(void) {"));
    assert!(implementation.contains("int classify(const sensor_sample_t *sample) {"));
    assert!(implementation.contains("    float x[3];\n"));
    assert!(implementation.contains("    x[1] = (float)sample->rh;\n"));
    assert!(implementation.contains("    if (x[1] <= 65.00) {\n"));
    assert!(implementation.contains("#include \"classifier.h\""));
    assert!(interface.contains("#ifndef CLASSIFIER_H"));
    assert!(interface.contains("#include \"sensor.h\""));
    assert!(interface.contains("int classify(const sensor_sample_t *sample);"));
}

// ============================================================================
// SECTION: Flat-Array Profile
// ============================================================================

#[test]
fn flat_array_implementation_indexes_parameter_directly() {
    let (implementation, _) = render("[target]\nprofile = \"flat_array\"\n");
    let expected = "\
/* This file is @generated by treegen. DO NOT EDIT. */

#include \"rain_model.h\"

int predict_rain(const float features[3]) {
    if (features[1] <= 65.00) {
        return 0;
    } else {
        return 1;
    }
}
";
    assert_eq!(implementation, expected);
}

#[test]
fn flat_array_interface_has_no_record_or_init_hook() {
    let (_, interface) = render("[target]\nprofile = \"flat_array\"\n");
    let expected = "\
/* This file is @generated by treegen. DO NOT EDIT. */

#ifndef RAIN_MODEL_H
#define RAIN_MODEL_H

/**
 * @brief Classifies one feature vector with the decision tree.
 *
 * @param features Feature values in slot order:
 *   [0] Temperature
 *   [1] Humidity
 *   [2] Pressure
 * @return Predicted class label (majority class index of the reached leaf).
 */
int predict_rain(const float features[3]);

#endif /* RAIN_MODEL_H */
";
    assert_eq!(interface, expected);
}

#[test]
fn flat_array_element_type_is_configurable() {
    let (implementation, interface) =
        render("[target]\nprofile = \"flat_array\"\n\n[target.flat_array]\nelement_type = \"double\"\n");
    assert!(implementation.contains("int predict_rain(const double features[3]) {"));
    assert!(interface.contains("int predict_rain(const double features[3]);"));
}

// ============================================================================
// SECTION: Hygiene
// ============================================================================

#[test]
fn every_output_starts_with_generated_banner() {
    for toml in ["", "[target]\nprofile = \"flat_array\"\n"] {
        let (implementation, interface) = render(toml);
        assert!(implementation.starts_with(GENERATED_BANNER));
        assert!(interface.starts_with(GENERATED_BANNER));
    }
}

#[test]
fn feature_names_cannot_break_out_of_doc_comment() {
    let (_, interface) = render(
        "[features]\nnames = [\"a*/b\", \"Humidity\"]\n[target]\nprofile = \"flat_array\"\n",
    );
    assert!(interface.contains("[0] a* /b"));
    assert_eq!(interface.matches("*/").count(), 3);
}

#[test]
fn unbalanced_body_is_a_render_error() {
    let profile = TargetProfile::from_config(&TreegenConfig::default());
    match package("    if (features[0] <= 1.00) {\n", &profile) {
        Err(ExportError::Render(_)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn packaging_is_deterministic() {
    assert_eq!(render(""), render(""));
    let contract = FeatureContract::default();
    let profile = TargetProfile::from_config(&TreegenConfig::default());
    let body = emit_with(&humidity_stump(), &contract, &profile.emit_options()).unwrap();
    assert_eq!(package(&body, &profile).unwrap(), package(&body, &profile).unwrap());
}
