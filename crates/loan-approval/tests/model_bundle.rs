//! Loader behavior against artifacts on disk.

use std::io::Write;
use std::path::PathBuf;

use loan_approval::model::{FeatureScaler, LoadError, ModelBundle};
use serde_json::json;
use tempfile::NamedTempFile;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/loan_prediction_model.json")
}

fn write_artifact(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&serde_json::to_vec_pretty(value).expect("serializable"))
        .expect("artifact written");
    file
}

fn fixture_value() -> serde_json::Value {
    let raw = std::fs::read(fixture_path()).expect("fixture readable");
    serde_json::from_slice(&raw).expect("fixture is json")
}

#[test]
fn pinned_fixture_loads() {
    let bundle = ModelBundle::load(fixture_path()).expect("fixture loads");

    assert_eq!(bundle.features().len(), 10);
    assert_eq!(bundle.features().names()[0], "Gender");
    assert_eq!(bundle.features().names()[9], "Property_Area");
    assert_eq!(bundle.classifier().kind(), "logistic_regression");
    assert_eq!(bundle.scaler().n_features(), 10);
}

#[test]
fn artifact_without_scaler_fails_to_load() {
    let mut value = fixture_value();
    value
        .as_object_mut()
        .expect("artifact object")
        .remove("scaler");
    let file = write_artifact(&value);

    let err = ModelBundle::load(file.path()).expect_err("scaler is required");

    assert!(matches!(err, LoadError::MissingField("scaler")));
    assert!(err.to_string().contains("scaler"));
}

#[test]
fn truncated_artifact_fails_to_load() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(br#"{"best_model": {"kind": "logistic_regr"#)
        .expect("artifact written");

    assert!(matches!(
        ModelBundle::load(file.path()),
        Err(LoadError::Parse(_))
    ));
}

#[test]
fn duplicate_feature_names_fail_to_load() {
    let mut value = fixture_value();
    value["feature_column"][1] = json!("Gender");
    let file = write_artifact(&value);

    match ModelBundle::load(file.path()) {
        Err(LoadError::DuplicateFeature(name)) => assert_eq!(name, "Gender"),
        other => panic!("expected duplicate feature error, got {other:?}"),
    }
}

#[test]
fn unknown_classifier_kind_fails_to_load() {
    let mut value = fixture_value();
    value["best_model"]["kind"] = json!("support_vector_machine");
    let file = write_artifact(&value);

    assert!(matches!(
        ModelBundle::load(file.path()),
        Err(LoadError::Parse(_))
    ));
}

#[test]
fn tree_with_out_of_range_split_fails_to_load() {
    let mut value = fixture_value();
    value["best_model"] = json!({
        "kind": "decision_tree",
        "nodes": [
            { "type": "split", "feature": 12, "threshold": 0.5, "left": 1, "right": 2 },
            { "type": "leaf", "label": 0 },
            { "type": "leaf", "label": 1 }
        ]
    });
    let file = write_artifact(&value);

    assert!(matches!(
        ModelBundle::load(file.path()),
        Err(LoadError::Model(_))
    ));
}
