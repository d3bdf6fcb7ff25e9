use breastcanai::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_artifact(artifact: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{artifact}").unwrap();
    file
}

/// Splits on QED at 0.5, then on HBD at 2.
fn forest_artifact() -> serde_json::Value {
    json!({
        "features": FEATURE_NAMES,
        "classes": ["inactive", "active"],
        "positive_class": "active",
        "estimator": {
            "kind": "random_forest",
            "trees": [
                { "nodes": [
                    { "kind": "split", "feature": 7, "threshold": 0.5, "left": 1, "right": 2 },
                    { "kind": "leaf", "value": [9.0, 1.0] },
                    { "kind": "leaf", "value": [1.0, 9.0] }
                ]},
                { "nodes": [
                    { "kind": "split", "feature": 3, "threshold": 2.0, "left": 1, "right": 2 },
                    { "kind": "leaf", "value": [0.3, 0.7] },
                    { "kind": "leaf", "value": [0.8, 0.2] }
                ]}
            ]
        }
    })
}

#[test]
fn test_forest_from_file() {
    let file = write_artifact(&forest_artifact());
    let model = LoadedModel::load(file.path()).unwrap();
    assert_eq!(model.estimator().kind(), "random_forest");
    assert_eq!(model.positive_index(), 1);

    let mut row = [0.0; DESCRIPTOR_COUNT];
    row[7] = 0.8;
    row[3] = 1.0;
    // Mean of 0.9 and 0.7.
    let p = model.therapeutic_probability(&row).unwrap();
    assert!((p - 80.0).abs() < 1e-9);
    assert_eq!(Verdict::new(p).band, Band::High);

    row[7] = 0.2;
    row[3] = 3.0;
    let p = model.therapeutic_probability(&row).unwrap();
    assert!((p - 15.0).abs() < 1e-9);
}

#[test]
fn test_feature_manifest_reorders_columns() {
    let mut artifact = forest_artifact();
    // Same trees, but the artifact lists QED first, so feature 0 is QED.
    let mut features = FEATURE_NAMES.to_vec();
    features.rotate_right(1);
    artifact["features"] = json!(features);
    artifact["estimator"]["trees"][0]["nodes"][0]["feature"] = json!(0);
    artifact["estimator"]["trees"][1]["nodes"][0]["feature"] = json!(4);

    let reordered = LoadedModel::from_json(&artifact.to_string()).unwrap();
    let canonical = LoadedModel::from_json(&forest_artifact().to_string()).unwrap();
    assert_eq!(reordered.feature_order()[0], "QED");

    let descriptors = DescriptorVector::compute(&parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap());
    assert_eq!(
        reordered.predict_proba(&descriptors.features()).unwrap(),
        canonical.predict_proba(&descriptors.features()).unwrap()
    );
}

#[test]
fn test_load_errors() {
    let missing = LoadedModel::load("model/does-not-exist.json").unwrap_err();
    assert!(matches!(missing, ModelError::Io { .. }));

    let mut garbage = NamedTempFile::new().unwrap();
    write!(garbage, "\u{80}\u{5}joblib pickle").unwrap();
    assert!(matches!(
        LoadedModel::load(garbage.path()),
        Err(ModelError::Decode(_))
    ));

    let mut artifact = forest_artifact();
    artifact["features"][2] = json!("MolLogP");
    let file = write_artifact(&artifact);
    assert!(matches!(
        LoadedModel::load(file.path()),
        Err(ModelError::SchemaMismatch(_))
    ));

    let mut artifact = forest_artifact();
    artifact["estimator"]["trees"][0]["nodes"][0]["right"] = json!(7);
    let file = write_artifact(&artifact);
    assert!(matches!(
        LoadedModel::load(file.path()),
        Err(ModelError::InvalidArtifact(_))
    ));
}

#[test]
fn test_inference_failure_is_reported() {
    let model = LoadedModel::from_json(&forest_artifact().to_string()).unwrap();
    let screener = Screener::new(&model);
    let mut descriptors = DescriptorVector::compute(&parse_smiles("CCO").unwrap());
    descriptors.qed = f64::NAN;

    match screener.predict(&descriptors) {
        Prediction::Failed { message } => assert!(message.starts_with("Prediction failed")),
        other => panic!("expected a failure, got {other:?}"),
    }

    descriptors.qed = 0.6;
    assert!(screener.predict(&descriptors).verdict().is_some());
}
