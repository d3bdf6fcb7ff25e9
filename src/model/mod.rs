//! The pre-trained classifier.
//!
//! A model artifact is a JSON document naming its feature columns, its two
//! class labels, which of them is the therapeutic class, and the fitted
//! estimator. It is loaded once and then shared read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{DESCRIPTOR_COUNT, FEATURE_NAMES};

mod forest;
pub use forest::*;

mod logistic;
pub use logistic::*;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// A probabilistic binary classifier over descriptor rows.
pub trait Classifier {
    /// Probability of each class, in the classifier's class order, for one
    /// feature row in `FEATURE_NAMES` order.
    fn predict_proba(&self, features: &[f64; DESCRIPTOR_COUNT]) -> Result<[f64; 2], ModelError>;

    /// Index of the therapeutic class in `predict_proba`'s output.
    fn positive_index(&self) -> usize;

    /// Probability of the therapeutic class as a percentage.
    fn therapeutic_probability(&self, features: &[f64; DESCRIPTOR_COUNT]) -> Result<f64, ModelError> {
        let probabilities = self.predict_proba(features)?;
        let p = probabilities
            .get(self.positive_index())
            .copied()
            .ok_or_else(|| ModelError::Inference("positive class index out of range".to_string()))?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ModelError::Inference(format!("probability {p} is not in [0, 1]")));
        }
        Ok(p * 100.0)
    }
}

/// A class label as scikit-learn stores it: an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Integer(i64),
    Text(String),
}

impl Display for ClassLabel {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            ClassLabel::Integer(n) => write!(f, "{n}"),
            ClassLabel::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::LogisticRegression(_) => "logistic_regression",
            Estimator::RandomForest(_) => "random_forest",
        }
    }

    fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), ModelError> {
        match self {
            Estimator::LogisticRegression(model) => model.validate(feature_count),
            Estimator::RandomForest(model) => model.validate(feature_count, class_count),
        }
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        match self {
            Estimator::LogisticRegression(model) => model.predict_proba(row),
            Estimator::RandomForest(model) => model.predict_proba(row),
        }
    }
}

/// The on-disk form of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Feature columns in the order the estimator expects them.
    pub features: Vec<String>,
    pub classes: Vec<ClassLabel>,
    pub positive_class: ClassLabel,
    pub estimator: Estimator,
    /// Free-text provenance, e.g. how the weights were obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A validated classifier with its feature columns pinned to `FEATURE_NAMES`.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    estimator: Estimator,
    classes: [ClassLabel; 2],
    positive: usize,
    /// `columns[i]` is the position in a descriptor row of the estimator's
    /// i-th input.
    columns: [usize; DESCRIPTOR_COUNT],
    note: Option<String>,
}

impl LoadedModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&text)?;
        info!(
            "Loaded {} model from {}",
            model.estimator.kind(),
            path.display()
        );
        if let Some(note) = model.note() {
            warn!("{}: {note}", path.display());
        }
        Ok(model)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Self::from_artifact(serde_json::from_str(text)?)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let columns = pin_schema(&artifact.features)?;

        let classes: [ClassLabel; 2] = artifact.classes.try_into().map_err(|classes: Vec<_>| {
            ModelError::InvalidArtifact(format!("expected 2 classes, found {}", classes.len()))
        })?;
        if classes[0] == classes[1] {
            return Err(ModelError::InvalidArtifact(format!(
                "duplicate class label {}",
                classes[0]
            )));
        }
        let positive = classes
            .iter()
            .position(|class| *class == artifact.positive_class)
            .ok_or_else(|| {
                ModelError::InvalidArtifact(format!(
                    "positive class {} is not one of the classes",
                    artifact.positive_class
                ))
            })?;

        artifact.estimator.validate(DESCRIPTOR_COUNT, classes.len())?;
        debug!("Model columns pinned as {columns:?}, positive class index {positive}");

        Ok(Self {
            estimator: artifact.estimator,
            classes,
            positive,
            columns,
            note: artifact.note,
        })
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn classes(&self) -> &[ClassLabel; 2] {
        &self.classes
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Feature names in the order the estimator consumes them.
    pub fn feature_order(&self) -> [&'static str; DESCRIPTOR_COUNT] {
        self.columns.map(|column| FEATURE_NAMES[column])
    }
}

/// Maps the artifact's feature list onto `FEATURE_NAMES`. The lists must
/// hold the same names; only their order may differ.
fn pin_schema(features: &[String]) -> Result<[usize; DESCRIPTOR_COUNT], ModelError> {
    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(features.len());
    for name in features {
        let column = FEATURE_NAMES
            .iter()
            .position(|known| known == name)
            .ok_or_else(|| ModelError::SchemaMismatch(format!("unknown feature {name:?}")))?;
        if !seen.insert(column) {
            return Err(ModelError::SchemaMismatch(format!("duplicate feature {name:?}")));
        }
        columns.push(column);
    }
    if let Some(missing) = FEATURE_NAMES
        .iter()
        .enumerate()
        .find(|(column, _)| !seen.contains(column))
    {
        return Err(ModelError::SchemaMismatch(format!(
            "missing feature {:?}",
            missing.1
        )));
    }
    columns
        .try_into()
        .map_err(|_| ModelError::SchemaMismatch("wrong number of features".to_string()))
}

impl Classifier for LoadedModel {
    fn predict_proba(&self, features: &[f64; DESCRIPTOR_COUNT]) -> Result<[f64; 2], ModelError> {
        if let Some((name, value)) = FEATURE_NAMES
            .iter()
            .zip(features)
            .find(|(_, value)| !value.is_finite())
        {
            return Err(ModelError::Inference(format!("feature {name} is {value}")));
        }

        let row = self.columns.map(|column| features[column]);
        let probabilities = self.estimator.predict_proba(&row)?;
        if probabilities
            .iter()
            .any(|p| !p.is_finite() || !(0.0..=1.0).contains(p))
        {
            return Err(ModelError::Inference(format!(
                "estimator returned invalid probabilities {probabilities:?}"
            )));
        }
        Ok(probabilities)
    }

    fn positive_index(&self) -> usize {
        self.positive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logistic_artifact(features: Vec<&str>) -> serde_json::Value {
        json!({
            "features": features,
            "classes": [0, 1],
            "positive_class": 1,
            "estimator": {
                "kind": "logistic_regression",
                "coefficients": [0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                "intercept": -2.0
            }
        })
    }

    #[test]
    fn test_load_logistic() {
        let model = LoadedModel::from_json(&logistic_artifact(FEATURE_NAMES.to_vec()).to_string()).unwrap();
        assert_eq!(model.positive_index(), 1);
        assert_eq!(model.estimator().kind(), "logistic_regression");

        let mut row = [0.0; DESCRIPTOR_COUNT];
        row[0] = 200.0;
        let p = model.therapeutic_probability(&row).unwrap();
        assert!((p - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_note() {
        let plain = LoadedModel::from_json(&logistic_artifact(FEATURE_NAMES.to_vec()).to_string()).unwrap();
        assert_eq!(plain.note(), None);

        let mut artifact = logistic_artifact(FEATURE_NAMES.to_vec());
        artifact["note"] = json!("hand-tuned weights");
        let noted = LoadedModel::from_json(&artifact.to_string()).unwrap();
        assert_eq!(noted.note(), Some("hand-tuned weights"));
    }

    #[test]
    fn test_permuted_schema() {
        let mut reversed = FEATURE_NAMES.to_vec();
        reversed.reverse();
        let model = LoadedModel::from_json(&logistic_artifact(reversed).to_string()).unwrap();
        assert_eq!(model.feature_order()[0], "QED");

        // The only weighted input is now QED, the last descriptor.
        let mut row = [0.0; DESCRIPTOR_COUNT];
        row[7] = 200.0;
        let p = model.therapeutic_probability(&row).unwrap();
        assert!((p - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_schema_mismatch() {
        let mut unknown = FEATURE_NAMES.to_vec();
        unknown[3] = "NumHDonors";
        let err = LoadedModel::from_json(&logistic_artifact(unknown).to_string()).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));

        let mut duplicate = FEATURE_NAMES.to_vec();
        duplicate[3] = "HBA";
        let err = LoadedModel::from_json(&logistic_artifact(duplicate).to_string()).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));

        let short = FEATURE_NAMES[..7].to_vec();
        let err = LoadedModel::from_json(&logistic_artifact(short).to_string()).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn test_invalid_classes() {
        let mut artifact = logistic_artifact(FEATURE_NAMES.to_vec());
        artifact["positive_class"] = json!("active");
        assert!(matches!(
            LoadedModel::from_json(&artifact.to_string()),
            Err(ModelError::InvalidArtifact(_))
        ));

        artifact["classes"] = json!([0, 1, 2]);
        assert!(matches!(
            LoadedModel::from_json(&artifact.to_string()),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_string_classes() {
        let mut artifact = logistic_artifact(FEATURE_NAMES.to_vec());
        artifact["classes"] = json!(["active", "inactive"]);
        artifact["positive_class"] = json!("active");
        let model = LoadedModel::from_json(&artifact.to_string()).unwrap();
        assert_eq!(model.positive_index(), 0);
        assert_eq!(model.classes()[1].to_string(), "inactive");
    }

    #[test]
    fn test_decode_error() {
        assert!(matches!(
            LoadedModel::from_json("{ not json"),
            Err(ModelError::Decode(_))
        ));
        assert!(matches!(
            LoadedModel::from_json(r#"{"features": [], "classes": [0, 1], "positive_class": 1, "estimator": {"kind": "svm"}}"#),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn test_non_finite_features() {
        let model = LoadedModel::from_json(&logistic_artifact(FEATURE_NAMES.to_vec()).to_string()).unwrap();
        let mut row = [0.0; DESCRIPTOR_COUNT];
        row[2] = f64::NAN;
        let err = model.therapeutic_probability(&row).unwrap_err();
        assert!(matches!(err, ModelError::Inference(_)));
        assert!(err.to_string().contains("LogP"));
    }

    #[test]
    fn test_missing_file() {
        let err = LoadedModel::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
