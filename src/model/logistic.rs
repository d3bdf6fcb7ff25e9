use serde::{Deserialize, Serialize};

use super::ModelError;

/// Per-feature standardisation applied before the linear term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    pub(super) fn validate(&self, feature_count: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != feature_count {
            return Err(ModelError::InvalidArtifact(format!(
                "{} coefficients for {feature_count} features",
                self.coefficients.len()
            )));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != feature_count || scaler.scale.len() != feature_count {
                return Err(ModelError::InvalidArtifact(format!(
                    "scaler has {} means and {} scales for {feature_count} features",
                    scaler.mean.len(),
                    scaler.scale.len()
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ModelError::InvalidArtifact(
                    "scaler scale must be finite and non-zero".to_string(),
                ));
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidArtifact(
                "non-finite coefficient".to_string(),
            ));
        }
        Ok(())
    }

    /// `[P(classes[0]), P(classes[1])]`; the decision function scores the
    /// second class, as scikit-learn does.
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        let z = match &self.scaler {
            Some(scaler) => row
                .iter()
                .zip(&scaler.mean)
                .zip(&scaler.scale)
                .zip(&self.coefficients)
                .map(|(((x, mean), scale), w)| w * (x - mean) / scale)
                .sum::<f64>(),
            None => row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| w * x)
                .sum::<f64>(),
        } + self.intercept;

        if !z.is_finite() {
            return Err(ModelError::Inference(format!("decision function is {z}")));
        }
        let p = sigmoid(z);
        Ok([1.0 - p, p])
    }
}
