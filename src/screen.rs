//! Per-interaction handlers: validate a submission, describe it, predict.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::{parse_smiles, Classifier, DescriptorVector, Molecule, SmilesError, Verdict};

/// What the user sees when their input does not parse.
pub const INVALID_SMILES_MESSAGE: &str = "Invalid SMILES string";

/// A raw text submission after validation.
#[derive(Debug, Clone)]
pub enum Submission {
    /// Blank input. Nothing is computed or shown.
    Empty,
    Invalid { input: String, error: SmilesError },
    Valid { input: String, molecule: Molecule },
}

pub fn submit(input: &str) -> Submission {
    let input = input.trim();
    match parse_smiles(input) {
        Ok(molecule) => Submission::Valid {
            input: input.to_string(),
            molecule,
        },
        Err(SmilesError::Empty) => Submission::Empty,
        Err(error) => {
            warn!("Rejected SMILES {input:?}: {error}");
            Submission::Invalid {
                input: input.to_string(),
                error,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum DescribeOutcome {
    Empty,
    Invalid { input: String, error: SmilesError },
    Described {
        smiles: String,
        descriptors: DescriptorVector,
    },
}

impl DescribeOutcome {
    pub fn descriptors(&self) -> Option<&DescriptorVector> {
        match self {
            DescribeOutcome::Described { descriptors, .. } => Some(descriptors),
            _ => None,
        }
    }
}

/// Outcome of the predict action. Failures carry the user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Prediction {
    Scored(Verdict),
    Failed { message: String },
}

impl Prediction {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Prediction::Scored(verdict) => Some(verdict),
            Prediction::Failed { .. } => None,
        }
    }
}

/// Runs submissions through the pipeline against one shared classifier.
pub struct Screener<'m, C: Classifier + ?Sized> {
    classifier: &'m C,
}

impl<'m, C: Classifier + ?Sized> Screener<'m, C> {
    pub fn new(classifier: &'m C) -> Self {
        Self { classifier }
    }

    /// Validate and compute descriptors. Never touches the classifier.
    pub fn describe(&self, input: &str) -> DescribeOutcome {
        match submit(input) {
            Submission::Empty => DescribeOutcome::Empty,
            Submission::Invalid { input, error } => DescribeOutcome::Invalid { input, error },
            Submission::Valid { input, molecule } => {
                let descriptors = DescriptorVector::compute(&molecule);
                debug!("Descriptors for {input}: {descriptors:?}");
                DescribeOutcome::Described {
                    smiles: input,
                    descriptors,
                }
            }
        }
    }

    /// Score a descriptor vector. Classifier errors become a `Failed`
    /// prediction; the screener stays usable.
    pub fn predict(&self, descriptors: &DescriptorVector) -> Prediction {
        match self.classifier.therapeutic_probability(&descriptors.features()) {
            Ok(percentage) => Prediction::Scored(Verdict::new(percentage)),
            Err(e) => {
                error!("Prediction failed: {e}");
                Prediction::Failed {
                    message: format!("Prediction failed: {e}"),
                }
            }
        }
    }
}
