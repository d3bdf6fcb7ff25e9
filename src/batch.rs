//! Screening a CSV column of SMILES in one pass.

use csv::{ReaderBuilder, StringRecord, Writer};
use std::io::{Read, Write};
use thiserror::Error;
use tracing::*;

use crate::{
    Classifier, DescribeOutcome, DescriptorVector, Prediction, Screener, FEATURE_NAMES,
    INVALID_SMILES_MESSAGE,
};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column {0:?} not found in CSV header")]
    MissingColumn(String),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// A SMILES cell and the data row it came from (1-based, header excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub row: usize,
    pub smiles: String,
}

pub fn read_smiles_column(reader: impl Read, column: &str) -> Result<Vec<BatchInput>, BatchError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let index = rdr
        .headers()?
        .iter()
        .position(|name| name.trim() == column)
        .ok_or_else(|| BatchError::MissingColumn(column.to_string()))?;

    let mut inputs = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record: StringRecord = result?;
        let smiles = record.get(index).unwrap_or("").trim();
        if smiles.is_empty() {
            debug!("Skipping row {} with no SMILES", i + 1);
            continue;
        }
        inputs.push(BatchInput {
            row: i + 1,
            smiles: smiles.to_string(),
        });
    }
    Ok(inputs)
}

#[derive(Debug, Clone)]
pub enum RowOutcome {
    Invalid,
    Screened {
        descriptors: DescriptorVector,
        prediction: Prediction,
    },
}

#[derive(Debug, Clone)]
pub struct BatchRow {
    pub input: BatchInput,
    pub outcome: RowOutcome,
}

/// Describes and predicts every input. Bad rows are reported in place.
pub fn screen_batch<C: Classifier + ?Sized>(
    screener: &Screener<C>,
    inputs: Vec<BatchInput>,
) -> Vec<BatchRow> {
    let rows: Vec<BatchRow> = inputs
        .into_iter()
        .map(|input| {
            let outcome = match screener.describe(&input.smiles) {
                DescribeOutcome::Described { descriptors, .. } => RowOutcome::Screened {
                    prediction: screener.predict(&descriptors),
                    descriptors,
                },
                DescribeOutcome::Empty | DescribeOutcome::Invalid { .. } => RowOutcome::Invalid,
            };
            BatchRow { input, outcome }
        })
        .collect();

    let scored = rows
        .iter()
        .filter(|row| {
            matches!(
                row.outcome,
                RowOutcome::Screened {
                    prediction: Prediction::Scored(_),
                    ..
                }
            )
        })
        .count();
    info!("Screened {} rows, {scored} scored", rows.len());
    rows
}

/// Writes one CSV line per row: the SMILES, the eight descriptors, the
/// probability, the verdict, and an error column.
pub fn write_report(rows: &[BatchRow], writer: impl Write) -> Result<(), BatchError> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["Row", "SMILES"];
    header.extend(FEATURE_NAMES);
    header.extend(["Probability", "Verdict", "Error"]);
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.input.row.to_string(), row.input.smiles.clone()];
        match &row.outcome {
            RowOutcome::Invalid => {
                record.extend(std::iter::repeat(String::new()).take(FEATURE_NAMES.len() + 2));
                record.push(INVALID_SMILES_MESSAGE.to_string());
            }
            RowOutcome::Screened {
                descriptors,
                prediction,
            } => {
                record.extend(descriptors.features().iter().map(|value| value.to_string()));
                match prediction {
                    Prediction::Scored(verdict) => {
                        record.push(format!("{:.2}", verdict.percentage));
                        record.push(verdict.band.message().to_string());
                        record.push(String::new());
                    }
                    Prediction::Failed { message } => {
                        record.extend([String::new(), String::new(), message.clone()]);
                    }
                }
            }
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
