use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Shown under every prediction.
pub const DISCLAIMER: &str = "This is an AI-assisted prediction and not a clinical decision tool.";

/// Lowest percentage banded as High.
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Lowest percentage banded as Moderate.
pub const MODERATE_THRESHOLD: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    High,
    Moderate,
    Low,
}

impl Band {
    pub fn of(percentage: f64) -> Self {
        if percentage >= HIGH_THRESHOLD {
            Band::High
        } else if percentage >= MODERATE_THRESHOLD {
            Band::Moderate
        } else {
            Band::Low
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Band::High => "High potential candidate",
            Band::Moderate => "Moderate potential, optimization suggested",
            Band::Low => "Low potential candidate",
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.message())
    }
}

/// A therapeutic-potential probability and its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Probability of the therapeutic class, 0 to 100.
    pub percentage: f64,
    pub band: Band,
}

impl Verdict {
    pub fn new(percentage: f64) -> Self {
        Self {
            percentage,
            band: Band::of(percentage),
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{:.2}% ({})", self.percentage, self.band)
    }
}
