//! The eight physicochemical descriptors fed to the classifier.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::Molecule;

mod crippen;
pub use crippen::*;

mod lipinski;
pub use lipinski::*;

mod qed;
pub use qed::*;

mod tpsa;
pub use tpsa::*;

pub const DESCRIPTOR_COUNT: usize = 8;

/// Column order of a feature row. Model artifacts are checked against this.
pub const FEATURE_NAMES: [&str; DESCRIPTOR_COUNT] =
    ["MolWt", "TPSA", "LogP", "HBD", "HBA", "RotB", "NumRings", "QED"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptorVector {
    #[serde(rename = "MolWt")]
    pub mol_wt: f64,
    #[serde(rename = "TPSA")]
    pub tpsa: f64,
    #[serde(rename = "LogP")]
    pub logp: f64,
    #[serde(rename = "HBD")]
    pub hbd: f64,
    #[serde(rename = "HBA")]
    pub hba: f64,
    #[serde(rename = "RotB")]
    pub rotatable_bonds: f64,
    #[serde(rename = "NumRings")]
    pub num_rings: f64,
    #[serde(rename = "QED")]
    pub qed: f64,
}

impl DescriptorVector {
    pub fn compute(molecule: &Molecule) -> Self {
        Self {
            mol_wt: molecular_weight(molecule),
            tpsa: tpsa(molecule),
            logp: crippen_logp(molecule),
            hbd: h_bond_donors(molecule) as f64,
            hba: h_bond_acceptors(molecule) as f64,
            rotatable_bonds: rotatable_bonds(molecule) as f64,
            num_rings: molecule.rings().len() as f64,
            qed: qed(molecule),
        }
    }

    /// The feature row, in `FEATURE_NAMES` order.
    pub fn features(&self) -> [f64; DESCRIPTOR_COUNT] {
        [
            self.mol_wt,
            self.tpsa,
            self.logp,
            self.hbd,
            self.hba,
            self.rotatable_bonds,
            self.num_rings,
            self.qed,
        ]
    }

    /// Name and display text for each descriptor, in feature order.
    pub fn rows(&self) -> [(&'static str, String); DESCRIPTOR_COUNT] {
        let values = self.features();
        std::array::from_fn(|i| {
            let text = match FEATURE_NAMES[i] {
                "HBD" | "HBA" | "RotB" | "NumRings" => format!("{:.0}", values[i]),
                "QED" => format!("{:.3}", values[i]),
                _ => format!("{:.2}", values[i]),
            };
            (FEATURE_NAMES[i], text)
        })
    }
}

impl Display for DescriptorVector {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (name, value) in self.rows() {
            writeln!(f, "{name:<10}{value:>10}")?;
        }
        Ok(())
    }
}

/// Average molecular weight, hydrogens included.
pub fn molecular_weight(molecule: &Molecule) -> f64 {
    molecule.atoms().map(|(_, atom)| atom.mass()).sum()
}
