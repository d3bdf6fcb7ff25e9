use petgraph::graph::NodeIndex;

use crate::{Bond, Element, Molecule};

/// Bond-type counts around one atom, as used by the polar fragment table.
#[derive(Debug, Default, Clone, Copy)]
struct Environment {
    neighbors: usize,
    hydrogens: usize,
    charge: i8,
    single: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
    in_three_ring: bool,
}

impl Environment {
    fn of(molecule: &Molecule, atom: NodeIndex) -> Self {
        let data = molecule.atom(atom);
        let mut env = Environment {
            neighbors: molecule.degree(atom),
            hydrogens: data.hydrogens as usize,
            charge: data.charge,
            in_three_ring: molecule.in_ring_of_size(atom, 3),
            ..Default::default()
        };
        for (_, _, bond) in molecule.neighbors(atom) {
            match bond {
                Bond::Single => env.single += 1,
                Bond::Double => env.double += 1,
                Bond::Triple => env.triple += 1,
                Bond::Aromatic => env.aromatic += 1,
            }
        }
        env
    }
}

fn nitrogen(env: Environment) -> f64 {
    let Environment {
        neighbors,
        hydrogens: h,
        charge,
        single,
        double,
        triple,
        aromatic,
        in_three_ring,
    } = env;

    let fragment = match (neighbors, h, charge) {
        (1, 0, 0) if triple == 1 => Some(23.79),
        (1, 1, 0) if double == 1 => Some(23.85),
        (1, 2, 0) if single == 1 => Some(26.02),
        (1, 2, 1) if double == 1 => Some(25.59),
        (1, 3, 1) if single == 1 => Some(27.64),
        (2, 0, 0) if single == 1 && double == 1 => Some(12.36),
        (2, 0, 0) if triple == 1 && double == 1 => Some(13.60),
        (2, 1, 0) if single == 2 => Some(if in_three_ring { 21.94 } else { 12.03 }),
        (2, 0, 1) if triple == 1 && single == 1 => Some(4.36),
        (2, 1, 1) if double == 1 && single == 1 => Some(13.97),
        (2, 2, 1) if single == 2 => Some(16.61),
        (2, 0, 0) if aromatic == 2 => Some(12.89),
        (2, 1, 0) if aromatic == 2 => Some(15.79),
        (2, 1, 1) if aromatic == 2 => Some(14.14),
        (3, 0, 0) if single == 3 => Some(if in_three_ring { 3.01 } else { 3.24 }),
        (3, 0, 0) if single == 1 && double == 2 => Some(11.68),
        (3, 0, 1) if single == 2 && double == 1 => Some(3.01),
        (3, 1, 1) if single == 3 => Some(4.44),
        (3, 0, 0) if aromatic == 3 => Some(4.41),
        (3, 0, 0) if single == 1 && aromatic == 2 => Some(4.93),
        (3, 0, 0) if double == 1 && aromatic == 2 => Some(8.39),
        (3, 0, 1) if aromatic == 3 => Some(4.10),
        (3, 0, 1) if single == 1 && aromatic == 2 => Some(3.88),
        (4, 0, 1) if single == 4 => Some(0.0),
        _ => None,
    };
    fragment.unwrap_or_else(|| (30.5 - 8.2 * neighbors as f64 + 1.5 * h as f64).max(0.0))
}

fn oxygen(env: Environment) -> f64 {
    let Environment {
        neighbors,
        hydrogens: h,
        charge,
        single,
        double,
        aromatic,
        in_three_ring,
        ..
    } = env;

    let fragment = match (neighbors, h, charge) {
        (1, 0, 0) if double == 1 => Some(17.07),
        (1, 1, 0) if single == 1 => Some(20.23),
        (1, 0, -1) if single == 1 => Some(23.06),
        (2, 0, 0) if single == 2 => Some(if in_three_ring { 12.53 } else { 9.23 }),
        (2, 0, 0) if aromatic == 2 => Some(13.14),
        _ => None,
    };
    fragment.unwrap_or_else(|| (28.5 - 8.6 * neighbors as f64 + 1.5 * h as f64).max(0.0))
}

/// Polar surface contribution of a single atom. Only nitrogen and oxygen
/// contribute.
pub fn tpsa_contribution(molecule: &Molecule, atom: NodeIndex) -> f64 {
    match molecule.atom(atom).element {
        Element::N => nitrogen(Environment::of(molecule, atom)),
        Element::O => oxygen(Environment::of(molecule, atom)),
        _ => 0.0,
    }
}

/// Topological polar surface area (Ertl, Rohde and Selzer 2000).
pub fn tpsa(molecule: &Molecule) -> f64 {
    molecule
        .atoms()
        .map(|(index, _)| tpsa_contribution(molecule, index))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn close(smiles: &str, expected: f64) {
        let value = tpsa(&parse_smiles(smiles).unwrap());
        assert!(
            (value - expected).abs() < 0.01,
            "{smiles}: expected {expected}, got {value}"
        );
    }

    #[test]
    fn test_simple_molecules() {
        close("CCCC", 0.0);
        close("CCO", 20.23);
        close("CC(=O)O", 37.3);
        close("CN", 26.02);
        close("CC#N", 23.79);
    }

    #[test]
    fn test_aromatic_nitrogen() {
        close("c1ccncc1", 12.89);
        close("c1cc[nH]c1", 15.79);
    }

    #[test]
    fn test_drugs() {
        close("CC(=O)Oc1ccccc1C(=O)O", 63.6);
        close("CC(=O)Nc1ccc(O)cc1", 49.33);
    }

    #[test]
    fn test_three_membered_ring() {
        close("C1CO1", 12.53);
        close("C1CN1", 21.94);
    }

    #[test]
    fn test_nitro() {
        close("C[N+](=O)[O-]", 43.14);
    }
}
