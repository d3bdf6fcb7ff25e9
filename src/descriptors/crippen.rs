//! Wildman-Crippen logP.
//!
//! Every heavy atom and every attached hydrogen is assigned one of the
//! published atom types; logP is the sum of the type contributions.

use petgraph::graph::NodeIndex;

use crate::{Bond, Element, Molecule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrippenType {
    // Aliphatic carbon.
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    C11,
    C12,
    // Aromatic carbon.
    C13,
    C14,
    C15,
    C16,
    C17,
    C18,
    C19,
    C20,
    C21,
    C22,
    C23,
    C24,
    C25,
    C26,
    C27,
    CS,
    H1,
    H2,
    H3,
    H4,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    N8,
    N9,
    N10,
    N11,
    N12,
    N13,
    N14,
    NS,
    O1,
    O2,
    O3,
    O4,
    O5,
    O6,
    O7,
    O8,
    O9,
    O10,
    O11,
    O12,
    OS,
    F,
    Cl,
    Br,
    I,
    P,
    S1,
    S2,
    S3,
    Other,
}

impl CrippenType {
    pub fn logp(self) -> f64 {
        use CrippenType::*;
        match self {
            C1 => 0.1441,
            C2 => 0.0,
            C3 => -0.2035,
            C4 => -0.2051,
            C5 => -0.2783,
            C6 => 0.1551,
            C7 => 0.0017,
            C8 => 0.08452,
            C9 => -0.1444,
            C10 => -0.0516,
            C11 => 0.1193,
            C12 => -0.0967,
            C13 => -0.5443,
            C14 => 0.0,
            C15 => 0.245,
            C16 => 0.198,
            C17 => 0.0,
            C18 => 0.1581,
            C19 => 0.2955,
            C20 => 0.2713,
            C21 => 0.136,
            C22 => 0.4619,
            C23 => 0.5437,
            C24 => 0.1893,
            C25 => -0.8186,
            C26 => 0.264,
            C27 => 0.2148,
            CS => 0.08129,
            H1 => 0.123,
            H2 => -0.2677,
            H3 => 0.2142,
            H4 => 0.298,
            N1 => -1.019,
            N2 => -0.7096,
            N3 => -1.027,
            N4 => -0.5188,
            N5 => 0.08387,
            N6 => 0.1836,
            N7 => -0.3187,
            N8 => -0.4458,
            N9 => 0.01508,
            N10 => -1.95,
            N11 => -0.3239,
            N12 => -1.119,
            N13 => -0.3396,
            N14 => 0.2887,
            NS => -0.4806,
            O1 => 0.1552,
            O2 => -0.2893,
            O3 => -0.0684,
            O4 => -0.4195,
            O5 => 0.0335,
            O6 => -0.3339,
            O7 => -1.189,
            O8 => 0.1788,
            O9 => -0.1526,
            O10 => 0.1129,
            O11 => 0.4833,
            O12 => -1.326,
            OS => -0.1188,
            F => 0.4202,
            Cl => 0.6895,
            Br => 0.8456,
            I => 0.8857,
            P => 0.8612,
            S1 => 0.6482,
            S2 => -0.0024,
            S3 => 0.6237,
            Other => 0.0,
        }
    }
}

/// Elements the carbon types treat as ordinary substituents.
fn is_common(element: Element) -> bool {
    use Element::*;
    matches!(element, H | C | N | O | P | S | F | Cl | Br | I)
}

fn carbon(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    use CrippenType::*;
    let data = molecule.atom(atom);
    let neighbors: Vec<_> = molecule
        .neighbors(atom)
        .map(|(other, _, bond)| (molecule.atom(other), bond))
        .collect();

    if data.aromatic {
        let exocyclic: Vec<_> = neighbors
            .iter()
            .filter(|(_, bond)| *bond != Bond::Aromatic)
            .collect();
        if data.hydrogens == 0
            && exocyclic
                .iter()
                .any(|(other, _)| !other.aromatic && !is_common(other.element))
        {
            return C13;
        }
        for (other, _) in &exocyclic {
            match other.element {
                Element::F => return C14,
                Element::Cl => return C15,
                Element::Br => return C16,
                Element::I => return C17,
                _ => {}
            }
        }
        if data.hydrogens > 0 {
            return C18;
        }
        return match exocyclic.first() {
            None => C19,
            Some((other, Bond::Single)) if other.aromatic => C20,
            Some((other, Bond::Single)) => match other.element {
                Element::C => C21,
                Element::N => C22,
                Element::O => C23,
                Element::S => C24,
                _ => CS,
            },
            Some((other, Bond::Double))
                if matches!(other.element, Element::C | Element::N | Element::O) =>
            {
                C25
            }
            _ => CS,
        };
    }

    let doubles: Vec<_> = neighbors.iter().filter(|(_, b)| *b == Bond::Double).collect();
    let triples = neighbors.iter().filter(|(_, b)| *b == Bond::Triple).count();

    if doubles.is_empty() && triples == 0 {
        let h = data.hydrogens;
        let heavy = || neighbors.iter().map(|(other, _)| *other);
        if heavy().all(|other| !other.aromatic && other.is(Element::C)) {
            return if h >= 2 { C1 } else { C2 };
        }
        let hetero = |other: &crate::Atom| {
            !other.aromatic
                && matches!(
                    other.element,
                    Element::N
                        | Element::O
                        | Element::P
                        | Element::S
                        | Element::F
                        | Element::Cl
                        | Element::Br
                        | Element::I
                )
        };
        if heavy().any(|other| hetero(other)) && heavy().all(|other| !other.aromatic) {
            return if h >= 2 { C3 } else { C4 };
        }
        if let Some(ring) = heavy().find(|other| other.aromatic) {
            return match h {
                3 if ring.is(Element::C) => C8,
                3 => C9,
                2 => C10,
                1 => C11,
                _ => C12,
            };
        }
        if heavy().any(|other| !is_common(other.element)) {
            return C27;
        }
        return CS;
    }

    if triples > 0 {
        return if neighbors
            .iter()
            .any(|(other, bond)| *bond == Bond::Triple && !other.is(Element::C))
        {
            C5
        } else {
            C7
        };
    }

    if doubles.iter().any(|(other, _)| !other.is(Element::C)) {
        return C5;
    }
    let substituents = || {
        neighbors
            .iter()
            .filter(|(_, bond)| *bond != Bond::Double)
            .map(|(other, _)| *other)
    };
    if doubles.iter().any(|(other, _)| other.aromatic) || substituents().any(|other| other.aromatic)
    {
        return C26;
    }
    C6
}

fn nitrogen(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    use CrippenType::*;
    let data = molecule.atom(atom);
    if data.aromatic {
        return if data.charge == 0 { N11 } else { N12 };
    }

    let h = data.hydrogens;
    let degree = molecule.degree(atom);
    let double = molecule.count_bonds(atom, Bond::Double);
    let triple = molecule.count_bonds(atom, Bond::Triple);
    let aromatic_neighbor = molecule
        .neighbors(atom)
        .any(|(other, _, _)| molecule.atom(other).aromatic);

    match data.charge {
        0 => match (h, degree) {
            (2, 1) if aromatic_neighbor => N3,
            (2, 1) => N1,
            (1, 1) if double == 1 => N5,
            (1, 2) if aromatic_neighbor => N4,
            (1, 2) => N2,
            (0, _) if triple == 1 => N9,
            (0, 2) | (0, 3) if double >= 1 => N6,
            (0, 3) if aromatic_neighbor => N8,
            (0, 3) => N7,
            _ => NS,
        },
        charge if charge > 0 && h > 0 => N10,
        charge if charge > 0 => {
            if degree == 4 || double > 0 || triple > 0 {
                N13
            } else {
                N14
            }
        }
        _ => N13,
    }
}

fn oxygen(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    use CrippenType::*;
    let data = molecule.atom(atom);
    if data.aromatic {
        return O1;
    }
    let neighbors: Vec<_> = molecule.neighbors(atom).collect();

    if data.charge < 0 {
        return match neighbors.first() {
            Some((other, _, _)) => match molecule.atom(*other).element {
                Element::N => O5,
                Element::S => O6,
                Element::C if molecule.has_double_bond_to(*other, &[Element::O]) => O12,
                _ => O7,
            },
            None => O7,
        };
    }
    if data.charge > 0 {
        return OS;
    }
    if data.hydrogens > 0 {
        return O2;
    }

    match neighbors.as_slice() {
        [(a, _, Bond::Single), (b, _, Bond::Single)] => {
            if molecule.atom(*a).aromatic || molecule.atom(*b).aromatic {
                O4
            } else {
                O3
            }
        }
        [(other, _, Bond::Double)] => {
            let partner = molecule.atom(*other);
            match partner.element {
                Element::N | Element::O => O5,
                Element::S => O6,
                Element::C if partner.aromatic => O8,
                Element::C => {
                    let substituents: Vec<_> = molecule
                        .neighbors(*other)
                        .filter(|(next, _, _)| *next != atom)
                        .map(|(next, _, _)| molecule.atom(next))
                        .collect();
                    if substituents.iter().any(|s| s.aromatic) {
                        O10
                    } else if substituents.len() == 2
                        && substituents.iter().all(|s| !s.is(Element::C) && !s.is(Element::H))
                    {
                        O11
                    } else {
                        O9
                    }
                }
                _ => OS,
            }
        }
        _ => OS,
    }
}

fn sulfur(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    let data = molecule.atom(atom);
    if data.aromatic {
        CrippenType::S3
    } else if data.charge != 0 {
        CrippenType::S2
    } else {
        CrippenType::S1
    }
}

/// Type of the hydrogens attached to `atom`.
fn hydrogen(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    use CrippenType::*;
    match molecule.atom(atom).element {
        Element::C | Element::H => H1,
        Element::N => H3,
        Element::O => {
            let mut acidic = false;
            let mut on_nitrogen = false;
            for (other, _, _) in molecule.neighbors(atom) {
                let neighbor = molecule.atom(other);
                match neighbor.element {
                    Element::N => on_nitrogen = true,
                    Element::O | Element::S => acidic = true,
                    Element::C if !neighbor.aromatic => {
                        acidic |= molecule.has_double_bond_to(
                            other,
                            &[Element::C, Element::N, Element::O, Element::S],
                        );
                    }
                    _ => {}
                }
            }
            if on_nitrogen {
                H3
            } else if acidic {
                H4
            } else {
                H2
            }
        }
        _ => H2,
    }
}

/// Type of a heavy atom.
pub fn crippen_type(molecule: &Molecule, atom: NodeIndex) -> CrippenType {
    match molecule.atom(atom).element {
        Element::C => carbon(molecule, atom),
        Element::N => nitrogen(molecule, atom),
        Element::O => oxygen(molecule, atom),
        Element::S => sulfur(molecule, atom),
        Element::F => CrippenType::F,
        Element::Cl => CrippenType::Cl,
        Element::Br => CrippenType::Br,
        Element::I => CrippenType::I,
        Element::P => CrippenType::P,
        Element::H => CrippenType::H1,
        _ => CrippenType::Other,
    }
}

/// Wildman-Crippen octanol/water partition coefficient.
pub fn crippen_logp(molecule: &Molecule) -> f64 {
    molecule
        .atoms()
        .map(|(index, atom)| {
            let heavy = crippen_type(molecule, index).logp();
            let hydrogens = atom.hydrogens as f64 * hydrogen(molecule, index).logp();
            heavy + hydrogens
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;
    use CrippenType::*;

    fn types(smiles: &str) -> Vec<CrippenType> {
        let molecule = parse_smiles(smiles).unwrap();
        molecule
            .atoms()
            .map(|(index, _)| crippen_type(&molecule, index))
            .collect()
    }

    fn logp(smiles: &str) -> f64 {
        crippen_logp(&parse_smiles(smiles).unwrap())
    }

    #[test]
    fn test_aspirin_types() {
        assert_eq!(
            types("CC(=O)Oc1ccccc1C(=O)O"),
            vec![C1, C5, O9, O4, C23, C18, C18, C18, C18, C21, C5, O10, O2]
        );
    }

    #[test]
    fn test_reference_values() {
        assert!((logp("CC(=O)Oc1ccccc1C(=O)O") - 1.3101).abs() < 1e-4);
        assert!((logp("CCO") - -0.0014).abs() < 1e-4);
        assert!((logp("c1ccccc1") - 1.6866).abs() < 1e-4);
    }

    #[test]
    fn test_hydrogen_types() {
        let acid = parse_smiles("CC(=O)O").unwrap();
        let hydroxyl = acid.atoms().last().unwrap().0;
        assert_eq!(hydrogen(&acid, hydroxyl), H4);

        let ethanol = parse_smiles("CCO").unwrap();
        let hydroxyl = ethanol.atoms().last().unwrap().0;
        assert_eq!(hydrogen(&ethanol, hydroxyl), H2);
    }

    #[test]
    fn test_nitrogen_types() {
        assert_eq!(types("CN")[1], N1);
        assert_eq!(types("Nc1ccccc1")[0], N3);
        assert_eq!(types("CN(C)C")[1], N7);
        assert_eq!(types("CC#N")[2], N9);
        assert_eq!(types("C[NH3+]")[1], N10);
        assert_eq!(types("c1ccncc1")[3], N11);
    }

    #[test]
    fn test_lipophilic_ordering() {
        assert!(logp("CCCCCC") > logp("CCCCCO"));
        assert!(logp("c1ccc(Cl)cc1") > logp("c1ccccc1"));
    }
}
