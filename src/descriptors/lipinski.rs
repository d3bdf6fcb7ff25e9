use petgraph::graph::NodeIndex;

use crate::{Bond, Element, Molecule};

const ACCEPTOR_PARTNERS: [Element; 4] = [Element::O, Element::N, Element::P, Element::S];

/// N-H on a neutral trivalent or cationic tetravalent nitrogen, neutral
/// O-H or S-H, and aromatic n-H.
pub fn is_h_bond_donor(molecule: &Molecule, atom: NodeIndex) -> bool {
    let data = molecule.atom(atom);
    if data.hydrogens == 0 {
        return false;
    }
    let valence = molecule.valence(atom);
    match data.element {
        Element::N if data.aromatic => data.hydrogens == 1 && data.charge == 0,
        Element::N => (valence == 3 && data.charge == 0) || (valence == 4 && data.charge == 1),
        Element::O | Element::S if !data.aromatic => data.hydrogens == 1 && data.charge == 0,
        _ => false,
    }
}

/// Whether a neighbour of `atom` has a double bond to O, N, P or S.
/// With `acyclic_only`, ring double bonds don't count.
fn next_to_double_bond(molecule: &Molecule, atom: NodeIndex, acyclic_only: bool) -> bool {
    molecule
        .neighbors(atom)
        .filter(|(_, _, bond)| *bond == Bond::Single)
        .any(|(neighbor, _, _)| {
            molecule.neighbors(neighbor).any(|(other, edge, bond)| {
                other != atom
                    && bond == Bond::Double
                    && !(acyclic_only && molecule.is_ring_bond(edge))
                    && ACCEPTOR_PARTNERS.contains(&molecule.atom(other).element)
            })
        })
}

pub fn is_h_bond_acceptor(molecule: &Molecule, atom: NodeIndex) -> bool {
    let data = molecule.atom(atom);
    let valence = molecule.valence(atom);
    match data.element {
        Element::F => true,
        Element::O | Element::S if data.aromatic => data.charge == 0,
        Element::O | Element::S => {
            data.charge < 0
                || (data.hydrogens == 0 && valence == 2)
                || (data.hydrogens == 1
                    && valence == 2
                    && !next_to_double_bond(molecule, atom, false))
        }
        Element::N if data.aromatic => data.hydrogens == 0 && data.charge == 0,
        Element::N => valence == 3 && !next_to_double_bond(molecule, atom, true),
        _ => false,
    }
}

/// Lipinski hydrogen-bond donors.
pub fn h_bond_donors(molecule: &Molecule) -> usize {
    molecule
        .atoms()
        .filter(|(index, _)| is_h_bond_donor(molecule, *index))
        .count()
}

/// Lipinski hydrogen-bond acceptors.
pub fn h_bond_acceptors(molecule: &Molecule) -> usize {
    molecule
        .atoms()
        .filter(|(index, _)| is_h_bond_acceptor(molecule, *index))
        .count()
}

/// The nitrogen of a secondary amide, `[NH]-C(=O)` outside a ring.
fn is_amide_nh(molecule: &Molecule, atom: NodeIndex) -> bool {
    let data = molecule.atom(atom);
    data.is(Element::N)
        && !data.aromatic
        && data.hydrogens == 1
        && molecule.neighbors(atom).any(|(other, edge, bond)| {
            bond == Bond::Single
                && !molecule.is_ring_bond(edge)
                && molecule.atom(other).is(Element::C)
                && molecule.has_double_bond_to(other, &[Element::O])
        })
}

fn can_rotate_around(molecule: &Molecule, atom: NodeIndex) -> bool {
    molecule.degree(atom) > 1
        && molecule.count_bonds(atom, Bond::Triple) == 0
        && !is_amide_nh(molecule, atom)
}

/// Single, acyclic bonds between two non-terminal atoms, neither of which
/// carries a triple bond or is a secondary amide nitrogen.
pub fn rotatable_bonds(molecule: &Molecule) -> usize {
    molecule
        .graph()
        .edge_indices()
        .filter(|&edge| molecule.graph()[edge] == Bond::Single && !molecule.is_ring_bond(edge))
        .filter(|&edge| {
            let (a, b) = molecule.endpoints(edge);
            can_rotate_around(molecule, a) && can_rotate_around(molecule, b)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn counts(smiles: &str) -> (usize, usize, usize) {
        let molecule = parse_smiles(smiles).unwrap();
        (
            h_bond_donors(&molecule),
            h_bond_acceptors(&molecule),
            rotatable_bonds(&molecule),
        )
    }

    #[test]
    fn test_aspirin() {
        assert_eq!(counts("CC(=O)Oc1ccccc1C(=O)O"), (1, 3, 3));
    }

    #[test]
    fn test_donors() {
        assert_eq!(counts("CCO").0, 1);
        assert_eq!(counts("CN").0, 1);
        assert_eq!(counts("CN(C)C").0, 0);
        assert_eq!(counts("C[NH3+]").0, 1);
        assert_eq!(counts("c1cc[nH]c1").0, 1);
        assert_eq!(counts("OCCO").0, 2);
    }

    #[test]
    fn test_acceptors() {
        assert_eq!(counts("c1ccncc1").1, 1);
        assert_eq!(counts("c1cc[nH]c1").1, 0);
        assert_eq!(counts("CC(=O)N").1, 1);
        assert_eq!(counts("CCN").1, 1);
        assert_eq!(counts("CC(F)(F)F").1, 3);
        assert_eq!(counts("CC(=O)[O-]").1, 2);
    }

    #[test]
    fn test_rotatable_bonds() {
        assert_eq!(counts("CCCC").2, 1);
        assert_eq!(counts("CC").2, 0);
        assert_eq!(counts("C1CCCCC1").2, 0);
        assert_eq!(counts("CC#CC").2, 0);
        assert_eq!(counts("c1ccccc1-c1ccccc1").2, 1);
        // Neither side of a secondary amide nitrogen rotates.
        assert_eq!(counts("CCNC(=O)CC").2, 1);
    }
}
