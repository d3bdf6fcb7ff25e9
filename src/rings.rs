//! Ring perception.
//!
//! The smallest set of smallest rings is found with Horton's candidate
//! construction: every shortest-path cycle through a root atom and an edge
//! is a candidate, candidates are sorted by size, and a greedy GF(2)
//! elimination keeps the ones that are linearly independent until the
//! cyclomatic number is reached.

use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, VecDeque};

use crate::{Bond, Element, MoleculeGraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    /// Atoms in cyclic order.
    pub atoms: Vec<NodeIndex>,
    pub bonds: Vec<EdgeIndex>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bonds.contains(&bond)
    }
}

/// Number of independent cycles: bonds - atoms + components.
pub fn cyclomatic_number(graph: &MoleculeGraph) -> usize {
    let components = connected_components(graph);
    (graph.edge_count() + components).saturating_sub(graph.node_count())
}

/// Edge-incidence vector over GF(2).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BondSet(Vec<u64>);

impl BondSet {
    fn new(edges: usize) -> Self {
        BondSet(vec![0; edges.div_ceil(64).max(1)])
    }

    fn insert(&mut self, edge: EdgeIndex) {
        self.0[edge.index() / 64] |= 1 << (edge.index() % 64);
    }

    fn contains(&self, bit: usize) -> bool {
        self.0[bit / 64] & (1 << (bit % 64)) != 0
    }

    fn xor(&mut self, other: &BondSet) {
        for (word, other) in self.0.iter_mut().zip(&other.0) {
            *word ^= other;
        }
    }

    fn lowest_bit(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, word)| **word != 0)
            .map(|(i, word)| i * 64 + word.trailing_zeros() as usize)
    }
}

struct ShortestPaths {
    parent: Vec<Option<(NodeIndex, EdgeIndex)>>,
    depth: Vec<Option<usize>>,
}

impl ShortestPaths {
    fn from_root(graph: &MoleculeGraph, root: NodeIndex) -> Self {
        let mut parent = vec![None; graph.node_count()];
        let mut depth = vec![None; graph.node_count()];
        depth[root.index()] = Some(0);

        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let next_depth = depth[current.index()].map(|d| d + 1);
            let mut edges: Vec<_> = graph.edges(current).collect();
            edges.sort_by_key(|edge| edge.id());
            for edge in edges {
                let other = if edge.source() == current {
                    edge.target()
                } else {
                    edge.source()
                };
                if depth[other.index()].is_none() {
                    depth[other.index()] = next_depth;
                    parent[other.index()] = Some((current, edge.id()));
                    queue.push_back(other);
                }
            }
        }
        Self { parent, depth }
    }

    /// Atoms and bonds from `node` back to the root, root last.
    fn path(&self, node: NodeIndex) -> (Vec<NodeIndex>, Vec<EdgeIndex>) {
        let mut atoms = vec![node];
        let mut bonds = Vec::new();
        let mut current = node;
        while let Some((previous, bond)) = self.parent[current.index()] {
            atoms.push(previous);
            bonds.push(bond);
            current = previous;
        }
        (atoms, bonds)
    }
}

/// Horton candidates: for each root and each edge (x, y) reached from it,
/// the cycle root..x - y..root when both shortest paths only share the root.
fn candidate_rings(graph: &MoleculeGraph) -> Vec<Ring> {
    let mut seen = BTreeSet::new();
    let mut candidates = Vec::new();

    for root in graph.node_indices() {
        let paths = ShortestPaths::from_root(graph, root);
        for edge in graph.edge_references() {
            let (x, y) = (edge.source(), edge.target());
            if paths.depth[x.index()].is_none() || paths.depth[y.index()].is_none() {
                continue;
            }
            // Tree edges close nothing.
            let tree_edge = paths.parent[x.index()].map(|(_, e)| e) == Some(edge.id())
                || paths.parent[y.index()].map(|(_, e)| e) == Some(edge.id());
            if tree_edge {
                continue;
            }

            let (x_atoms, x_bonds) = paths.path(x);
            let (y_atoms, y_bonds) = paths.path(y);
            let x_set: BTreeSet<_> = x_atoms.iter().copied().collect();
            let shared = y_atoms.iter().filter(|atom| x_set.contains(atom)).count();
            if shared != 1 {
                continue;
            }

            // x ... root, then root's successor ... y in reverse.
            let mut atoms = x_atoms;
            atoms.extend(y_atoms.iter().rev().skip(1));
            let mut bonds = x_bonds;
            bonds.extend(y_bonds.iter().rev());
            bonds.push(edge.id());

            let mut key: Vec<_> = bonds.iter().map(|b| b.index()).collect();
            key.sort_unstable();
            if seen.insert(key) {
                candidates.push(Ring { atoms, bonds });
            }
        }
    }

    candidates.sort_by(|a, b| {
        a.len().cmp(&b.len()).then_with(|| {
            let mut a_key: Vec<_> = a.bonds.iter().map(|e| e.index()).collect();
            let mut b_key: Vec<_> = b.bonds.iter().map(|e| e.index()).collect();
            a_key.sort_unstable();
            b_key.sort_unstable();
            a_key.cmp(&b_key)
        })
    });
    candidates
}

/// The smallest set of smallest rings, ordered by ring size.
pub fn smallest_set_of_smallest_rings(graph: &MoleculeGraph) -> Vec<Ring> {
    let wanted = cyclomatic_number(graph);
    if wanted == 0 {
        return vec![];
    }

    // Reduced basis keyed by pivot bit.
    let mut basis: Vec<(usize, BondSet)> = Vec::new();
    let mut rings = Vec::with_capacity(wanted);

    for candidate in candidate_rings(graph) {
        let mut vector = BondSet::new(graph.edge_count());
        for &bond in &candidate.bonds {
            vector.insert(bond);
        }
        for (pivot, row) in &basis {
            if vector.contains(*pivot) {
                vector.xor(row);
            }
        }
        if let Some(pivot) = vector.lowest_bit() {
            for (_, row) in basis.iter_mut() {
                if row.contains(pivot) {
                    row.xor(&vector);
                }
            }
            basis.push((pivot, vector));
            rings.push(candidate);
            if rings.len() == wanted {
                break;
            }
        }
    }
    rings
}

/// Pi electrons an atom donates to a ring, or `None` if it cannot be part
/// of an aromatic system.
fn pi_electrons(graph: &MoleculeGraph, atom: NodeIndex, ring_bonds: &BTreeSet<EdgeIndex>) -> Option<u8> {
    let data = &graph[atom];
    if !matches!(
        data.element,
        Element::C | Element::N | Element::O | Element::S | Element::P | Element::Se | Element::B
    ) {
        return None;
    }

    let doubles: Vec<_> = graph
        .edges(atom)
        .filter(|edge| *edge.weight() == Bond::Double)
        .collect();
    if graph.edges(atom).any(|edge| *edge.weight() == Bond::Triple) {
        return None;
    }

    match doubles.as_slice() {
        [double] if ring_bonds.contains(&double.id()) => Some(1),
        [double] => {
            // Exocyclic C=O, C=N, C=S leaves the carbon with an empty p orbital.
            let other = if double.source() == atom {
                double.target()
            } else {
                double.source()
            };
            let partner = graph[other].element;
            if data.element == Element::C && matches!(partner, Element::O | Element::N | Element::S) {
                Some(0)
            } else {
                None
            }
        }
        [] => match (data.element, data.charge) {
            (Element::N, 0) | (Element::P, 0) => {
                let connections = graph.edges(atom).count() + data.hydrogens as usize;
                (connections == 3).then_some(2)
            }
            (Element::O, 0) | (Element::S, 0) | (Element::Se, 0) => Some(2),
            (Element::C, -1) => Some(2),
            (Element::C, 1) | (Element::B, 0) => Some(0),
            _ => None,
        },
        _ => None,
    }
}

/// Marks Kekulé rings with 4n+2 pi electrons as aromatic.
///
/// Each ring is judged on the input bond orders before anything is
/// rewritten, so fused systems like naphthalene come out fully aromatic.
pub fn perceive_aromaticity(graph: &mut MoleculeGraph, rings: &[Ring]) {
    let ring_bonds: BTreeSet<EdgeIndex> = rings.iter().flat_map(|r| r.bonds.iter().copied()).collect();

    let aromatic: Vec<&Ring> = rings
        .iter()
        .filter(|ring| ring.len() >= 5)
        .filter(|ring| ring.atoms.iter().all(|&atom| !graph[atom].aromatic))
        .filter(|ring| {
            let electrons: Option<u32> = ring
                .atoms
                .iter()
                .map(|&atom| pi_electrons(graph, atom, &ring_bonds).map(u32::from))
                .sum();
            matches!(electrons, Some(e) if e >= 2 && (e - 2) % 4 == 0)
        })
        .collect();

    for ring in aromatic {
        for &atom in &ring.atoms {
            graph[atom].aromatic = true;
        }
        for &bond in &ring.bonds {
            graph[bond] = Bond::Aromatic;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn ring_sizes(smiles: &str) -> Vec<usize> {
        let molecule = parse_smiles(smiles).unwrap();
        molecule.rings().iter().map(|ring| ring.len()).collect()
    }

    #[test]
    fn test_acyclic() {
        assert!(ring_sizes("CCCCO").is_empty());
    }

    #[test]
    fn test_fused_rings() {
        assert_eq!(ring_sizes("c1ccc2ccccc2c1"), vec![6, 6]);
        assert_eq!(ring_sizes("C1CC2CCC1C2"), vec![5, 5]);
        // Cubane has five independent rings, all four-membered.
        assert_eq!(ring_sizes("C12C3C4C1C5C2C3C45"), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn test_ring_atoms_in_cycle_order() {
        let molecule = parse_smiles("C1CCCCC1").unwrap();
        let ring = &molecule.rings()[0];
        assert_eq!(ring.len(), 6);
        for pair in ring.atoms.windows(2) {
            assert!(molecule.bond_between(pair[0], pair[1]).is_some());
        }
        assert!(molecule
            .bond_between(ring.atoms[0], ring.atoms[5])
            .is_some());
    }

    #[test]
    fn test_kekule_aromaticity() {
        for smiles in ["C1=CC=CC=C1", "C1=CC=C2C=CC=CC2=C1", "O1C=CC=C1", "O=C1C=CC=CN1"] {
            let molecule = parse_smiles(smiles).unwrap();
            assert!(
                molecule.aromatic_rings().count() >= 1,
                "{smiles} should be aromatic"
            );
        }
        for smiles in ["C1=CCC=C1", "O=C1C=CC(=O)C=C1", "C1=CCCCC1"] {
            let molecule = parse_smiles(smiles).unwrap();
            assert_eq!(molecule.aromatic_rings().count(), 0, "{smiles}");
        }
    }

    #[test]
    fn test_naphthalene_fully_aromatic() {
        let molecule = parse_smiles("C1=CC=C2C=CC=CC2=C1").unwrap();
        assert_eq!(molecule.aromatic_rings().count(), 2);
        assert!(molecule.atoms().all(|(_, atom)| atom.aromatic));
    }
}
