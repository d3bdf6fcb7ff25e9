use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::rings::{perceive_aromaticity, smallest_set_of_smallest_rings, Ring};
use crate::Element;

/// An atom in a molecular graph. Hydrogens are folded into their heavy
/// atom as a count rather than kept as separate nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Attached hydrogens, implicit or from a bracket hydrogen count.
    pub hydrogens: u8,
    /// Bracket atoms keep exactly the hydrogens they were written with.
    pub bracket: bool,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            hydrogens: 0,
            bracket: false,
        }
    }

    pub fn aromatic(element: Element) -> Self {
        Self {
            aromatic: true,
            ..Self::new(element)
        }
    }

    pub fn is(&self, element: Element) -> bool {
        self.element == element
    }

    /// Mass of the atom and its attached hydrogens.
    pub fn mass(&self) -> f64 {
        let own = match self.isotope {
            Some(mass_number) => self.element.isotope_mass(mass_number),
            None => self.element.atomic_weight(),
        };
        own + self.hydrogens as f64 * Element::H.atomic_weight()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// Contribution to an atom's valence. Aromatic bonds count as one unit;
    /// the extra pi electron is accounted for per atom.
    pub fn valence_units(self) -> u8 {
        match self {
            Bond::Single | Bond::Aromatic => 1,
            Bond::Double => 2,
            Bond::Triple => 3,
        }
    }
}

pub type MoleculeGraph = UnGraph<Atom, Bond>;

/// A validated molecular structure with perceived rings and aromaticity.
///
/// Only the SMILES reader constructs these, so holding a `Molecule` means
/// the input parsed successfully.
#[derive(Clone)]
pub struct Molecule {
    graph: MoleculeGraph,
    rings: Vec<Ring>,
    ring_bond: Vec<bool>,
    ring_atom: Vec<bool>,
}

impl Molecule {
    pub(crate) fn new(mut graph: MoleculeGraph) -> Self {
        let rings = smallest_set_of_smallest_rings(&graph);

        let mut ring_bond = vec![false; graph.edge_count()];
        let mut ring_atom = vec![false; graph.node_count()];
        for ring in &rings {
            for &bond in &ring.bonds {
                ring_bond[bond.index()] = true;
            }
            for &atom in &ring.atoms {
                ring_atom[atom.index()] = true;
            }
        }

        // An aromatic bond can only live in a ring; "c1ccccc1c1ccccc1" links
        // its rings with a plain single bond.
        for edge in graph.edge_indices() {
            if !ring_bond[edge.index()] && graph[edge] == Bond::Aromatic {
                graph[edge] = Bond::Single;
            }
        }

        perceive_aromaticity(&mut graph, &rings);

        Self {
            graph,
            rings,
            ring_bond,
            ring_atom,
        }
    }

    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn atoms(&self) -> impl Iterator<Item = (NodeIndex, &Atom)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    pub fn atom(&self, index: NodeIndex) -> &Atom {
        &self.graph[index]
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Rings whose atoms are all aromatic.
    pub fn aromatic_rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.rings
            .iter()
            .filter(move |ring| ring.atoms.iter().all(|&atom| self.graph[atom].aromatic))
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.ring_atom[atom.index()]
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.ring_bond[bond.index()]
    }

    pub fn in_ring_of_size(&self, atom: NodeIndex, size: usize) -> bool {
        self.rings
            .iter()
            .any(|ring| ring.len() == size && ring.atoms.contains(&atom))
    }

    /// Neighbouring atoms together with the bond that reaches them.
    pub fn neighbors(&self, atom: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex, Bond)> + '_ {
        self.graph.edges(atom).map(move |edge| {
            let other = if edge.source() == atom {
                edge.target()
            } else {
                edge.source()
            };
            (other, edge.id(), *edge.weight())
        })
    }

    /// Number of heavy-atom neighbours (hydrogens are folded into counts).
    pub fn degree(&self, atom: NodeIndex) -> usize {
        self.graph.edges(atom).count()
    }

    /// Total connections including attached hydrogens.
    pub fn connectivity(&self, atom: NodeIndex) -> usize {
        self.degree(atom) + self.graph[atom].hydrogens as usize
    }

    /// Bond orders plus hydrogens. Aromatic bonds count 1.5, rounded down
    /// after summing, which only matters for aromatic atoms.
    pub fn valence(&self, atom: NodeIndex) -> usize {
        let doubled: usize = self
            .graph
            .edges(atom)
            .map(|edge| match edge.weight() {
                Bond::Single => 2,
                Bond::Double => 4,
                Bond::Triple => 6,
                Bond::Aromatic => 3,
            })
            .sum();
        doubled / 2 + self.graph[atom].hydrogens as usize
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<(EdgeIndex, Bond)> {
        self.graph
            .find_edge(a, b)
            .map(|edge| (edge, self.graph[edge]))
    }

    pub fn count_bonds(&self, atom: NodeIndex, kind: Bond) -> usize {
        self.graph
            .edges(atom)
            .filter(|edge| *edge.weight() == kind)
            .count()
    }

    /// Whether `atom` carries a double bond to any element in `partners`.
    pub fn has_double_bond_to(&self, atom: NodeIndex, partners: &[Element]) -> bool {
        self.neighbors(atom).any(|(other, _, bond)| {
            bond == Bond::Double && partners.contains(&self.graph[other].element)
        })
    }

    pub fn endpoints(&self, bond: EdgeIndex) -> (NodeIndex, NodeIndex) {
        // Edge indices handed out by this molecule always exist.
        self.graph
            .edge_endpoints(bond)
            .unwrap_or((NodeIndex::end(), NodeIndex::end()))
    }

    /// Molecular formula in Hill order.
    pub fn formula(&self) -> String {
        let mut counts = std::collections::BTreeMap::<&str, usize>::new();
        let mut hydrogens = 0;
        for (_, atom) in self.atoms() {
            *counts.entry(atom.element.symbol()).or_default() += 1;
            hydrogens += atom.hydrogens as usize;
        }
        if hydrogens > 0 {
            *counts.entry("H").or_default() += hydrogens;
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: usize| {
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };
        if let Some(carbons) = counts.remove("C") {
            push("C", carbons);
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }
        formula
    }
}

impl Debug for Molecule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "Molecule({}, {} atoms, {} bonds, {} rings)",
            self.formula(),
            self.atom_count(),
            self.bond_count(),
            self.rings.len()
        )
    }
}
