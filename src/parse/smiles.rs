use petgraph::algo::maximum_matching;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

use super::parse_bracket_atom;
use crate::{Atom, Bond, Element, Molecule, MoleculeGraph};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("Empty SMILES string")]
    Empty,
    #[error("Branch start '(' at position {0} (followed by {1}) without a current atom")]
    BranchNoCurrentAtom(usize, String),
    #[error("Branch end ')' at position {0} (followed by {1}) without a matching '('")]
    BranchEndNoStart(usize, String),
    #[error("Empty branch '()' at position {0}")]
    EmptyBranch(usize),
    #[error("Branch opened at position {0} is never closed")]
    UnclosedBranch(usize),
    #[error("Ring closure digit '{0}' at position {1} without a current atom")]
    RingClosureNoCurrentAtom(char, usize),
    #[error("Ring bond {0} is never closed")]
    UnclosedRing(u8),
    #[error("Invalid ring closure at position {0}")]
    InvalidRingClosure(usize),
    #[error("Ring bond {0} is written with two different bond orders")]
    ConflictingRingBond(u8),
    #[error("Unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("Invalid bracket atom '[{1}]' at position {0}")]
    InvalidBracketAtom(usize, String),
    #[error("Unknown element '{1}' at position {0}")]
    UnknownElement(usize, String),
    #[error("Bond at position {0} is not followed by an atom")]
    DanglingBond(usize),
    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),
    #[error("Aromatic atom '{1}' at position {0} is not in a ring")]
    AromaticOutsideRing(usize, String),
    #[error("Aromatic atom at position {0} cannot be given a Kekulé structure")]
    Kekulize(usize),
    #[error("Atom '{symbol}' at position {position} has invalid valence {valence}")]
    Valence {
        position: usize,
        symbol: String,
        valence: usize,
    },
}

/// Parses a SMILES string into a validated molecule.
///
/// Surrounding whitespace is ignored. Implicit hydrogens are filled in,
/// explicit `[H]` atoms are folded into their neighbour, and rings and
/// aromaticity are perceived before the molecule is returned.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }

    let (mut graph, positions) = parse_smiles_helper(smiles)?;
    assign_implicit_hydrogens(&mut graph, &positions)?;
    let (graph, positions) = fold_explicit_hydrogens(graph, positions)?;
    let kekule = check_kekule(&graph, &positions);

    let molecule = Molecule::new(graph);
    if let Some((index, atom)) = molecule
        .atoms()
        .find(|(index, atom)| atom.aromatic && !molecule.is_ring_atom(*index))
    {
        return Err(SmilesError::AromaticOutsideRing(
            positions[index.index()],
            atom.element.symbol().to_lowercase(),
        ));
    }
    kekule?;

    debug!("Parsed {smiles} as {molecule:?}");
    Ok(molecule)
}

fn default_bond(a: &Atom, b: &Atom) -> Bond {
    if a.aromatic && b.aromatic {
        Bond::Aromatic
    } else {
        Bond::Single
    }
}

/// Adds `atom` and bonds it to the previous atom, if any.
fn add_atom(
    graph: &mut MoleculeGraph,
    previous: Option<NodeIndex>,
    bond: Option<Bond>,
    atom: Atom,
) -> NodeIndex {
    let new_atom = graph.add_node(atom);
    if let Some(previous) = previous {
        let bond = bond.unwrap_or_else(|| default_bond(&graph[previous], &graph[new_atom]));
        graph.add_edge(previous, new_atom, bond);
    }
    new_atom
}

fn close_ring(
    graph: &mut MoleculeGraph,
    label: u8,
    (start, opening): (NodeIndex, Option<Bond>),
    end: NodeIndex,
    closing: Option<Bond>,
    position: usize,
) -> Result<(), SmilesError> {
    if start == end || graph.find_edge(start, end).is_some() {
        return Err(SmilesError::InvalidRingClosure(position));
    }
    let bond = match (opening, closing) {
        (Some(a), Some(b)) if a != b => return Err(SmilesError::ConflictingRingBond(label)),
        (Some(bond), _) | (None, Some(bond)) => bond,
        (None, None) => default_bond(&graph[start], &graph[end]),
    };
    graph.add_edge(start, end, bond);
    Ok(())
}

/// Reads the atoms and bonds. Returns the graph along with the position of
/// each atom in the input, for error reporting.
fn parse_smiles_helper(smiles: &str) -> Result<(MoleculeGraph, Vec<usize>), SmilesError> {
    let mut graph = MoleculeGraph::new_undirected();
    let mut positions = Vec::new();
    let mut current_atom: Option<NodeIndex> = None;
    // The bond symbol waiting for its second atom, and where it was written.
    let mut bond_type: Option<(Bond, usize)> = None;
    let mut branch_stack: Vec<(NodeIndex, usize)> = Vec::new();
    let mut ring_map: BTreeMap<u8, (NodeIndex, Option<Bond>)> = BTreeMap::new();

    let chars: Vec<char> = smiles.chars().collect();
    let rest = |i: usize| chars[i..].iter().collect::<String>();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = current_atom.ok_or_else(|| SmilesError::BranchNoCurrentAtom(i, rest(i)))?;
                if let Some((_, position)) = bond_type {
                    return Err(SmilesError::DanglingBond(position));
                }
                branch_stack.push((atom, i));
                i += 1;
            }
            ')' => {
                let (atom, opened) = branch_stack
                    .pop()
                    .ok_or_else(|| SmilesError::BranchEndNoStart(i, rest(i)))?;
                if opened + 1 == i {
                    return Err(SmilesError::EmptyBranch(opened));
                }
                if let Some((_, position)) = bond_type {
                    return Err(SmilesError::DanglingBond(position));
                }
                current_atom = Some(atom);
                i += 1;
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                if current_atom.is_none() {
                    return Err(SmilesError::DanglingBond(i));
                }
                if bond_type.is_some() {
                    return Err(SmilesError::UnexpectedCharacter(c, i));
                }
                let bond = match c {
                    '=' => Bond::Double,
                    '#' => Bond::Triple,
                    ':' => Bond::Aromatic,
                    // Directional bonds only carry stereo information.
                    _ => Bond::Single,
                };
                bond_type = Some((bond, i));
                i += 1;
            }
            '0'..='9' | '%' => {
                let (label, width) = if c == '%' {
                    match (chars.get(i + 1), chars.get(i + 2)) {
                        (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                            let tens = a.to_digit(10).unwrap_or(0) as u8;
                            let ones = b.to_digit(10).unwrap_or(0) as u8;
                            (tens * 10 + ones, 3)
                        }
                        _ => return Err(SmilesError::InvalidRingClosure(i)),
                    }
                } else {
                    (c.to_digit(10).unwrap_or(0) as u8, 1)
                };
                let atom = current_atom.ok_or(SmilesError::RingClosureNoCurrentAtom(c, i))?;
                let bond = bond_type.take().map(|(bond, _)| bond);
                match ring_map.remove(&label) {
                    Some(opening) => close_ring(&mut graph, label, opening, atom, bond, i)?,
                    None => {
                        ring_map.insert(label, (atom, bond));
                    }
                }
                i += width;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|offset| i + offset)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let bracket = parse_bracket_atom(&content).map_err(|reason| {
                    trace!("Bracket atom [{content}] rejected:\n{reason}");
                    SmilesError::InvalidBracketAtom(i, content.clone())
                })?;
                let bond = bond_type.take().map(|(bond, _)| bond);
                current_atom = Some(add_atom(&mut graph, current_atom, bond, bracket.into()));
                positions.push(i);
                i = end + 1;
            }
            '.' => {
                if current_atom.is_none() {
                    return Err(SmilesError::UnexpectedCharacter(c, i));
                }
                if let Some((_, position)) = bond_type {
                    return Err(SmilesError::DanglingBond(position));
                }
                current_atom = None;
                i += 1;
            }
            '*' => {
                let bond = bond_type.take().map(|(bond, _)| bond);
                let atom = Atom::new(Element::Wildcard);
                current_atom = Some(add_atom(&mut graph, current_atom, bond, atom));
                positions.push(i);
                i += 1;
            }
            _ if c.is_ascii_alphabetic() => {
                let two_letter = match (c, chars.get(i + 1)) {
                    ('C', Some('l')) => Some(Element::Cl),
                    ('B', Some('r')) => Some(Element::Br),
                    _ => None,
                };
                let (atom, width) = if let Some(element) = two_letter {
                    (Atom::new(element), 2)
                } else if let Some(element) = Element::from_organic_symbol(&c.to_string()) {
                    (Atom::new(element), 1)
                } else if let Some(element) = Element::from_aromatic_symbol(&c.to_string()) {
                    (Atom::aromatic(element), 1)
                } else {
                    return Err(SmilesError::UnknownElement(i, c.to_string()));
                };
                let bond = bond_type.take().map(|(bond, _)| bond);
                current_atom = Some(add_atom(&mut graph, current_atom, bond, atom));
                positions.push(i);
                i += width;
            }
            _ => return Err(SmilesError::UnexpectedCharacter(c, i)),
        }
    }

    if let Some((_, position)) = bond_type {
        return Err(SmilesError::DanglingBond(position));
    }
    if let Some((_, opened)) = branch_stack.first() {
        return Err(SmilesError::UnclosedBranch(*opened));
    }
    if let Some(label) = ring_map.keys().next() {
        return Err(SmilesError::UnclosedRing(*label));
    }
    Ok((graph, positions))
}

fn bond_units(graph: &MoleculeGraph, atom: NodeIndex) -> usize {
    graph
        .edges(atom)
        .map(|edge| edge.weight().valence_units() as usize)
        .sum()
}

fn has_double_bond(graph: &MoleculeGraph, atom: NodeIndex) -> bool {
    graph.edges(atom).any(|edge| *edge.weight() == Bond::Double)
}

/// Organic-subset atoms get the hydrogens that bring them to their lowest
/// standard valence. Aromatic atoms without a double bond reserve one unit
/// for the pi system when their lowest valence allows it; aromatic carbon
/// and boron must. Bracket atoms keep their written count but are checked.
fn assign_implicit_hydrogens(graph: &mut MoleculeGraph, positions: &[usize]) -> Result<(), SmilesError> {
    for node in graph.node_indices() {
        let bonds = bond_units(graph, node);
        let atom = &graph[node];
        let valences = atom.element.default_valences();
        let invalid = |valence: usize| SmilesError::Valence {
            position: positions[node.index()],
            symbol: atom.element.symbol().to_string(),
            valence,
        };
        let lowest_fit = |bonds: usize| valences.iter().map(|&v| v as usize).find(|&v| v >= bonds);

        let hydrogens = if atom.bracket {
            let total = bonds + atom.hydrogens as usize;
            if let Some(&max) = valences.last() {
                // A charge shifts the allowed valence by at most its size.
                let max = max as usize + atom.charge.unsigned_abs() as usize;
                if total > max {
                    return Err(invalid(total));
                }
            }
            continue;
        } else if atom.is(Element::Wildcard) {
            0
        } else if atom.aromatic && !has_double_bond(graph, node) {
            let first = valences.first().copied().unwrap_or(0) as usize;
            if bonds < first {
                first - bonds - 1
            } else if matches!(atom.element, Element::C | Element::B) {
                return Err(invalid(bonds + 1));
            } else {
                match lowest_fit(bonds) {
                    Some(valence) => valence - bonds,
                    None => return Err(invalid(bonds)),
                }
            }
        } else {
            match lowest_fit(bonds) {
                Some(valence) => valence - bonds,
                None => return Err(invalid(bonds)),
            }
        };
        graph[node].hydrogens = hydrogens as u8;
    }
    Ok(())
}

/// Merges plain `[H]` atoms into the hydrogen count of the heavy atom they
/// hang off. Isotopic and charged hydrogens stay as atoms.
fn fold_explicit_hydrogens(
    graph: MoleculeGraph,
    positions: Vec<usize>,
) -> Result<(MoleculeGraph, Vec<usize>), SmilesError> {
    let host = |node: NodeIndex| -> Option<NodeIndex> {
        let atom = &graph[node];
        if !atom.is(Element::H) || atom.isotope.is_some() || atom.charge != 0 || atom.hydrogens != 0 {
            return None;
        }
        let mut neighbors = graph.neighbors(node);
        match (neighbors.next(), neighbors.next()) {
            (Some(heavy), None) if !graph[heavy].is(Element::H) => Some(heavy),
            _ => None,
        }
    };

    let hosts: Vec<Option<NodeIndex>> = graph.node_indices().map(host).collect();
    if hosts.iter().all(Option::is_none) {
        return Ok((graph, positions));
    }

    let mut folded = MoleculeGraph::new_undirected();
    let mut mapping = vec![None; graph.node_count()];
    let mut folded_positions = Vec::new();
    for node in graph.node_indices() {
        if hosts[node.index()].is_none() {
            mapping[node.index()] = Some(folded.add_node(graph[node].clone()));
            folded_positions.push(positions[node.index()]);
        }
    }
    for host in hosts.iter().flatten() {
        if let Some(new_host) = mapping[host.index()] {
            let atom = &mut folded[new_host];
            let Some(hydrogens) = atom.hydrogens.checked_add(1) else {
                return Err(SmilesError::Valence {
                    position: positions[host.index()],
                    symbol: atom.element.symbol().to_string(),
                    valence: atom.hydrogens as usize + 1,
                });
            };
            atom.hydrogens = hydrogens;
        }
    }
    for edge in graph.edge_references() {
        if let (Some(a), Some(b)) = (mapping[edge.source().index()], mapping[edge.target().index()]) {
            folded.add_edge(a, b, *edge.weight());
        }
    }
    Ok((folded, folded_positions))
}

/// Lowest valence of `element` carrying `charge`. Cations of nitrogen and
/// chalcogens gain a bond, anions lose one; carbon and boron lose one
/// either way.
fn charged_valence(element: Element, charge: i8) -> Option<usize> {
    let first = *element.default_valences().first()? as isize;
    let charge = charge as isize;
    let valence = match element {
        Element::C | Element::B => first - charge.abs(),
        _ => first + charge,
    };
    usize::try_from(valence).ok()
}

/// Every aromatic atom that still owes the pi system a double bond must be
/// paired with an aromatic neighbour in the same position, or the aromatic
/// notation describes no real structure.
fn check_kekule(graph: &MoleculeGraph, positions: &[usize]) -> Result<(), SmilesError> {
    let needs_double = |node: NodeIndex| {
        let atom = &graph[node];
        if !atom.aromatic || has_double_bond(graph, node) {
            return false;
        }
        let used = bond_units(graph, node) + atom.hydrogens as usize;
        charged_valence(atom.element, atom.charge).is_some_and(|valence| used < valence)
    };

    let mut pi = UnGraph::<NodeIndex, ()>::new_undirected();
    let mut index = vec![None; graph.node_count()];
    for node in graph.node_indices().filter(|&node| needs_double(node)) {
        index[node.index()] = Some(pi.add_node(node));
    }
    if pi.node_count() == 0 {
        return Ok(());
    }
    for edge in graph.edge_references() {
        if *edge.weight() != Bond::Aromatic {
            continue;
        }
        if let (Some(a), Some(b)) = (index[edge.source().index()], index[edge.target().index()]) {
            pi.add_edge(a, b, ());
        }
    }

    let matching = maximum_matching(&pi);
    match pi.node_indices().find(|&node| matching.mate(node).is_none()) {
        Some(unpaired) => Err(SmilesError::Kekulize(positions[pi[unpaired].index()])),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydrogens(smiles: &str) -> Vec<u8> {
        parse_smiles(smiles)
            .unwrap()
            .atoms()
            .map(|(_, atom)| atom.hydrogens)
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        let ethanol = parse_smiles("CCO").unwrap();
        assert_eq!(ethanol.atom_count(), 3);
        assert_eq!(ethanol.bond_count(), 2);
        assert_eq!(hydrogens("CCO"), vec![3, 2, 1]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(parse_smiles("  CCO\n").unwrap().atom_count(), 3);
        assert_eq!(parse_smiles("   ").unwrap_err(), SmilesError::Empty);
    }

    #[test]
    fn test_implicit_hydrogens() {
        assert_eq!(hydrogens("C=O"), vec![2, 0]);
        assert_eq!(hydrogens("C#N"), vec![1, 0]);
        assert_eq!(hydrogens("CS(=O)(=O)C"), vec![3, 0, 0, 0, 3]);
        assert_eq!(hydrogens("c1ccncc1"), vec![1, 1, 1, 0, 1, 1]);
        assert_eq!(hydrogens("c1cc[nH]c1"), vec![1, 1, 1, 1, 1]);
        assert_eq!(hydrogens("[NH4+]"), vec![4]);
    }

    #[test]
    fn test_explicit_hydrogen_folded() {
        let methane = parse_smiles("[H]C([H])([H])[H]").unwrap();
        assert_eq!(methane.atom_count(), 1);
        assert_eq!(methane.formula(), "CH4");

        let water = parse_smiles("[H]O[H]").unwrap();
        assert_eq!(water.formula(), "H2O");

        let hydrogen = parse_smiles("[H][H]").unwrap();
        assert_eq!(hydrogen.atom_count(), 2);
    }

    #[test]
    fn test_ring_closures() {
        let cyclohexane = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(cyclohexane.rings().len(), 1);

        let two_digit = parse_smiles("C%10CCCCC%10").unwrap();
        assert_eq!(two_digit.rings().len(), 1);

        let cyclohexene = parse_smiles("C=1CCCCC=1").unwrap();
        assert_eq!(cyclohexene.count_bonds(NodeIndex::new(0), Bond::Double), 1);
    }

    #[test]
    fn test_stereo_ignored() {
        let a = parse_smiles("F/C=C/F").unwrap();
        let b = parse_smiles("FC=CF").unwrap();
        assert_eq!(a.formula(), b.formula());
        assert!(parse_smiles("N[C@@H](C)C(=O)O").is_ok());
    }

    #[test]
    fn test_branch_errors() {
        assert!(matches!(
            parse_smiles("(C)C"),
            Err(SmilesError::BranchNoCurrentAtom(0, _))
        ));
        assert!(matches!(
            parse_smiles("CC)C"),
            Err(SmilesError::BranchEndNoStart(2, _))
        ));
        assert_eq!(parse_smiles("C()C").unwrap_err(), SmilesError::EmptyBranch(1));
        assert_eq!(parse_smiles("CC(C").unwrap_err(), SmilesError::UnclosedBranch(2));
    }

    #[test]
    fn test_ring_errors() {
        assert_eq!(parse_smiles("C1CCC").unwrap_err(), SmilesError::UnclosedRing(1));
        assert_eq!(
            parse_smiles("1CC").unwrap_err(),
            SmilesError::RingClosureNoCurrentAtom('1', 0)
        );
        assert_eq!(parse_smiles("C11").unwrap_err(), SmilesError::InvalidRingClosure(2));
        assert_eq!(parse_smiles("C%1C").unwrap_err(), SmilesError::InvalidRingClosure(1));
        assert_eq!(
            parse_smiles("C=1CCCCC#1").unwrap_err(),
            SmilesError::ConflictingRingBond(1)
        );
    }

    #[test]
    fn test_atom_errors() {
        assert_eq!(
            parse_smiles("CXC").unwrap_err(),
            SmilesError::UnknownElement(1, "X".to_string())
        );
        assert_eq!(parse_smiles("C[C").unwrap_err(), SmilesError::UnclosedBracket(1));
        assert_eq!(
            parse_smiles("C[]").unwrap_err(),
            SmilesError::InvalidBracketAtom(1, String::new())
        );
        assert_eq!(parse_smiles("CC?").unwrap_err(), SmilesError::UnexpectedCharacter('?', 2));
        assert_eq!(parse_smiles("CC=").unwrap_err(), SmilesError::DanglingBond(2));
        assert_eq!(parse_smiles("=CC").unwrap_err(), SmilesError::DanglingBond(0));
    }

    #[test]
    fn test_aromatic_outside_ring() {
        assert_eq!(
            parse_smiles("Cc").unwrap_err(),
            SmilesError::AromaticOutsideRing(1, "c".to_string())
        );
    }

    #[test]
    fn test_valence() {
        assert!(matches!(
            parse_smiles("C(C)(C)(C)(C)C"),
            Err(SmilesError::Valence { valence: 5, .. })
        ));
        assert!(matches!(parse_smiles("[CH5]"), Err(SmilesError::Valence { .. })));
        assert!(parse_smiles("O=S(=O)(O)O").is_ok());
    }

    #[test]
    fn test_aromatic_valence() {
        assert!(matches!(
            parse_smiles("c1ccc(C)(C)cc1"),
            Err(SmilesError::Valence { valence: 5, .. })
        ));
        assert_eq!(hydrogens("Cn1cccc1"), vec![3, 0, 1, 1, 1, 1]);
        assert_eq!(hydrogens("c1ccoc1"), vec![1, 1, 1, 0, 1]);
        assert_eq!(hydrogens("O=c1cccc[nH]1"), vec![0, 0, 1, 1, 1, 1, 1]);
        assert_eq!(hydrogens("c1ccc2ccccc2c1"), vec![1, 1, 1, 0, 1, 1, 1, 1, 0, 1]);
    }

    #[test]
    fn test_kekulize() {
        assert!(matches!(parse_smiles("c1cccc1"), Err(SmilesError::Kekulize(_))));
        assert!(matches!(parse_smiles("n1cccc1"), Err(SmilesError::Kekulize(_))));
        assert!(matches!(parse_smiles("c1cccccc1"), Err(SmilesError::Kekulize(_))));

        for smiles in [
            "c1ccccc1",
            "c1ccncc1",
            "c1cc[nH]c1",
            "c1ccoc1",
            "c1ccsc1",
            "Cn1cccc1",
            "O=c1cccc[nH]1",
            "C[n+]1ccccc1",
            "[cH-]1cccc1",
            "c1ccc2[nH]ccc2c1",
        ] {
            assert!(parse_smiles(smiles).is_ok(), "{smiles} should parse");
        }
    }

    #[test]
    fn test_hydrogen_count_overflow() {
        assert!(matches!(parse_smiles("[NH255+][H]"), Err(SmilesError::Valence { .. })));
        assert!(matches!(parse_smiles("[NH7+]"), Err(SmilesError::Valence { .. })));
        assert!(matches!(
            parse_smiles("[PdH255][H]"),
            Err(SmilesError::Valence { valence: 256, .. })
        ));
        assert_eq!(parse_smiles("[PdH2][H]").unwrap().formula(), "H3Pd");
    }

    #[test]
    fn test_wildcard() {
        let attachment = parse_smiles("*C").unwrap();
        assert_eq!(hydrogens("*C"), vec![0, 3]);
        assert!(attachment.atoms().any(|(_, atom)| atom.is(Element::Wildcard)));
        assert!(parse_smiles("*c1ccccc1").is_ok());
        assert!(parse_smiles("[*]CC").is_ok());

        let palladium = parse_smiles("[Pd]").unwrap();
        assert!(palladium.atoms().all(|(_, atom)| atom.is(Element::Pd)));
        let gadolinium = parse_smiles("[Gd+3]").unwrap();
        assert!(gadolinium.atoms().all(|(_, atom)| atom.charge == 3));
    }

    #[test]
    fn test_fragments() {
        let salt = parse_smiles("CC(=O)[O-].[Na+]").unwrap();
        assert_eq!(salt.atom_count(), 5);
        assert!(matches!(parse_smiles(".C"), Err(SmilesError::UnexpectedCharacter('.', 0))));
    }
}
