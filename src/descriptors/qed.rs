//! Quantitative estimate of drug-likeness (Bickerton et al. 2012).

use petgraph::graph::NodeIndex;

use super::{crippen_logp, h_bond_donors, molecular_weight, rotatable_bonds, tpsa};
use crate::{Bond, Element, Molecule};

/// Parameters of one asymmetric double sigmoid.
#[derive(Debug, Clone, Copy)]
struct Desirability {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    dmax: f64,
}

impl Desirability {
    const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, dmax: f64) -> Self {
        Self { a, b, c, d, e, f, dmax }
    }

    fn at(&self, x: f64) -> f64 {
        let rising = 1.0 + (-(x - self.c + self.d / 2.0) / self.e).exp();
        let falling = 1.0 + (-(x - self.c - self.d / 2.0) / self.f).exp();
        (self.a + self.b / rising * (1.0 - 1.0 / falling)) / self.dmax
    }
}

/// MW, ALOGP, HBA, HBD, PSA, ROTB, AROM, ALERTS.
const PARAMETERS: [Desirability; 8] = [
    Desirability::new(2.817065973, 392.5754953, 290.7489764, 2.419764353, 49.22325677, 65.37051707, 104.9805561),
    Desirability::new(3.172690585, 137.8624751, 2.534937431, 4.581497897, 0.822739154, 0.576295591, 131.3186604),
    Desirability::new(2.948620388, 160.4605972, 3.615294657, 4.435986202, 0.290141953, 1.300669958, 148.7763046),
    Desirability::new(1.618662227, 1010.051101, 0.985094388, 0.000000001, 0.713820843, 0.920922555, 258.1632616),
    Desirability::new(1.876861559, 125.2232657, 62.90773554, 87.83366614, 12.01999824, 28.51324732, 104.5686167),
    Desirability::new(0.010000000, 272.4121427, 2.558379970, 1.565547684, 1.271567166, 2.758063707, 105.4420403),
    Desirability::new(3.217788970, 957.7374108, 2.274627939, 0.000000001, 1.317690384, 0.375760881, 312.3372610),
    Desirability::new(0.010000000, 1199.094025, -0.09002883, 0.000000001, 0.185904477, 0.875193782, 417.7253140),
];

/// Mean weights from Bickerton et al. (2012).
const WEIGHTS: [f64; 8] = [0.66, 0.46, 0.05, 0.61, 0.06, 0.65, 0.48, 0.95];

/// The eight properties QED is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QedProperties {
    pub mw: f64,
    pub alogp: f64,
    pub hba: usize,
    pub hbd: usize,
    pub psa: f64,
    pub rotb: usize,
    pub arom: usize,
    pub alerts: usize,
}

impl QedProperties {
    pub fn of(molecule: &Molecule) -> Self {
        Self {
            mw: molecular_weight(molecule),
            alogp: crippen_logp(molecule),
            hba: qed_acceptors(molecule),
            hbd: h_bond_donors(molecule),
            psa: tpsa(molecule),
            rotb: rotatable_bonds(molecule),
            arom: molecule.aromatic_rings().count(),
            alerts: structural_alerts(molecule).len(),
        }
    }

    fn values(&self) -> [f64; 8] {
        [
            self.mw,
            self.alogp,
            self.hba as f64,
            self.hbd as f64,
            self.psa,
            self.rotb as f64,
            self.arom as f64,
            self.alerts as f64,
        ]
    }

    /// Weighted geometric mean of the desirabilities.
    pub fn score(&self) -> f64 {
        let mut total = 0.0;
        for ((value, parameters), weight) in self.values().iter().zip(&PARAMETERS).zip(WEIGHTS) {
            let desirability = parameters.at(*value).max(f64::MIN_POSITIVE);
            total += weight * desirability.ln();
        }
        (total / WEIGHTS.iter().sum::<f64>()).exp().clamp(0.0, 1.0)
    }
}

/// Quantitative estimate of drug-likeness, between 0 and 1.
///
/// The ALERTS term counts matches from the 19 alerts in [`Alert`], a subset
/// of the 94 unwanted-group patterns QED is defined with. A molecule flagged
/// only by one of the missing patterns (a hydroquinone, say) scores as if it
/// had no alerts, so its QED can read higher than the reference value.
pub fn qed(molecule: &Molecule) -> f64 {
    QedProperties::of(molecule).score()
}

/// Acceptor count with the QED patterns, which differ from Lipinski's:
/// hydroxyl oxygens always count and amide nitrogens never do.
pub fn qed_acceptors(molecule: &Molecule) -> usize {
    molecule
        .atoms()
        .filter(|(index, _)| is_qed_acceptor(molecule, *index))
        .count()
}

fn is_qed_acceptor(molecule: &Molecule, atom: NodeIndex) -> bool {
    let data = molecule.atom(atom);
    let connections = molecule.connectivity(atom);
    let valence = molecule.valence(atom);
    let h = data.hydrogens;
    match (data.element, data.aromatic) {
        (Element::O, true) => h == 0 && connections == 2,
        (Element::N, true) => h == 0 && connections == 2,
        (Element::O, false) => {
            (data.charge < 0 && connections == 1)
                || (h <= 1 && connections == 2 && valence == 2)
                || (h == 0 && connections == 1 && valence == 2)
        }
        (Element::S, false) => {
            (data.charge < 0 && connections == 1)
                || (h == 0 && connections <= 2 && valence == 2)
        }
        (Element::N, false) if data.charge == 0 => {
            let nitrile_like = h == 0 && connections == 1 && valence == 3;
            let amine = connections == 3
                && valence == 3
                && !molecule.neighbors(atom).any(|(other, _, _)| {
                    matches!(molecule.atom(other).element, Element::C | Element::S)
                        && molecule.has_double_bond_to(other, &[Element::O])
                });
            nitrile_like || amine
        }
        _ => false,
    }
}

/// A structural alert used by QED's ALERTS term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    AcylHalide,
    SulfonylHalide,
    AlkylHalide,
    ThreeMemberedHeterocycle,
    Aldehyde,
    Peroxide,
    Hydrazine,
    AzoGroup,
    Isocyanate,
    Isothiocyanate,
    Thiol,
    Disulfide,
    Thiocarbonyl,
    Dicarbonyl,
    MichaelAcceptor,
    Alkyne,
    Nitro,
    Anhydride,
    Imine,
}

const ALERTS: [Alert; 19] = [
    Alert::AcylHalide,
    Alert::SulfonylHalide,
    Alert::AlkylHalide,
    Alert::ThreeMemberedHeterocycle,
    Alert::Aldehyde,
    Alert::Peroxide,
    Alert::Hydrazine,
    Alert::AzoGroup,
    Alert::Isocyanate,
    Alert::Isothiocyanate,
    Alert::Thiol,
    Alert::Disulfide,
    Alert::Thiocarbonyl,
    Alert::Dicarbonyl,
    Alert::MichaelAcceptor,
    Alert::Alkyne,
    Alert::Nitro,
    Alert::Anhydride,
    Alert::Imine,
];

struct AlertContext<'a> {
    molecule: &'a Molecule,
}

impl AlertContext<'_> {
    fn element(&self, atom: NodeIndex) -> Element {
        self.molecule.atom(atom).element
    }

    fn aliphatic(&self, atom: NodeIndex, element: Element) -> bool {
        let data = self.molecule.atom(atom);
        data.element == element && !data.aromatic
    }

    fn carbonyl(&self, atom: NodeIndex) -> bool {
        self.aliphatic(atom, Element::C) && self.molecule.has_double_bond_to(atom, &[Element::O])
    }

    /// Any bond of `kind` between an `a` and a `b`, in either direction.
    fn bond(&self, kind: Bond, a: impl Fn(NodeIndex) -> bool, b: impl Fn(NodeIndex) -> bool) -> bool {
        self.molecule.graph().edge_indices().any(|edge| {
            let (x, y) = self.molecule.endpoints(edge);
            self.molecule.graph()[edge] == kind && ((a(x) && b(y)) || (a(y) && b(x)))
        })
    }

    fn atom(&self, predicate: impl Fn(NodeIndex) -> bool) -> bool {
        self.molecule.atoms().any(|(index, _)| predicate(index))
    }

    fn halide(&self, atom: NodeIndex) -> bool {
        matches!(self.element(atom), Element::Cl | Element::Br | Element::I)
    }

    fn matches(&self, alert: Alert) -> bool {
        let m = self.molecule;
        match alert {
            Alert::AcylHalide => self.bond(Bond::Single, |a| self.carbonyl(a), |b| {
                self.halide(b) || self.element(b) == Element::F
            }),
            Alert::SulfonylHalide => self.bond(
                Bond::Single,
                |a| {
                    self.aliphatic(a, Element::S)
                        && m.neighbors(a)
                            .filter(|(o, _, bond)| *bond == Bond::Double && self.element(*o) == Element::O)
                            .count()
                            == 2
                },
                |b| self.halide(b) || self.element(b) == Element::F,
            ),
            Alert::AlkylHalide => self.bond(
                Bond::Single,
                |a| self.aliphatic(a, Element::C) && m.connectivity(a) == 4,
                |b| self.halide(b),
            ),
            Alert::ThreeMemberedHeterocycle => m.rings().iter().any(|ring| {
                ring.len() == 3 && ring.atoms.iter().any(|&a| self.element(a).is_hetero())
            }),
            Alert::Aldehyde => self.atom(|a| {
                self.carbonyl(a)
                    && m.atom(a).hydrogens >= 1
                    && m.neighbors(a).all(|(other, _, bond)| {
                        bond == Bond::Double || self.element(other) == Element::C
                    })
            }),
            Alert::Peroxide => {
                self.bond(Bond::Single, |a| self.element(a) == Element::O, |b| self.element(b) == Element::O)
            }
            Alert::Hydrazine => self.bond(
                Bond::Single,
                |a| self.aliphatic(a, Element::N),
                |b| self.aliphatic(b, Element::N) && m.atom(b).hydrogens == 2,
            ),
            Alert::AzoGroup => m.graph().edge_indices().any(|edge| {
                let (x, y) = m.endpoints(edge);
                m.graph()[edge] == Bond::Double
                    && !m.is_ring_bond(edge)
                    && self.aliphatic(x, Element::N)
                    && self.aliphatic(y, Element::N)
            }),
            Alert::Isocyanate | Alert::Isothiocyanate => {
                let terminal = if alert == Alert::Isocyanate { Element::O } else { Element::S };
                self.atom(|c| {
                    self.aliphatic(c, Element::C)
                        && m.has_double_bond_to(c, &[Element::N])
                        && m.has_double_bond_to(c, &[terminal])
                })
            }
            Alert::Thiol => self.atom(|a| self.aliphatic(a, Element::S) && m.atom(a).hydrogens > 0),
            Alert::Disulfide => {
                self.bond(Bond::Single, |a| self.element(a) == Element::S, |b| self.element(b) == Element::S)
            }
            Alert::Thiocarbonyl => self.bond(
                Bond::Double,
                |a| self.aliphatic(a, Element::C),
                |b| self.aliphatic(b, Element::S),
            ),
            Alert::Dicarbonyl => self.bond(Bond::Single, |a| self.carbonyl(a), |b| self.carbonyl(b)),
            Alert::MichaelAcceptor => m.graph().edge_indices().any(|edge| {
                let (x, y) = m.endpoints(edge);
                m.graph()[edge] == Bond::Double
                    && !m.is_ring_bond(edge)
                    && self.aliphatic(x, Element::C)
                    && self.aliphatic(y, Element::C)
                    && [x, y].iter().any(|&end| {
                        m.neighbors(end)
                            .any(|(other, _, bond)| bond == Bond::Single && self.carbonyl(other))
                    })
            }),
            Alert::Alkyne => self.bond(
                Bond::Triple,
                |a| self.element(a) == Element::C,
                |b| self.element(b) == Element::C,
            ),
            Alert::Nitro => self.atom(|n| {
                self.aliphatic(n, Element::N)
                    && m.neighbors(n)
                        .filter(|(o, _, _)| self.element(*o) == Element::O && m.degree(*o) == 1)
                        .count()
                        == 2
            }),
            Alert::Anhydride => self.atom(|o| {
                self.aliphatic(o, Element::O)
                    && m.degree(o) == 2
                    && m.neighbors(o).all(|(c, _, _)| self.carbonyl(c))
            }),
            Alert::Imine => m.graph().edge_indices().any(|edge| {
                let (x, y) = m.endpoints(edge);
                let c_n = (self.aliphatic(x, Element::C) && self.aliphatic(y, Element::N))
                    || (self.aliphatic(y, Element::C) && self.aliphatic(x, Element::N));
                m.graph()[edge] == Bond::Double
                    && !m.is_ring_bond(edge)
                    && c_n
                    && [x, y].iter().all(|&end| m.atom(end).charge == 0)
            }),
        }
    }
}

/// Structural alerts present in the molecule, from the subset in [`Alert`].
/// Each alert counts once.
pub fn structural_alerts(molecule: &Molecule) -> Vec<Alert> {
    let context = AlertContext { molecule };
    ALERTS
        .into_iter()
        .filter(|&alert| context.matches(alert))
        .collect()
}
