use lazy_static::lazy_static;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A chemical element, or the SMILES wildcard atom `*`.
///
/// Discriminants are atomic numbers; the wildcard is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Element {
    Wildcard = 0,
    H,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
    Rf,
    Db,
    Sg,
    Bh,
    Hs,
    Mt,
    Ds,
    Rg,
    Cn,
    Nh,
    Fl,
    Mc,
    Lv,
    Ts,
    Og,
}

use Element::*;

const ALL_ELEMENTS: [Element; 119] = [
    Wildcard, H, He, Li, Be, B, C, N, O, F, Ne, Na, Mg, Al, Si, P, S, Cl, Ar, K, Ca, Sc, Ti, V, Cr,
    Mn, Fe, Co, Ni, Cu, Zn, Ga, Ge, As, Se, Br, Kr, Rb, Sr, Y, Zr, Nb, Mo, Tc, Ru, Rh, Pd, Ag, Cd,
    In, Sn, Sb, Te, I, Xe, Cs, Ba, La, Ce, Pr, Nd, Pm, Sm, Eu, Gd, Tb, Dy, Ho, Er, Tm, Yb, Lu, Hf,
    Ta, W, Re, Os, Ir, Pt, Au, Hg, Tl, Pb, Bi, Po, At, Rn, Fr, Ra, Ac, Th, Pa, U, Np, Pu, Am, Cm,
    Bk, Cf, Es, Fm, Md, No, Lr, Rf, Db, Sg, Bh, Hs, Mt, Ds, Rg, Cn, Nh, Fl, Mc, Lv, Ts, Og,
];

/// Symbol and standard atomic weight, indexed by atomic number - 1. Elements
/// without a stable isotope use the mass number of the longest-lived one.
const ELEMENT_DATA: [(&str, f64); 118] = [
    ("H", 1.008), ("He", 4.003), ("Li", 6.94), ("Be", 9.012), ("B", 10.812), ("C", 12.011),
    ("N", 14.007), ("O", 15.999), ("F", 18.998), ("Ne", 20.18), ("Na", 22.99), ("Mg", 24.305),
    ("Al", 26.982), ("Si", 28.086), ("P", 30.974), ("S", 32.067), ("Cl", 35.453), ("Ar", 39.948),
    ("K", 39.098), ("Ca", 40.078), ("Sc", 44.956), ("Ti", 47.867), ("V", 50.942), ("Cr", 51.996),
    ("Mn", 54.938), ("Fe", 55.845), ("Co", 58.933), ("Ni", 58.693), ("Cu", 63.546), ("Zn", 65.39),
    ("Ga", 69.723), ("Ge", 72.61), ("As", 74.922), ("Se", 78.96), ("Br", 79.904), ("Kr", 83.8),
    ("Rb", 85.468), ("Sr", 87.62), ("Y", 88.906), ("Zr", 91.224), ("Nb", 92.906), ("Mo", 95.94),
    ("Tc", 98.0), ("Ru", 101.07), ("Rh", 102.906), ("Pd", 106.42), ("Ag", 107.868), ("Cd", 112.411),
    ("In", 114.818), ("Sn", 118.71), ("Sb", 121.76), ("Te", 127.6), ("I", 126.904), ("Xe", 131.29),
    ("Cs", 132.905), ("Ba", 137.328), ("La", 138.906), ("Ce", 140.116), ("Pr", 140.908),
    ("Nd", 144.24), ("Pm", 145.0), ("Sm", 150.36), ("Eu", 151.964), ("Gd", 157.25), ("Tb", 158.925),
    ("Dy", 162.5), ("Ho", 164.93), ("Er", 167.26), ("Tm", 168.934), ("Yb", 173.04), ("Lu", 174.967),
    ("Hf", 178.49), ("Ta", 180.948), ("W", 183.84), ("Re", 186.207), ("Os", 190.23),
    ("Ir", 192.217), ("Pt", 195.08), ("Au", 196.967), ("Hg", 200.59), ("Tl", 204.383),
    ("Pb", 207.2), ("Bi", 208.98), ("Po", 209.0), ("At", 210.0), ("Rn", 222.0), ("Fr", 223.0),
    ("Ra", 226.0), ("Ac", 227.0), ("Th", 232.038), ("Pa", 231.036), ("U", 238.029), ("Np", 237.0),
    ("Pu", 244.0), ("Am", 243.0), ("Cm", 247.0), ("Bk", 247.0), ("Cf", 251.0), ("Es", 252.0),
    ("Fm", 257.0), ("Md", 258.0), ("No", 259.0), ("Lr", 262.0), ("Rf", 267.0), ("Db", 268.0),
    ("Sg", 269.0), ("Bh", 270.0), ("Hs", 269.0), ("Mt", 278.0), ("Ds", 281.0), ("Rg", 281.0),
    ("Cn", 285.0), ("Nh", 286.0), ("Fl", 289.0), ("Mc", 289.0), ("Lv", 293.0), ("Ts", 294.0),
    ("Og", 294.0),
];

lazy_static! {
    static ref SYMBOLS: BTreeMap<&'static str, Element> =
        ALL_ELEMENTS.iter().map(|&e| (e.symbol(), e)).collect();
}

impl Element {
    /// Look up an element by its case-sensitive symbol ("C", "Cl", ...).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOLS.get(symbol).copied()
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn from_organic_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "B" => Some(B),
            "C" => Some(C),
            "N" => Some(N),
            "O" => Some(O),
            "P" => Some(P),
            "S" => Some(S),
            "F" => Some(F),
            "Cl" => Some(Cl),
            "Br" => Some(Br),
            "I" => Some(I),
            _ => None,
        }
    }

    /// Lowercase aromatic symbols. `se` and `as` are only legal inside brackets.
    pub fn from_aromatic_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "b" => Some(B),
            "c" => Some(C),
            "n" => Some(N),
            "o" => Some(O),
            "p" => Some(P),
            "s" => Some(S),
            "se" => Some(Se),
            "as" => Some(As),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self.atomic_number() {
            0 => "*",
            n => ELEMENT_DATA[n as usize - 1].0,
        }
    }

    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    /// Standard atomic weight in daltons. The wildcard weighs nothing.
    pub fn atomic_weight(&self) -> f64 {
        match self.atomic_number() {
            0 => 0.0,
            n => ELEMENT_DATA[n as usize - 1].1,
        }
    }

    /// Mass of a specific isotope. Hydrogen isotopes use their measured
    /// masses, everything else is approximated by the mass number.
    pub fn isotope_mass(&self, mass_number: u16) -> f64 {
        match (self, mass_number) {
            (H, 1) => 1.00783,
            (H, 2) => 2.01410,
            (H, 3) => 3.01605,
            (C, 13) => 13.00335,
            (N, 15) => 15.00011,
            (O, 18) => 17.99916,
            (Wildcard, _) => 0.0,
            _ => mass_number as f64,
        }
    }

    /// Allowed valences used to fill in implicit hydrogens, lowest first.
    /// Elements outside the organic subset never receive implicit hydrogens.
    pub fn default_valences(&self) -> &'static [u8] {
        match self {
            H => &[1],
            B => &[3],
            C => &[4],
            N => &[3, 5],
            O => &[2],
            F | Cl | Br => &[1],
            I => &[1, 3, 5],
            Si => &[4],
            P => &[3, 5],
            S | Se => &[2, 4, 6],
            As => &[3, 5],
            _ => &[],
        }
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self, F | Cl | Br | I)
    }

    /// Carbon and hydrogen are the only non-heteroatoms. The wildcard is
    /// neither.
    pub fn is_hetero(&self) -> bool {
        !matches!(self, C | H | Wildcard)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}
