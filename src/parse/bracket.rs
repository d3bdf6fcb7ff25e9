//! Bracket atoms: `[isotope? symbol chirality? hcount? charge? class?]`.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value},
    error::{convert_error, VerboseError},
    sequence::{pair, preceded},
    IResult,
};

use crate::{Atom, Element};

type Error<'a> = VerboseError<&'a str>;

type Res<'a, T> = IResult<&'a str, T, Error<'a>>;

/// The contents of a `[...]` atom, without the brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketAtom {
    pub isotope: Option<u16>,
    pub element: Element,
    pub aromatic: bool,
    /// Stereo marks are read but carry no meaning for descriptors.
    pub chiral: bool,
    pub hydrogens: u8,
    pub charge: i8,
    pub class: Option<u16>,
}

impl From<BracketAtom> for Atom {
    fn from(bracket: BracketAtom) -> Self {
        Atom {
            element: bracket.element,
            aromatic: bracket.aromatic,
            charge: bracket.charge,
            isotope: bracket.isotope,
            hydrogens: bracket.hydrogens,
            bracket: true,
        }
    }
}

fn aromatic_symbol(input: &str) -> Res<Element> {
    alt((
        map_opt(alt((tag("se"), tag("as"))), Element::from_aromatic_symbol),
        map_opt(recognize(one_of("bcnops")), Element::from_aromatic_symbol),
    ))(input)
}

fn aliphatic_symbol(input: &str) -> Res<Element> {
    let upper = || satisfy(|c: char| c.is_ascii_uppercase());
    alt((
        map_opt(
            recognize(pair(upper(), satisfy(|c: char| c.is_ascii_lowercase()))),
            Element::from_symbol,
        ),
        map_opt(recognize(upper()), Element::from_symbol),
        value(Element::Wildcard, char('*')),
    ))(input)
}

fn symbol(input: &str) -> Res<(Element, bool)> {
    alt((
        map(aromatic_symbol, |element| (element, true)),
        map(aliphatic_symbol, |element| (element, false)),
    ))(input)
}

fn chirality(input: &str) -> Res<&str> {
    recognize(pair(
        char('@'),
        opt(alt((
            recognize(char('@')),
            recognize(pair(
                alt((tag("TH"), tag("AL"), tag("SP"), tag("TB"), tag("OH"))),
                digit1,
            )),
        ))),
    ))(input)
}

fn hydrogen_count(input: &str) -> Res<u8> {
    map_res(preceded(char('H'), opt(digit1)), |digits: Option<&str>| {
        digits.map_or(Ok(1), str::parse::<u8>)
    })(input)
}

fn charge(input: &str) -> Res<i8> {
    alt((
        value(2, tag("++")),
        value(-2, tag("--")),
        map_res(preceded(char('+'), digit1), str::parse::<i8>),
        map_res(preceded(char('-'), digit1), |digits: &str| {
            digits.parse::<i8>().map(|charge| -charge)
        }),
        value(1, char('+')),
        value(-1, char('-')),
    ))(input)
}

fn atom_class(input: &str) -> Res<u16> {
    preceded(char(':'), map_res(digit1, str::parse::<u16>))(input)
}

fn bracket_atom(input: &str) -> Res<BracketAtom> {
    let (input, isotope) = opt(map_res(digit1, str::parse::<u16>))(input)?;
    let (input, (element, aromatic)) = symbol(input)?;
    let (input, chiral) = opt(chirality)(input)?;
    let (input, hydrogens) = opt(hydrogen_count)(input)?;
    let (input, charge) = opt(charge)(input)?;
    let (input, class) = opt(atom_class)(input)?;
    Ok((
        input,
        BracketAtom {
            isotope,
            element,
            aromatic,
            chiral: chiral.is_some(),
            hydrogens: hydrogens.unwrap_or(0),
            charge: charge.unwrap_or(0),
            class,
        },
    ))
}

/// Parse the text between `[` and `]`. The error is a human-readable
/// trace of where the grammar gave up.
pub fn parse_bracket_atom(content: &str) -> Result<BracketAtom, String> {
    match all_consuming(bracket_atom)(content) {
        Ok((_, atom)) => Ok(atom),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(convert_error(content, e)),
        Err(nom::Err::Incomplete(_)) => Err("incomplete".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple() {
        let atom = parse_bracket_atom("Na+").unwrap();
        assert_eq!(atom.element, Element::Na);
        assert_eq!(atom.charge, 1);
        assert_eq!(atom.hydrogens, 0);
        assert!(!atom.aromatic);
    }

    #[test]
    fn test_full_grammar() {
        let atom = parse_bracket_atom("13C@@H2-:7").unwrap();
        assert_eq!(atom.isotope, Some(13));
        assert_eq!(atom.element, Element::C);
        assert!(atom.chiral);
        assert_eq!(atom.hydrogens, 2);
        assert_eq!(atom.charge, -1);
        assert_eq!(atom.class, Some(7));
    }

    #[test]
    fn test_aromatic_and_charges() {
        let pyrrole_n = parse_bracket_atom("nH").unwrap();
        assert!(pyrrole_n.aromatic);
        assert_eq!(pyrrole_n.hydrogens, 1);

        assert_eq!(parse_bracket_atom("se").unwrap().element, Element::Se);
        assert_eq!(parse_bracket_atom("Fe++").unwrap().charge, 2);
        assert_eq!(parse_bracket_atom("Fe+3").unwrap().charge, 3);
        assert_eq!(parse_bracket_atom("O-2").unwrap().charge, -2);
        assert_eq!(parse_bracket_atom("NH4+").unwrap().hydrogens, 4);
    }

    #[test]
    fn test_two_letter_symbols() {
        assert_eq!(parse_bracket_atom("Cl-").unwrap().element, Element::Cl);
        assert_eq!(parse_bracket_atom("Hg").unwrap().element, Element::Hg);
        assert_eq!(parse_bracket_atom("CH3").unwrap().element, Element::C);
        assert_eq!(parse_bracket_atom("2H").unwrap().element, Element::H);
        assert_eq!(parse_bracket_atom("Pd").unwrap().element, Element::Pd);
        assert_eq!(parse_bracket_atom("Gd+3").unwrap().charge, 3);
        assert_eq!(parse_bracket_atom("*").unwrap().element, Element::Wildcard);
    }

    #[test]
    fn test_rejects() {
        assert!(parse_bracket_atom("").is_err());
        assert!(parse_bracket_atom("Xx").is_err());
        assert!(parse_bracket_atom("C+x").is_err());
        assert!(parse_bracket_atom("13").is_err());
    }
}
