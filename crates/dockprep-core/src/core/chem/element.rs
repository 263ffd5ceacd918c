use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements encountered in receptor structures.
///
/// Covers the organic set plus the metals and halogens that commonly appear in
/// binding sites, and the lone-pair pseudo-element some force fields emit. Anything
/// else maps to [`Element::Other`] at parse time via the reader, never to an error
/// mid-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    C,
    N,
    O,
    S,
    P,
    F,
    Cl,
    Br,
    I,
    Na,
    K,
    Mg,
    Ca,
    Mn,
    Fe,
    Zn,
    /// Lone-pair pseudo-atom, produced by some charge models.
    Lp,
    Other,
}

#[derive(Debug, Error)]
#[error("Unknown element symbol")]
pub struct ParseElementError;

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "H" | "D" => Ok(Element::H),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "S" => Ok(Element::S),
            "P" => Ok(Element::P),
            "F" => Ok(Element::F),
            "CL" => Ok(Element::Cl),
            "BR" => Ok(Element::Br),
            "I" => Ok(Element::I),
            "NA" => Ok(Element::Na),
            "K" => Ok(Element::K),
            "MG" => Ok(Element::Mg),
            "CA" => Ok(Element::Ca),
            "MN" => Ok(Element::Mn),
            "FE" => Ok(Element::Fe),
            "ZN" => Ok(Element::Zn),
            "LP" | "XX" => Ok(Element::Lp),
            _ => Err(ParseElementError),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Element {
    /// Infers the element from a PDB atom name when the element column is absent.
    ///
    /// Atom names encode the element in their leading characters ("CA" is the alpha
    /// carbon, "OG1" an oxygen). A whole-name match on a metal or halogen symbol is
    /// only trusted on hetero records, where "ZN" really is zinc; on polymer records
    /// "CA" must stay carbon. Otherwise the first alphabetic character decides, so
    /// digit-prefixed hydrogens like "1HB" resolve correctly.
    pub fn from_atom_name(name: &str, hetero: bool) -> Element {
        let trimmed = name.trim();
        if let Ok(element) = trimmed.parse::<Element>() {
            if trimmed.len() == 1 || (hetero && (element.is_metal() || trimmed == "CL" || trimmed == "BR")) {
                return element;
            }
        }
        let first_alpha = trimmed.chars().find(|c| c.is_ascii_alphabetic());
        match first_alpha {
            Some(c) => c
                .to_string()
                .parse::<Element>()
                .unwrap_or(Element::Other),
            None => Element::Other,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::S => "S",
            Element::P => "P",
            Element::F => "F",
            Element::Cl => "Cl",
            Element::Br => "Br",
            Element::I => "I",
            Element::Na => "Na",
            Element::K => "K",
            Element::Mg => "Mg",
            Element::Ca => "Ca",
            Element::Mn => "Mn",
            Element::Fe => "Fe",
            Element::Zn => "Zn",
            Element::Lp => "Lp",
            Element::Other => "X",
        }
    }

    /// Single-bond covalent radius in Angstroms, used for distance-based bond
    /// inference.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Element::H => 0.31,
            Element::C => 0.76,
            Element::N => 0.71,
            Element::O => 0.66,
            Element::S => 1.05,
            Element::P => 1.07,
            Element::F => 0.57,
            Element::Cl => 1.02,
            Element::Br => 1.20,
            Element::I => 1.39,
            Element::Na => 1.66,
            Element::K => 2.03,
            Element::Mg => 1.41,
            Element::Ca => 1.76,
            Element::Mn => 1.39,
            Element::Fe => 1.32,
            Element::Zn => 1.22,
            Element::Lp => 0.10,
            Element::Other => 1.50,
        }
    }

    /// Typical valence, used to decide how many hydrogens an atom is missing.
    pub fn typical_valence(&self) -> usize {
        match self {
            Element::H | Element::F | Element::Cl | Element::Br | Element::I => 1,
            Element::O | Element::S => 2,
            Element::N | Element::P => 3,
            Element::C => 4,
            _ => 0,
        }
    }

    /// Returns true for metal elements, which never receive hydrogens or take part
    /// in valence bookkeeping.
    pub fn is_metal(&self) -> bool {
        matches!(
            self,
            Element::Na
                | Element::K
                | Element::Mg
                | Element::Ca
                | Element::Mn
                | Element::Fe
                | Element::Zn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_and_two_letter_symbols() {
        assert_eq!("C".parse::<Element>().unwrap(), Element::C);
        assert_eq!("cl".parse::<Element>().unwrap(), Element::Cl);
        assert_eq!("ZN".parse::<Element>().unwrap(), Element::Zn);
        assert!("Q".parse::<Element>().is_err());
    }

    #[test]
    fn from_atom_name_handles_common_protein_names() {
        assert_eq!(Element::from_atom_name("CA", false), Element::C);
        assert_eq!(Element::from_atom_name("N", false), Element::N);
        assert_eq!(Element::from_atom_name("OG1", false), Element::O);
        assert_eq!(Element::from_atom_name("SD", false), Element::S);
        assert_eq!(Element::from_atom_name("HB2", false), Element::H);
    }

    #[test]
    fn from_atom_name_handles_digit_prefixed_hydrogens() {
        assert_eq!(Element::from_atom_name("1HB", false), Element::H);
        assert_eq!(Element::from_atom_name("2HG1", false), Element::H);
    }

    #[test]
    fn from_atom_name_trusts_metal_names_only_on_hetero_records() {
        assert_eq!(Element::from_atom_name("ZN", true), Element::Zn);
        assert_eq!(Element::from_atom_name("FE", true), Element::Fe);
        assert_eq!(Element::from_atom_name("MG", true), Element::Mg);
        assert_eq!(Element::from_atom_name(" CL", true), Element::Cl);
        // The alpha carbon must never become calcium.
        assert_eq!(Element::from_atom_name("CA", false), Element::C);
        assert_eq!(Element::from_atom_name("CA", true), Element::Ca);
    }

    #[test]
    fn metals_are_flagged_and_carry_no_valence() {
        assert!(Element::Zn.is_metal());
        assert!(!Element::C.is_metal());
        assert_eq!(Element::Zn.typical_valence(), 0);
        assert_eq!(Element::C.typical_valence(), 4);
    }

    #[test]
    fn covalent_radii_are_physical() {
        assert!(Element::H.covalent_radius() < Element::C.covalent_radius());
        assert!(Element::C.covalent_radius() < Element::S.covalent_radius());
    }
}
