use super::ids::{AtomId, ChainId};
use std::collections::HashMap;

/// Residue names accepted as standard during cleanup.
///
/// The 20 amino acids plus the common protonation-state and disulfide variants of
/// histidine and cysteine. Deliberately contains no nucleic acid residue names and
/// no metals.
static STANDARD_RESIDUE_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HID", "HSP", "HIE", "HIP", "CYX", "CSS",
};

/// Residue names recognized as water.
static WATER_RESIDUE_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "HOH", "WAT", "H2O", "DOD", "TIP", "TIP3",
};

/// Returns true if `name` is one of the standard protein residue names.
pub fn is_standard_residue(name: &str) -> bool {
    STANDARD_RESIDUE_NAMES.contains(name)
}

/// Returns true if `name` is a recognized water residue name.
pub fn is_water_residue(name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub id: isize,                               // Residue sequence number from source file
    pub name: String,                            // Name of the residue (e.g., "ALA", "HOH")
    pub chain_id: ChainId,                       // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,               // Atoms belonging to this residue, in order
    atom_name_map: HashMap<String, Vec<AtomId>>, // Map from atom name to stable IDs
}

impl Residue {
    pub(crate) fn new(id: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            id,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_default()
            .push(atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if let Some(ids) = self.atom_name_map.get_mut(atom_name) {
            ids.retain(|&id| id != atom_id);
            if ids.is_empty() {
                self.atom_name_map.remove(atom_name);
            }
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map
            .get(name)
            .and_then(|ids| ids.first().copied())
    }

    /// Returns true if this residue's name is in the standard protein set.
    pub fn is_standard(&self) -> bool {
        is_standard_residue(&self.name)
    }

    /// Returns true if this residue is a water molecule.
    pub fn is_water(&self) -> bool {
        is_water_residue(&self.name)
    }
}
