use super::atom::Atom;
use super::chain::ChainType;
use super::ids::{AtomId, ChainId, ResidueId};
use super::system::MolecularSystem;
use crate::core::chem::element::Element;
use nalgebra::Point3;
use std::collections::HashMap;

/// Incrementally assembles a [`MolecularSystem`] from sequential file records.
///
/// Structure files list atoms chain by chain and residue by residue; the builder
/// tracks the current chain/residue and maps file serial numbers to stable atom IDs
/// so bonds referenced by serial can be resolved after all atoms are read.
pub struct MolecularSystemBuilder {
    system: MolecularSystem,
    atom_serial_map: HashMap<usize, AtomId>,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
}

impl Default for MolecularSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self {
            system: MolecularSystem::new(),
            atom_serial_map: HashMap::new(),
            current_chain: None,
            current_residue: None,
        }
    }

    /// Returns true if no atoms have been added yet.
    pub fn is_empty(&self) -> bool {
        self.system.atom_count() == 0
    }

    pub fn start_chain(&mut self, id: char, chain_type: ChainType) -> &mut Self {
        let chain_id = self.system.add_chain(id, chain_type);
        if self.current_chain != Some(chain_id) {
            self.current_chain = Some(chain_id);
            self.current_residue = None;
        }
        self
    }

    pub fn start_residue(&mut self, id: isize, name: &str) -> &mut Self {
        let chain_id = self
            .current_chain
            .expect("Must start a chain before starting a residue");
        self.current_residue = self.system.add_residue(chain_id, id, name);
        self
    }

    pub fn add_atom(
        &mut self,
        serial: usize,
        name: &str,
        element: Element,
        position: Point3<f64>,
    ) -> AtomId {
        let residue_id = self
            .current_residue
            .expect("Cannot add atom without a current residue");

        let mut atom = Atom::new(name, residue_id, element, position);
        atom.serial = serial;

        let atom_id = self
            .system
            .add_atom_to_residue(residue_id, atom)
            .expect("Current residue must exist");
        self.atom_serial_map.insert(serial, atom_id);
        atom_id
    }

    /// Resolves an atom added earlier by its file serial number.
    pub fn atom_by_serial(&self, serial: usize) -> Option<AtomId> {
        self.atom_serial_map.get(&serial).copied()
    }

    /// Gives mutable access to an atom added earlier, so readers can fill in
    /// record fields (occupancy, charge, alternate location) after the fact.
    pub fn atom_mut(&mut self, atom_id: AtomId) -> Option<&mut Atom> {
        self.system.atom_mut(atom_id)
    }

    /// Adds a bond between two atoms identified by file serial numbers.
    ///
    /// Unknown serials are ignored; CONECT records routinely reference atoms that
    /// were filtered out upstream.
    pub fn add_bond_by_serial(&mut self, serial1: usize, serial2: usize) -> &mut Self {
        if let (Some(id1), Some(id2)) = (self.atom_by_serial(serial1), self.atom_by_serial(serial2))
        {
            self.system.add_bond(id1, id2);
        }
        self
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}
