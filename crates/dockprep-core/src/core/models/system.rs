use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use super::topology::Bond;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;

/// Represents a single molecule: atoms, residues, chains, and bonds.
///
/// This struct is the central data structure of receptor preparation. Storage is
/// slot-map based so atom identity survives removals, which matters for the
/// preserved-charge record: charges captured before preparation are restored to the
/// same atoms afterwards by ID, even if other atoms were deleted in between.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Name of the molecule, typically derived from the source file.
    name: String,
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Lookup map for finding residues by chain ID and residue number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
    /// Ordered chain IDs, preserving source-file order for output.
    chain_order: Vec<ChainId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the molecule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the molecule name.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in the system.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns a mutable iterator over all atoms in the system.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    /// Returns the number of atoms in the system.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    /// Returns an iterator over all residues in the system.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_mut(&mut self, id: ChainId) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    /// Returns an iterator over all chains, in source-file order.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|c| (id, c)))
    }

    /// Returns a slice of all bonds in the system.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Finds a chain ID by its single-character identifier.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue ID by its chain ID and residue number.
    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number))
            .copied()
    }

    /// Adds a new chain to the system or returns the existing one.
    ///
    /// Idempotent: if a chain with the given identifier already exists, its ID is
    /// returned without creating a duplicate.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue to the system or returns the existing one.
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(residue_number, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();

        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());

        let residue = self.residues.get_mut(residue_id)?;
        residue.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms.
    ///
    /// Idempotent: adding an existing bond succeeds without creating duplicates.
    /// Returns `None` if either atom does not exist.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId) -> Option<()> {
        if !self.atoms.contains_key(atom1_id) || !self.atoms.contains_key(atom2_id) {
            return None;
        }

        if let Some(neighbors) = self.bond_adjacency.get(atom1_id) {
            if neighbors.contains(&atom2_id) {
                return Some(());
            }
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    /// Removes an atom from the system, along with its bonds and adjacency entries.
    ///
    /// Returns the removed atom if it existed.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;

        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }

        let original_bonds = std::mem::take(&mut self.bonds);
        self.bonds = original_bonds
            .into_iter()
            .filter(|bond| !bond.contains(atom_id))
            .collect();

        let neighbors = self.bond_adjacency.remove(atom_id).unwrap_or_default();
        for neighbor_id in neighbors {
            if let Some(adjacency) = self.bond_adjacency.get_mut(neighbor_id) {
                adjacency.retain(|&id| id != atom_id);
            }
        }

        Some(atom)
    }

    /// Removes a residue and all its atoms from the system.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let residue = self.residues.get(residue_id)?.clone();

        for atom_id in residue.atoms().to_vec() {
            self.remove_atom(atom_id);
        }

        if let Some(chain) = self.chains.get_mut(residue.chain_id) {
            chain.residues.retain(|&id| id != residue_id);
        }

        self.residue_id_map
            .remove(&(residue.chain_id, residue.id));

        self.residues.remove(residue_id)
    }

    /// Removes a chain and all its residues from the system.
    pub fn remove_chain(&mut self, chain_id: ChainId) -> Option<Chain> {
        let chain = self.chains.get(chain_id)?.clone();

        for residue_id in chain.residues().to_vec() {
            self.remove_residue(residue_id);
        }

        self.chain_id_map.remove(&chain.id);
        self.chain_order.retain(|&id| id != chain_id);
        self.chains.remove(chain_id)
    }

    /// Retrieves the bonded neighbors of an atom.
    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Returns an iterator over atoms whose AutoDock type label equals `autodock_type`.
    ///
    /// This is the selection primitive behind charge preservation: `-p Zn` reduces
    /// to this filter with `"Zn"`.
    pub fn atoms_by_type<'a>(
        &'a self,
        autodock_type: &'a str,
    ) -> impl Iterator<Item = (AtomId, &'a Atom)> + 'a {
        self.atoms
            .iter()
            .filter(move |(_, atom)| atom.autodock_type == autodock_type)
    }

    /// Returns a vector of atom IDs whose AutoDock type label equals `autodock_type`.
    pub fn atom_ids_by_type(&self, autodock_type: &str) -> Vec<AtomId> {
        self.atoms_by_type(autodock_type).map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::element::Element;
    use nalgebra::Point3;

    struct TestRefs {
        chain_a_id: ChainId,
        gly_id: ResidueId,
        gly_n_id: AtomId,
        gly_ca_id: AtomId,
        ala_id: ResidueId,
        ala_ca_id: AtomId,
    }

    fn create_standard_test_system() -> (MolecularSystem, TestRefs) {
        let mut system = MolecularSystem::new();

        let chain_a_id = system.add_chain('A', ChainType::Protein);

        let gly_id = system.add_residue(chain_a_id, 1, "GLY").unwrap();
        let gly_n_atom = Atom::new("N", gly_id, Element::N, Point3::new(0.0, 0.0, 0.0));
        let gly_ca_atom = Atom::new("CA", gly_id, Element::C, Point3::new(1.4, 0.0, 0.0));

        let gly_n_id = system.add_atom_to_residue(gly_id, gly_n_atom).unwrap();
        let gly_ca_id = system.add_atom_to_residue(gly_id, gly_ca_atom).unwrap();
        system.add_bond(gly_n_id, gly_ca_id).unwrap();

        let ala_id = system.add_residue(chain_a_id, 2, "ALA").unwrap();
        let ala_ca_atom = Atom::new("CA", ala_id, Element::C, Point3::new(2.0, 1.0, 0.0));
        let ala_ca_id = system.add_atom_to_residue(ala_id, ala_ca_atom).unwrap();
        system.add_bond(gly_ca_id, ala_ca_id).unwrap();

        let refs = TestRefs {
            chain_a_id,
            gly_id,
            gly_n_id,
            gly_ca_id,
            ala_id,
            ala_ca_id,
        };

        (system, refs)
    }

    #[test]
    fn system_creation_and_access() {
        let (system, refs) = create_standard_test_system();

        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.residues_iter().count(), 2);
        assert_eq!(system.chains_iter().count(), 1);
        assert_eq!(system.bonds().len(), 2);
        assert!(system.find_chain_by_id('B').is_none());

        let found_gly = system.find_residue_by_id(refs.chain_a_id, 1).unwrap();
        let found_ala = system.find_residue_by_id(refs.chain_a_id, 2).unwrap();
        assert_eq!(found_gly, refs.gly_id);
        assert_eq!(found_ala, refs.ala_id);

        assert_eq!(system.residue(refs.gly_id).unwrap().name, "GLY");
        assert_eq!(system.atom(refs.gly_n_id).unwrap().name, "N");
    }

    #[test]
    fn add_chain_is_idempotent() {
        let mut system = MolecularSystem::new();
        let first = system.add_chain('A', ChainType::Protein);
        let second = system.add_chain('A', ChainType::Protein);
        assert_eq!(first, second);
        assert_eq!(system.chains_iter().count(), 1);
    }

    #[test]
    fn atom_removal_updates_system_correctly() {
        let (mut system, refs) = create_standard_test_system();

        let removed_atom = system.remove_atom(refs.gly_n_id).unwrap();

        assert_eq!(removed_atom.name, "N");
        assert_eq!(system.atom_count(), 2);
        assert!(system.atom(refs.gly_n_id).is_none());
        assert_eq!(system.bonds().len(), 1);
        assert!(
            !system
                .get_bonded_neighbors(refs.gly_ca_id)
                .unwrap()
                .contains(&refs.gly_n_id)
        );
        assert_eq!(system.residue(refs.gly_id).unwrap().atoms().len(), 1);
    }

    #[test]
    fn residue_removal_updates_system_correctly() {
        let (mut system, refs) = create_standard_test_system();

        let removed_residue = system.remove_residue(refs.gly_id).unwrap();

        assert_eq!(removed_residue.name, "GLY");
        assert_eq!(system.residues_iter().count(), 1);
        assert!(system.find_residue_by_id(refs.chain_a_id, 1).is_none());
        assert_eq!(system.atom_count(), 1);
        assert!(system.atom(refs.ala_ca_id).is_some());
        assert!(system.bonds().is_empty());
        assert_eq!(system.chain(refs.chain_a_id).unwrap().residues().len(), 1);
    }

    #[test]
    fn chain_removal_removes_everything_it_owns() {
        let (mut system, refs) = create_standard_test_system();

        let removed = system.remove_chain(refs.chain_a_id).unwrap();
        assert_eq!(removed.id, 'A');
        assert_eq!(system.atom_count(), 0);
        assert_eq!(system.residues_iter().count(), 0);
        assert_eq!(system.chains_iter().count(), 0);
        assert!(system.find_chain_by_id('A').is_none());
    }

    #[test]
    fn get_bonded_neighbors_returns_correct_neighbors() {
        let (system, refs) = create_standard_test_system();

        let n_neighbors = system.get_bonded_neighbors(refs.gly_n_id).unwrap();
        assert_eq!(n_neighbors, &[refs.gly_ca_id]);

        let ca_neighbors = system.get_bonded_neighbors(refs.gly_ca_id).unwrap();
        assert_eq!(ca_neighbors.len(), 2);
        assert!(ca_neighbors.contains(&refs.gly_n_id));
        assert!(ca_neighbors.contains(&refs.ala_ca_id));
    }

    #[test]
    fn idempotent_add_bond_does_not_create_duplicates() {
        let (mut system, refs) = create_standard_test_system();
        system.add_bond(refs.gly_n_id, refs.gly_ca_id).unwrap();
        system.add_bond(refs.gly_ca_id, refs.gly_n_id).unwrap();

        assert_eq!(system.bonds().len(), 2);
        let neighbors = system.get_bonded_neighbors(refs.gly_n_id).unwrap();
        assert_eq!(neighbors.len(), 1);
    }

    #[test]
    fn atoms_by_type_filters_on_autodock_label() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A', ChainType::Other);
        let res_id = system.add_residue(chain_id, 1, "LIG").unwrap();

        let zn = Atom::new("ZN", res_id, Element::Zn, Point3::origin());
        let fe = Atom::new("FE", res_id, Element::Fe, Point3::origin());
        let ca = Atom::new("CA", res_id, Element::C, Point3::origin());

        let zn_id = system.add_atom_to_residue(res_id, zn).unwrap();
        system.add_atom_to_residue(res_id, fe).unwrap();
        system.add_atom_to_residue(res_id, ca).unwrap();

        assert_eq!(system.atom_ids_by_type("Zn"), vec![zn_id]);
        assert_eq!(system.atoms_by_type("Mg").count(), 0);
    }

    #[test]
    fn chains_iter_preserves_insertion_order() {
        let mut system = MolecularSystem::new();
        system.add_chain('B', ChainType::Protein);
        system.add_chain('A', ChainType::Protein);
        let order: Vec<char> = system.chains_iter().map(|(_, c)| c.id).collect();
        assert_eq!(order, vec!['B', 'A']);
    }
}
