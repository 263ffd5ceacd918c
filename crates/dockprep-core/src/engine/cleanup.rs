//! Cleanup passes that strip non-essential atoms from a prepared receptor.
//!
//! Each pass maps to one token of the cleanup option. Passes that delete charged
//! atoms fold the charge into the bonded heavy atom first, so the total charge
//! of the system is conserved.

use crate::core::chem::element::Element;
use crate::core::models::ids::{AtomId, ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use tracing::debug;

/// Deletes every nonpolar hydrogen, merging its charge into the bonded carbon.
///
/// Returns the number of hydrogens removed.
pub fn merge_nonpolar_hydrogens(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<(AtomId, AtomId)> = system
        .atoms_iter()
        .filter(|(_, atom)| atom.is_hydrogen())
        .filter_map(|(atom_id, _)| {
            let neighbors = system.get_bonded_neighbors(atom_id)?;
            let carbon = neighbors
                .iter()
                .find(|&&id| system.atom(id).is_some_and(|a| a.element == Element::C))?;
            Some((atom_id, *carbon))
        })
        .collect();

    let removed = doomed.len();
    for (hydrogen_id, carbon_id) in doomed {
        let Some(hydrogen) = system.remove_atom(hydrogen_id) else {
            continue;
        };
        if let Some((_, charge)) = hydrogen.active_charge() {
            if let Some(carbon) = system.atom_mut(carbon_id) {
                carbon.merge_charge(charge);
            }
        }
    }
    debug!(removed, "Merged nonpolar hydrogens");
    removed
}

/// Deletes lone-pair pseudo-atoms, merging each charge into its parent atom.
///
/// Returns the number of pseudo-atoms removed.
pub fn merge_lone_pairs(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<(AtomId, Option<AtomId>)> = system
        .atoms_iter()
        .filter(|(_, atom)| atom.element == Element::Lp)
        .map(|(atom_id, _)| {
            let parent = system
                .get_bonded_neighbors(atom_id)
                .and_then(|n| n.first().copied());
            (atom_id, parent)
        })
        .collect();

    let removed = doomed.len();
    for (lp_id, parent_id) in doomed {
        let Some(lone_pair) = system.remove_atom(lp_id) else {
            continue;
        };
        if let (Some((_, charge)), Some(parent_id)) = (lone_pair.active_charge(), parent_id) {
            if let Some(parent) = system.atom_mut(parent_id) {
                parent.merge_charge(charge);
            }
        }
    }
    debug!(removed, "Merged lone pairs");
    removed
}

/// Removes every water residue.
///
/// Returns the number of residues removed.
pub fn remove_waters(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<ResidueId> = system
        .residues_iter()
        .filter(|(_, residue)| residue.is_water())
        .map(|(id, _)| id)
        .collect();

    let removed = doomed.len();
    for residue_id in doomed {
        system.remove_residue(residue_id);
    }
    debug!(removed, "Removed water residues");
    removed
}

/// Removes every chain composed entirely of nonstandard residues.
///
/// Returns the number of chains removed.
pub fn remove_nonstd_chains(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<ChainId> = system
        .chains_iter()
        .filter(|(_, chain)| {
            !chain.residues().is_empty()
                && chain.residues().iter().all(|&residue_id| {
                    system
                        .residue(residue_id)
                        .is_none_or(|r| !r.is_standard())
                })
        })
        .map(|(id, _)| id)
        .collect();

    let removed = doomed.len();
    for chain_id in doomed {
        system.remove_chain(chain_id);
    }
    debug!(removed, "Removed nonstandard chains");
    removed
}

/// Deletes alternate-location B atoms and clears the marker on the survivors.
///
/// Returns the number of atoms removed.
pub fn delete_alt_b(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<AtomId> = system
        .atoms_iter()
        .filter(|(_, atom)| atom.alt_loc == Some('B'))
        .map(|(id, _)| id)
        .collect();

    let removed = doomed.len();
    for atom_id in doomed {
        system.remove_atom(atom_id);
    }
    for (_, atom) in system.atoms_iter_mut() {
        atom.alt_loc = None;
    }
    debug!(removed, "Deleted altloc-B atoms");
    removed
}

/// Removes every residue whose name is not in the standard set, from any chain.
///
/// Returns the number of residues removed.
pub fn delete_nonstd_residues(system: &mut MolecularSystem) -> usize {
    let doomed: Vec<ResidueId> = system
        .residues_iter()
        .filter(|(_, residue)| !residue.is_standard())
        .map(|(id, _)| id)
        .collect();

    let removed = doomed.len();
    for residue_id in doomed {
        system.remove_residue(residue_id);
    }
    debug!(removed, "Deleted nonstandard residues");
    removed
}
