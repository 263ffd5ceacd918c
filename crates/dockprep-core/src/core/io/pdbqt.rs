use crate::core::io::traits::StructureWriter;
use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbqtError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// Writer for rigid-receptor PDBQT files.
///
/// Emits PDB-style ATOM/HETATM records extended with the partial charge in
/// columns 71-76 and the AutoDock atom type in columns 78-79, chain by chain in
/// source order with a TER record after each chain. Atoms are renumbered
/// sequentially; preparation deletes atoms, and docking tools expect contiguous
/// serials.
pub struct PdbqtFile;

/// Pads an atom name into the four-character PDB name field.
///
/// Names of atoms with one-letter element symbols start in the second column
/// ("CA " reads as " CA "), unless the name already fills the field.
fn format_atom_name(atom: &Atom) -> String {
    if atom.name.len() >= 4 || atom.element.symbol().len() == 2 {
        format!("{:<4}", atom.name)
    } else {
        format!(" {:<3}", atom.name)
    }
}

impl StructureWriter for PdbqtFile {
    type Error = PdbqtError;

    fn write_to(system: &MolecularSystem, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut serial = 0_usize;

        for (_, chain) in system.chains_iter() {
            for &residue_id in chain.residues() {
                let residue = system.residue(residue_id).ok_or_else(|| {
                    PdbqtError::Inconsistency(format!(
                        "Chain {} references a missing residue",
                        chain.id
                    ))
                })?;
                let record = if residue.is_standard() { "ATOM" } else { "HETATM" };

                for &atom_id in residue.atoms() {
                    let atom = system.atom(atom_id).ok_or_else(|| {
                        PdbqtError::Inconsistency(format!(
                            "Residue {} references a missing atom",
                            residue.name
                        ))
                    })?;
                    serial += 1;

                    writeln!(
                        writer,
                        "{:<6}{:>5} {}{}{:<3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}    {:>6.3} {:<2}",
                        record,
                        serial,
                        format_atom_name(atom),
                        atom.alt_loc.unwrap_or(' '),
                        residue.name,
                        chain.id,
                        residue.id,
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.temp_factor,
                        atom.partial_charge().unwrap_or(0.0),
                        atom.autodock_type,
                    )?;
                }
            }
            writeln!(writer, "TER")?;
        }
        Ok(())
    }
}
