//! File I/O for molecular structure formats.
//!
//! [`pdb`] reads PDB files (including PDBQT-style charge and type columns);
//! [`pdbqt`] writes the prepared receptor. Both speak through the reader/writer
//! traits in [`traits`].

pub mod pdb;
pub mod pdbqt;
pub mod traits;
