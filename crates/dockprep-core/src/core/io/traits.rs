use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading molecular structure formats.
///
/// A single file may contain several molecules (NMR models, for instance), so
/// reading yields a vector of systems in file order. Implementors handle
/// format-specific parsing.
pub trait StructureReader {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads every molecule in the input, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<MolecularSystem>, Self::Error>;

    /// Reads every molecule from a file path.
    ///
    /// Molecules are named after the file stem; when the file holds more than
    /// one, an index suffix keeps the names distinct.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MolecularSystem>, Self::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut systems = Self::read_from(&mut reader)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receptor".to_string());
        let multiple = systems.len() > 1;
        for (index, system) in systems.iter_mut().enumerate() {
            if system.name().is_empty() {
                if multiple {
                    system.set_name(&format!("{}_{}", stem, index + 1));
                } else {
                    system.set_name(&stem);
                }
            }
        }
        Ok(systems)
    }
}

/// Defines the interface for writing a molecular system to a structure format.
pub trait StructureWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes the system to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(system: &MolecularSystem, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes the system to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        system: &MolecularSystem,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(system, &mut writer)
    }
}
