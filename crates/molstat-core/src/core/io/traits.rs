use super::error::ParseError;
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::RawFile;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading a molecular file format into a [`Molecule`].
///
/// Implementors handle format-specific parsing. Only reading is supported; molecules are
/// never written back.
pub trait MolecularFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a molecule from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader encounters an I/O error.
    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, Self::Error>;

    /// Reads a molecule from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Molecule, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// The parser collaborator used by the ingestion workflow.
///
/// Implementations must be callable independently for every file and must not share
/// mutable state across calls, since files of one batch may be parsed concurrently.
pub trait StructureParser: Sync {
    /// Parses one raw file into a molecule.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing why this file could not be parsed.
    fn parse(&self, file: &RawFile) -> Result<Molecule, ParseError>;
}

impl<F> StructureParser for F
where
    F: Fn(&RawFile) -> Result<Molecule, ParseError> + Sync,
{
    fn parse(&self, file: &RawFile) -> Result<Molecule, ParseError> {
        self(file)
    }
}
