use super::molecule::Molecule;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::Utf8Error;
use std::sync::Arc;

/// A raw input file handed to the parser collaborator.
///
/// The `name` is the file's identity throughout ingestion: it becomes the structure id and
/// display name, and it is what failure reports refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, naming it after the final path component.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Returns the payload as UTF-8 text.
    pub fn text(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}

/// Where a loaded structure's geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureSource {
    /// Uploaded by the user as a structure file.
    File,
    /// Produced by an external computational job.
    Job,
}

impl StructureSource {
    /// A longer, human-readable description of the source.
    pub fn description(&self) -> &'static str {
        match self {
            StructureSource::File => "Uploaded File",
            StructureSource::Job => "Job",
        }
    }
}

impl fmt::Display for StructureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StructureSource::File => "File",
                StructureSource::Job => "Job",
            }
        )
    }
}

/// A structure tracked by the registry for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStructure {
    /// Unique within the registry.
    pub id: String,
    pub name: String,
    pub source: StructureSource,
    /// Absent while a job-backed structure has not resolved its geometry.
    pub molecule: Option<Arc<Molecule>>,
    /// The original textual payload, kept for re-export or re-rendering.
    pub raw_data: Option<String>,
}

impl LoadedStructure {
    /// Creates a file-backed structure from a successful parse.
    pub fn from_file(
        id: impl Into<String>,
        name: impl Into<String>,
        molecule: Arc<Molecule>,
        raw_data: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: StructureSource::File,
            molecule: Some(molecule),
            raw_data,
        }
    }

    /// Creates a job-backed structure whose geometry has not been resolved yet.
    pub fn pending_job(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: StructureSource::Job,
            molecule: None,
            raw_data: None,
        }
    }

    /// Returns the number of atoms, or `None` if the geometry is not resolved.
    pub fn atom_count(&self) -> Option<usize> {
        self.molecule.as_ref().map(|m| m.len())
    }

    pub fn is_resolved(&self) -> bool {
        self.molecule.is_some()
    }
}

/// A raw uploaded file paired with its successfully parsed molecule.
///
/// Files whose parse failed are never stored as entries.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFileEntry {
    pub file: RawFile,
    pub molecule: Option<Arc<Molecule>>,
}

impl UploadedFileEntry {
    pub fn new(file: RawFile, molecule: Option<Arc<Molecule>>) -> Self {
        Self { file, molecule }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use std::io::Write;

    #[test]
    fn raw_file_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1abc.pdb");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "END").unwrap();

        let raw = RawFile::from_path(&path).unwrap();
        assert_eq!(raw.name, "1abc.pdb");
        assert_eq!(raw.text().unwrap(), "END\n");
    }

    #[test]
    fn raw_file_from_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RawFile::from_path(dir.path().join("missing.pdb")).is_err());
    }

    #[test]
    fn raw_file_text_rejects_invalid_utf8() {
        let raw = RawFile::new("bad.pdb", vec![0xff, 0xfe]);
        assert!(raw.text().is_err());
    }

    #[test]
    fn file_structure_reports_atom_count() {
        let molecule = Arc::new(Molecule::new(vec![Atom::new("C", "ALA", 1, "A")]));
        let structure = LoadedStructure::from_file("a.pdb", "a.pdb", molecule, None);

        assert_eq!(structure.source, StructureSource::File);
        assert_eq!(structure.atom_count(), Some(1));
        assert!(structure.is_resolved());
    }

    #[test]
    fn pending_job_has_no_geometry() {
        let structure = LoadedStructure::pending_job("job-42", "Docking run");

        assert_eq!(structure.source, StructureSource::Job);
        assert_eq!(structure.atom_count(), None);
        assert!(!structure.is_resolved());
    }

    #[test]
    fn source_labels_are_human_readable() {
        assert_eq!(StructureSource::File.to_string(), "File");
        assert_eq!(StructureSource::Job.to_string(), "Job");
        assert_eq!(StructureSource::File.description(), "Uploaded File");
    }
}
