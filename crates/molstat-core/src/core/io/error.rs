use super::pdb::PdbError;
use std::str::Utf8Error;
use thiserror::Error;

/// Why a single input file could not be turned into a molecule.
///
/// Parse errors are per-file and recoverable: the ingestion workflow collects them next to
/// the file's identity and keeps processing the remaining files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(#[from] Utf8Error),

    #[error(transparent)]
    Pdb(#[from] PdbError),

    #[error("{0}")]
    Rejected(String),
}
