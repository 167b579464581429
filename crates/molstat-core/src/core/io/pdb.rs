use super::error::ParseError;
use super::traits::{MolecularFile, StructureParser};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::RawFile;
use std::io::{self, BufRead};
use thiserror::Error;

const MIN_ATOM_RECORD_LENGTH: usize = 26;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("No ATOM or HETATM records found")]
    NoAtoms,
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 26 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

/// Derives an element symbol from an atom name when the element columns are blank.
///
/// Takes the first alphabetic character of the name, so `CA` becomes `C` and `1HB2`
/// becomes `H`.
fn element_from_atom_name(name: &str) -> Option<String> {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
}

/// Reader for the fixed-column PDB format.
///
/// Only `ATOM` and `HETATM` records are interpreted; every other record is skipped. Reading
/// stops at the first `ENDMDL`, so multi-model files yield their first model.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, Self::Error> {
        let mut atoms = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => atoms.push(parse_atom_record(&line, line_num)?),
                "ENDMDL" => break,
                _ => continue,
            }
        }

        if atoms.is_empty() {
            return Err(PdbError::NoAtoms);
        }
        Ok(Molecule::new(atoms))
    }
}

fn parse_atom_record(line: &str, line_num: usize) -> Result<Atom, PdbError> {
    if line.len() < MIN_ATOM_RECORD_LENGTH {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }

    let name_str = slice_and_trim(line, 12, 16);
    let res_name_str = slice_and_trim(line, 17, 20);
    let chain_id_str = slice_and_trim(line, 21, 22);
    let res_seq_str = slice_and_trim(line, 22, 26);
    let element_str = slice_and_trim(line, 76, 78);

    if res_name_str.is_empty() {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::MissingRequiredField {
                columns: "18-20".into(),
            },
        });
    }

    let residue_id: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "23-26".into(),
            value: res_seq_str.into(),
        },
    })?;

    let element = if element_str.is_empty() {
        element_from_atom_name(name_str).ok_or_else(|| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::MissingRequiredField {
                columns: "77-78".into(),
            },
        })?
    } else {
        element_str.to_string()
    };

    Ok(Atom {
        element,
        residue: res_name_str.to_string(),
        residue_id,
        chain: chain_id_str.to_string(),
    })
}

/// The default [`StructureParser`], reading every raw file as PDB text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdbParser;

impl StructureParser for PdbParser {
    fn parse(&self, file: &RawFile) -> Result<Molecule, ParseError> {
        let text = file.text()?;
        let molecule = PdbFile::read_from(&mut text.as_bytes())?;
        Ok(molecule)
    }
}
