use crate::core::stats::MoleculeStats;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Serialize)]
struct ChainRow<'a> {
    chain_id: &'a str,
    residue_count: usize,
    atom_count: usize,
    share_percent: f64,
}

#[derive(Serialize)]
struct ResidueRow<'a> {
    residue: &'a str,
    atom_count: usize,
}

/// Writes the per-chain breakdown as CSV, one row per chain in chain-id order.
///
/// The `share_percent` column is rounded to one decimal place.
pub fn write_chain_report<W: Write>(stats: &MoleculeStats, writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for chain in &stats.chain_info {
        let share = (chain.share_percent(stats.total_atoms) * 10.0).round() / 10.0;
        csv_writer.serialize(ChainRow {
            chain_id: &chain.chain_id,
            residue_count: chain.residue_count,
            atom_count: chain.atom_count,
            share_percent: share,
        })?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the residue composition as CSV, one row per residue code in code order.
pub fn write_residue_report<W: Write>(
    stats: &MoleculeStats,
    writer: W,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (residue, count) in &stats.residue_counts {
        csv_writer.serialize(ResidueRow {
            residue,
            atom_count: *count,
        })?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes `<stem>.chains.csv` and `<stem>.residues.csv` into `dir`.
///
/// # Return
///
/// The paths of the written files, chain report first.
pub fn write_reports_to_dir(
    stem: &str,
    stats: &MoleculeStats,
    dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    let chain_path = dir.join(format!("{stem}.chains.csv"));
    let residue_path = dir.join(format!("{stem}.residues.csv"));

    write_chain_report(stats, create(&chain_path)?)?;
    write_residue_report(stats, create(&residue_path)?)?;

    Ok(vec![chain_path, residue_path])
}

fn create(path: &Path) -> Result<File, ReportError> {
    File::create(path).map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
