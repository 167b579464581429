use crate::cli::StatsArgs;
use crate::commands::load_session;
use crate::error::{CliError, Result};
use molstat::core::io::report;
use molstat::engine::session::StructureStats;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub async fn run(args: StatsArgs, quiet: bool) -> Result<()> {
    let session = load_session(&args.load, quiet)?;
    let all_stats = session.structure_stats();

    for entry in &all_stats {
        println!("{}", render_stats(entry));
    }

    if let Some(selected) = session.selected_stats() {
        println!(
            "Selected structure: {} atoms across {} chain(s).",
            selected.total_atoms,
            selected.chain_info.len()
        );
    }

    if let Some(dir) = &args.csv {
        export_csv(&all_stats, dir)?;
    }
    Ok(())
}

fn export_csv(all_stats: &[StructureStats], dir: &Path) -> Result<()> {
    if all_stats.is_empty() {
        return Err(CliError::Argument(
            "no structure with geometry is loaded; nothing to export".into(),
        ));
    }
    std::fs::create_dir_all(dir)?;
    let mut used = HashSet::new();
    for entry in all_stats {
        let stem = unique_stem(report_stem(&entry.id), &mut used);
        let written = report::write_reports_to_dir(&stem, &entry.stats, dir)?;
        for path in &written {
            info!("Wrote report {:?}", path);
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Turns a structure id into a file stem: drops a trailing extension and replaces anything
/// outside `[A-Za-z0-9._-]` with `_`.
fn report_stem(id: &str) -> String {
    let base = match id.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(' ') => stem,
        _ => id,
    };
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Distinct ids can sanitize to the same stem; later ones get `-2`, `-3`, ... appended so
/// no report overwrites another.
fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    let unique = if used.contains(&stem) {
        (2..)
            .map(|n| format!("{stem}-{n}"))
            .find(|candidate| !used.contains(candidate))
            .unwrap_or(stem)
    } else {
        stem
    };
    used.insert(unique.clone());
    unique
}

/// Formats one structure's statistics as a plain-text block.
fn render_stats(entry: &StructureStats) -> String {
    let stats = &entry.stats;
    let mut out = String::new();

    let _ = writeln!(out, "== {} [{}] ==", entry.name, entry.source);
    let _ = writeln!(out, "Total atoms:     {}", stats.total_atoms);
    let _ = writeln!(
        out,
        "Unique elements: {} ({})",
        stats.unique_elements.len(),
        stats.unique_elements.join(", ")
    );
    let _ = writeln!(out, "Chains:");
    for chain in &stats.chain_info {
        let _ = writeln!(
            out,
            "  {:<4} {:>6} residues {:>8} atoms {:>6.1}%",
            chain.chain_id,
            chain.residue_count,
            chain.atom_count,
            chain.share_percent(stats.total_atoms)
        );
    }
    let _ = writeln!(out, "Water atoms:     {}", stats.water_count);
    let _ = write!(out, "Ion atoms:       {}", stats.ion_count);
    out
}
