use crate::cli::InfoArgs;
use crate::commands::load_session;
use crate::error::Result;
use molstat::engine::selection::{Collection, Selection};
use molstat::engine::session::{Session, StructureSummary};
use molstat::engine::viewer::ViewerState;
use std::fmt::Write as _;

pub async fn run(args: InfoArgs, quiet: bool) -> Result<()> {
    let session = load_session(&args.load, quiet)?;
    println!("{}", render_session(&session));
    Ok(())
}

fn render_session(session: &Session) -> String {
    let mut out = String::new();
    let selection = session.selection();

    let _ = writeln!(out, "Structures ({}):", session.structures().len());
    for (index, summary) in session.summaries().iter().enumerate() {
        let marker = selection_marker(selection, Collection::Structures, index);
        let _ = writeln!(out, "{marker} {}", render_summary(summary));
    }

    let _ = writeln!(out, "Uploaded files ({}):", session.files().len());
    for (index, entry) in session.files().iter().enumerate() {
        let marker = selection_marker(selection, Collection::Files, index);
        let status = if entry.molecule.is_some() {
            "parsed"
        } else {
            "unparsed"
        };
        let _ = writeln!(
            out,
            "{marker} {} ({} bytes, {status})",
            entry.name(),
            entry.file.bytes.len()
        );
    }

    out.push_str(&render_viewer(session.viewer_state()));
    out
}

fn selection_marker(selection: Option<Selection>, collection: Collection, index: usize) -> char {
    match selection {
        Some(s) if s.collection == collection && s.index == index => '*',
        _ => ' ',
    }
}

fn render_summary(summary: &StructureSummary) -> String {
    let atoms = match summary.atom_count {
        Some(n) => format!("{n} atoms"),
        None => "pending".to_string(),
    };
    format!(
        "{} [{}] {atoms}",
        summary.name,
        summary.source.description()
    )
}

fn render_viewer(state: &ViewerState) -> String {
    format!(
        "Viewer: mode={} colors={} atom-size={:.1} ligands={} water/ions={}",
        state.view_mode,
        state.color_scheme,
        state.atom_size,
        on_off(state.show_ligand),
        on_off(state.show_water_ion)
    )
}

fn on_off(visible: bool) -> &'static str {
    if visible { "shown" } else { "hidden" }
}
