pub mod info;
pub mod stats;

use crate::cli::LoadArgs;
use crate::config::PartialSessionConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molstat::core::io::pdb::PdbParser;
use molstat::core::models::structure::RawFile;
use molstat::engine::progress::ProgressReporter;
use molstat::engine::selection::Collection;
use molstat::engine::session::Session;
use molstat::workflows::ingest::{self, IngestFailure, IngestOutcome};
use tracing::{info, warn};

/// Builds a session from `args`, ingests every input file and applies `--select`.
///
/// Parse failures of individual files are printed and tolerated; the command only fails
/// when no file could be loaded at all.
pub fn load_session(args: &LoadArgs, quiet: bool) -> Result<Session> {
    let config = PartialSessionConfig::resolve(args)?;
    let mut session = Session::with_config(config);

    let files = args
        .files
        .iter()
        .map(|path| {
            RawFile::from_path(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Read {} input file(s).", files.len());

    let progress = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let outcome = tokio::task::block_in_place(|| {
        ingest::run(&mut session, files, &PdbParser, &reporter)
    });

    print_failures(outcome.failures());
    match outcome {
        IngestOutcome::NoFiles => {
            return Err(CliError::Argument("no input files were given".into()));
        }
        IngestOutcome::AllFailed { failures } => {
            return Err(CliError::NothingLoaded {
                failed: failures.len(),
            });
        }
        IngestOutcome::Rejected { error, .. } => {
            return Err(error.into());
        }
        IngestOutcome::Committed(report) => {
            info!(
                "Loaded {} structure(s): {}",
                report.committed_ids.len(),
                report.committed_ids.join(", ")
            );
        }
    }

    if let Some(index) = args.select {
        session.set_selected_index(Collection::Files, Some(index))?;
    }

    Ok(session)
}

fn print_failures(failures: &[IngestFailure]) {
    for failure in failures {
        warn!(file = %failure.file_name, "Skipping file that failed to parse.");
        eprintln!("⚠ Skipped '{}': {}", failure.file_name, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use molstat::engine::error::SessionError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    const VALID_PDB: &str = "\
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
END
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn load_args(files: &[PathBuf], extra: &[&str]) -> LoadArgs {
        let mut argv = vec!["molstat".to_string(), "info".to_string()];
        argv.extend(files.iter().map(|p| p.display().to_string()));
        argv.extend(extra.iter().map(|s| s.to_string()));
        match Cli::parse_from(argv).command {
            Commands::Info(args) => args.load,
            Commands::Stats(args) => args.load,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn partial_failure_still_loads_the_valid_files() {
        let dir = tempdir().unwrap();
        let good = write(dir.path(), "good.pdb", VALID_PDB);
        let bad = write(dir.path(), "bad.pdb", "not a structure\n");

        let session = load_session(&load_args(&[good, bad], &[]), true).unwrap();

        assert_eq!(session.structures().len(), 1);
        assert_eq!(session.structures()[0].id, "good.pdb");
        assert_eq!(
            session.selection().map(|s| (s.collection, s.index)),
            Some((Collection::Files, 0))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn all_files_failing_is_nothing_loaded() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.pdb", "");
        let b = write(dir.path(), "b.pdb", "garbage\n");

        let result = load_session(&load_args(&[a, b], &[]), true);

        assert!(matches!(result, Err(CliError::NothingLoaded { failed: 2 })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn select_out_of_range_is_reported() {
        let dir = tempdir().unwrap();
        let good = write(dir.path(), "good.pdb", VALID_PDB);

        let result = load_session(&load_args(&[good], &["--select", "3"]), true);

        assert!(matches!(
            result,
            Err(CliError::Session(SessionError::IndexOutOfRange { index: 3, .. }))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn same_file_name_twice_is_rejected_by_default_and_suffixed_on_request() {
        let dir = tempdir().unwrap();
        let first = write(dir.path(), "same.pdb", VALID_PDB);
        fs::create_dir(dir.path().join("other")).unwrap();
        let second = write(&dir.path().join("other"), "same.pdb", VALID_PDB);
        let files = [first, second];

        let rejected = load_session(&load_args(&files, &[]), true);
        assert!(matches!(
            rejected,
            Err(CliError::Session(SessionError::DuplicateId { .. }))
        ));

        let session = load_session(&load_args(&files, &["--id-policy", "suffix"]), true).unwrap();
        let ids: Vec<&str> = session.structures().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["same.pdb", "same.pdb (2)"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreadable_path_is_a_file_parsing_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.pdb");

        let result = load_session(&load_args(&[missing], &[]), true);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
