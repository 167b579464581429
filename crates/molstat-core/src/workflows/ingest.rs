use crate::core::io::error::ParseError;
use crate::core::io::traits::StructureParser;
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::{LoadedStructure, RawFile, UploadedFileEntry};
use crate::engine::config::IdPolicy;
use crate::engine::error::SessionError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::session::{CommitSummary, Session};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A file that could not be parsed, with the reason.
#[derive(Debug)]
pub struct IngestFailure {
    pub file_name: String,
    pub error: ParseError,
}

/// The result of an ingestion that committed at least one file.
#[derive(Debug)]
pub struct IngestionReport {
    pub commit: CommitSummary,
    /// Ids assigned to the committed structures, in input order.
    pub committed_ids: Vec<String>,
    /// Files that failed to parse, in input order.
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug)]
pub enum IngestOutcome {
    /// The batch was empty; nothing was parsed.
    NoFiles,
    /// Every file failed to parse; the session was not touched.
    AllFailed { failures: Vec<IngestFailure> },
    /// The session refused the commit, e.g. a duplicate id under [`IdPolicy::Reject`].
    /// Nothing was committed; parse failures of the batch are still reported.
    Rejected {
        error: SessionError,
        failures: Vec<IngestFailure>,
    },
    /// The successful subset was committed as one batch.
    Committed(IngestionReport),
}

impl IngestOutcome {
    pub fn failures(&self) -> &[IngestFailure] {
        match self {
            IngestOutcome::NoFiles => &[],
            IngestOutcome::AllFailed { failures } => failures,
            IngestOutcome::Rejected { failures, .. } => failures,
            IngestOutcome::Committed(report) => &report.failures,
        }
    }
}

type ParsedFile = (RawFile, Result<Molecule, ParseError>);

/// Parses a batch of raw files and commits the successful subset to the session.
///
/// Files are parsed independently, concurrently when the `parallel` feature is enabled.
/// The session is not touched until every parse task has settled. Parse failures are
/// collected and never abort the other files. When at least one file succeeds, exactly one
/// structure batch and one file batch are committed, in input order, and the first file
/// is selected if nothing was selected before.
///
/// The exclusive borrow of `session` rules out overlapping ingestions into one session;
/// callers queue batches instead.
///
/// A commit the session refuses, such as a colliding id under [`IdPolicy::Reject`], yields
/// [`IngestOutcome::Rejected`] carrying both the session error and the parse failures; the
/// session is unchanged in that case.
#[instrument(skip_all, name = "ingest_workflow", fields(files = files.len()))]
pub fn run<P>(
    session: &mut Session,
    files: Vec<RawFile>,
    parser: &P,
    reporter: &ProgressReporter,
) -> IngestOutcome
where
    P: StructureParser + ?Sized,
{
    if files.is_empty() {
        info!("No files submitted for ingestion.");
        return IngestOutcome::NoFiles;
    }

    reporter.report(Progress::PhaseStart { name: "Parsing" });
    let parsed = parse_all(
        files,
        parser,
        reporter,
        session.config().ingest.max_parallel_parses,
    );
    reporter.report(Progress::PhaseFinish);

    let (successes, failures) = partition(parsed);
    for failure in &failures {
        warn!(file = %failure.file_name, error = %failure.error, "Failed to parse file.");
    }

    if successes.is_empty() {
        warn!(
            failed = failures.len(),
            "No files were parsed successfully; nothing committed."
        );
        return IngestOutcome::AllFailed { failures };
    }

    let ids = assign_ids(session, &successes, session.config().ingest.id_policy);

    let mut structures = Vec::with_capacity(successes.len());
    let mut entries = Vec::with_capacity(successes.len());
    for ((file, molecule), id) in successes.into_iter().zip(&ids) {
        let molecule = Arc::new(molecule);
        let raw_data = file.text().ok().map(str::to_owned);
        structures.push(LoadedStructure::from_file(
            id.clone(),
            file.name.clone(),
            molecule.clone(),
            raw_data,
        ));
        entries.push(UploadedFileEntry::new(file, Some(molecule)));
    }

    let commit = match session.commit_ingested(structures, entries) {
        Ok(commit) => commit,
        Err(error) => {
            warn!(%error, failed = failures.len(), "Session rejected the ingestion batch.");
            return IngestOutcome::Rejected { error, failures };
        }
    };
    reporter.report(Progress::Message(format!(
        "Committed {} structure(s), {} failed.",
        ids.len(),
        failures.len()
    )));
    info!(
        succeeded = ids.len(),
        failed = failures.len(),
        auto_selected = commit.auto_selected,
        "Ingestion committed."
    );

    IngestOutcome::Committed(IngestionReport {
        commit,
        committed_ids: ids,
        failures,
    })
}

fn parse_one<P>(file: RawFile, parser: &P, reporter: &ProgressReporter) -> ParsedFile
where
    P: StructureParser + ?Sized,
{
    let result = parser.parse(&file);
    reporter.report(Progress::FileSettled {
        name: file.name.clone(),
        succeeded: result.is_ok(),
    });
    (file, result)
}

#[cfg(not(feature = "parallel"))]
fn parse_all<P>(
    files: Vec<RawFile>,
    parser: &P,
    reporter: &ProgressReporter,
    _max_parallel: Option<usize>,
) -> Vec<ParsedFile>
where
    P: StructureParser + ?Sized,
{
    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });
    let parsed = files
        .into_iter()
        .map(|file| parse_one(file, parser, reporter))
        .collect();
    reporter.report(Progress::TaskFinish);
    parsed
}

#[cfg(feature = "parallel")]
fn parse_all<P>(
    files: Vec<RawFile>,
    parser: &P,
    reporter: &ProgressReporter,
    max_parallel: Option<usize>,
) -> Vec<ParsedFile>
where
    P: StructureParser + ?Sized,
{
    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });

    let run_batch = |files: Vec<RawFile>| -> Vec<ParsedFile> {
        files
            .into_par_iter()
            .map(|file| parse_one(file, parser, reporter))
            .collect()
    };

    let parsed = match max_parallel {
        Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(|| run_batch(files)),
            Err(e) => {
                warn!(error = %e, "Failed to build parse thread pool; using the global pool.");
                run_batch(files)
            }
        },
        None => run_batch(files),
    };

    reporter.report(Progress::TaskFinish);
    parsed
}

fn partition(parsed: Vec<ParsedFile>) -> (Vec<(RawFile, Molecule)>, Vec<IngestFailure>) {
    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for (file, result) in parsed {
        match result {
            Ok(molecule) => successes.push((file, molecule)),
            Err(error) => failures.push(IngestFailure {
                file_name: file.name,
                error,
            }),
        }
    }
    (successes, failures)
}

fn assign_ids(
    session: &Session,
    successes: &[(RawFile, Molecule)],
    policy: IdPolicy,
) -> Vec<String> {
    match policy {
        IdPolicy::Reject => successes.iter().map(|(f, _)| f.name.clone()).collect(),
        IdPolicy::Suffix => {
            let mut taken: HashSet<String> =
                session.structures().iter().map(|s| s.id.clone()).collect();
            successes
                .iter()
                .map(|(file, _)| {
                    let id = next_free_id(&file.name, &taken);
                    taken.insert(id.clone());
                    id
                })
                .collect()
        }
    }
}

fn next_free_id(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbParser;
    use crate::core::models::atom::Atom;
    use crate::engine::config::SessionConfigBuilder;
    use crate::engine::selection::{Collection, Selection};
    use std::sync::Mutex;

    fn fake_parser(file: &RawFile) -> Result<Molecule, ParseError> {
        if file.name.starts_with("bad") {
            return Err(ParseError::Rejected(format!("cannot read {}", file.name)));
        }
        let atoms = file.bytes.len().max(1);
        Ok(Molecule::new(
            (0..atoms)
                .map(|i| Atom::new("C", "ALA", i as isize, "A"))
                .collect(),
        ))
    }

    fn raw(name: &str) -> RawFile {
        RawFile::new(name, "xy")
    }

    fn committed(outcome: IngestOutcome) -> IngestionReport {
        match outcome {
            IngestOutcome::Committed(report) => report,
            other => panic!("expected a commit, got {:?}", other),
        }
    }

    #[test]
    fn partial_failure_commits_successes_in_input_order() {
        let mut session = Session::new();
        let files = vec![raw("one.pdb"), raw("bad-two.pdb"), raw("three.pdb")];

        let outcome = run(&mut session, files, &fake_parser, &ProgressReporter::new());
        let report = committed(outcome);

        let ids: Vec<&str> = session.structures().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["one.pdb", "three.pdb"]);
        let names: Vec<&str> = session.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["one.pdb", "three.pdb"]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file_name, "bad-two.pdb");
        assert_eq!(report.committed_ids, vec!["one.pdb", "three.pdb"]);
        assert_eq!(
            session.selection(),
            Some(Selection::new(Collection::Files, 0))
        );
        assert!(report.commit.auto_selected);
    }

    #[test]
    fn all_failed_batch_leaves_session_untouched() {
        let mut session = Session::new();
        session.add_job_structure("job", "Job").unwrap();
        session
            .set_selected_index(Collection::Structures, Some(0))
            .unwrap();

        let files = vec![raw("bad-1.pdb"), raw("bad-2.pdb")];
        let outcome = run(&mut session, files, &fake_parser, &ProgressReporter::new());

        match outcome {
            IngestOutcome::AllFailed { failures } => assert_eq!(failures.len(), 2),
            other => panic!("expected AllFailed, got {:?}", other),
        }
        assert_eq!(session.structures().len(), 1);
        assert!(session.files().is_empty());
        assert_eq!(
            session.selection(),
            Some(Selection::new(Collection::Structures, 0))
        );
    }

    #[test]
    fn empty_batch_is_distinct_from_total_failure() {
        let mut session = Session::new();
        let outcome = run(&mut session, vec![], &fake_parser, &ProgressReporter::new());
        assert!(matches!(outcome, IngestOutcome::NoFiles));
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn existing_selection_is_not_overridden() {
        let mut session = Session::new();
        run(&mut session, vec![raw("a.pdb"), raw("b.pdb")], &fake_parser, &ProgressReporter::new());
        session.set_selected_index(Collection::Files, Some(1)).unwrap();

        let report = committed(
            run(&mut session, vec![raw("c.pdb")], &fake_parser, &ProgressReporter::new()),
        );

        assert!(!report.commit.auto_selected);
        assert_eq!(report.commit.files, 2..3);
        assert_eq!(session.registry().selected_index(Collection::Files), Some(1));
    }

    #[test]
    fn colliding_name_rejects_batch_under_reject_policy() {
        let mut session = Session::new();
        run(&mut session, vec![raw("a.pdb")], &fake_parser, &ProgressReporter::new());

        let outcome = run(
            &mut session,
            vec![raw("b.pdb"), raw("a.pdb")],
            &fake_parser,
            &ProgressReporter::new(),
        );

        assert!(matches!(
            outcome,
            IngestOutcome::Rejected { error: SessionError::DuplicateId { ref id }, .. } if id == "a.pdb"
        ));
        assert_eq!(session.structures().len(), 1);
        assert_eq!(session.files().len(), 1);
    }

    #[test]
    fn rejected_commit_still_reports_parse_failures() {
        let mut session = Session::new();
        run(&mut session, vec![raw("a.pdb")], &fake_parser, &ProgressReporter::new());

        let outcome = run(
            &mut session,
            vec![raw("a.pdb"), raw("bad.pdb")],
            &fake_parser,
            &ProgressReporter::new(),
        );

        match &outcome {
            IngestOutcome::Rejected { error, failures } => {
                assert_eq!(
                    *error,
                    SessionError::DuplicateId {
                        id: "a.pdb".to_string()
                    }
                );
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].file_name, "bad.pdb");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(session.files().len(), 1);
    }

    #[test]
    fn colliding_names_are_suffixed_under_suffix_policy() {
        let config = SessionConfigBuilder::new()
            .id_policy(IdPolicy::Suffix)
            .build()
            .unwrap();
        let mut session = Session::with_config(config);
        run(&mut session, vec![raw("a.pdb")], &fake_parser, &ProgressReporter::new());

        let report = committed(
            run(
                &mut session,
                vec![raw("a.pdb"), raw("a.pdb")],
                &fake_parser,
                &ProgressReporter::new(),
            ),
        );

        assert_eq!(report.committed_ids, vec!["a.pdb (2)", "a.pdb (3)"]);
        assert!(session.structures().iter().all(|s| s.name == "a.pdb"));
    }

    #[test]
    fn bounded_parallelism_still_commits_everything() {
        let config = SessionConfigBuilder::new()
            .max_parallel_parses(1)
            .build()
            .unwrap();
        let mut session = Session::with_config(config);
        let files = (0..8).map(|i| raw(&format!("f{i}.pdb"))).collect();

        let report = committed(
            run(&mut session, files, &fake_parser, &ProgressReporter::new()),
        );

        assert_eq!(report.committed_ids.len(), 8);
        assert_eq!(session.structures()[7].id, "f7.pdb");
    }

    #[test]
    fn progress_reports_every_settled_file() {
        let mut session = Session::new();
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            if let Progress::FileSettled { name, succeeded } = p {
                seen.lock().unwrap().push((name, succeeded));
            }
        }));

        run(&mut session, vec![raw("a.pdb"), raw("bad.pdb")], &fake_parser, &reporter);
        drop(reporter);

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(
            seen,
            vec![("a.pdb".to_string(), true), ("bad.pdb".to_string(), false)]
        );
    }

    #[test]
    fn structures_and_files_share_one_molecule() {
        let mut session = Session::new();
        run(&mut session, vec![raw("a.pdb")], &fake_parser, &ProgressReporter::new());

        let structure = session.structures()[0].molecule.as_ref().unwrap();
        let file = session.files()[0].molecule.as_ref().unwrap();
        assert!(Arc::ptr_eq(structure, file));
        assert_eq!(session.structures()[0].raw_data.as_deref(), Some("xy"));
    }

    #[test]
    fn pdb_parser_ingests_real_records() {
        let mut session = Session::new();
        let content = "\
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
HETATM    2  O   HOH A 101      10.000   5.000  -3.000  1.00  0.00           O
END
";
        let files = vec![RawFile::new("1abc.pdb", content), RawFile::new("junk.pdb", "")];

        let report = committed(
            run(&mut session, files, &PdbParser, &ProgressReporter::new()),
        );

        assert_eq!(report.failures.len(), 1);
        let stats = session.structure_stats();
        assert_eq!(stats[0].stats.total_atoms, 2);
        assert_eq!(stats[0].stats.water_count, 1);
    }

    #[test]
    fn next_free_id_skips_taken_suffixes() {
        let taken: HashSet<String> = ["x", "x (2)"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_free_id("x", &taken), "x (3)");
        assert_eq!(next_free_id("y", &taken), "y");
    }
}
