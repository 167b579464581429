use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "molstat - load molecular structures and inspect their composition statistics.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to parse files in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load structure files and print per-structure composition statistics.
    Stats(StatsArgs),
    /// Load structure files and list the loaded structures, files and viewer state.
    Info(InfoArgs),
}

/// Arguments shared by every command that loads structures into a session.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Structure files to load (PDB format).
    #[arg(required = true, value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Path to a session configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How to handle files whose name is already loaded: 'reject' or 'suffix' (case-insensitive).
    #[arg(long, value_name = "POLICY")]
    pub id_policy: Option<String>,

    /// Select the uploaded file at this index after loading.
    #[arg(long, value_name = "INDEX")]
    pub select: Option<usize>,

    #[command(flatten)]
    pub viewer: ViewerArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S viewer.atom-size=1.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Overrides for the initial viewer state.
#[derive(Args, Debug, Default, Clone)]
pub struct ViewerArgs {
    /// View mode: cartoon, spacefill, licorice or surface (case-insensitive).
    #[arg(long, value_name = "MODE")]
    pub view_mode: Option<String>,

    /// Color scheme: DEFAULT, CHAIN, RESIDUE, ELEMENT, BFACTOR or SEQUENCE (case-insensitive).
    #[arg(long, value_name = "SCHEME")]
    pub color_scheme: Option<String>,

    /// Atom size between 0.1 and 3.0.
    #[arg(long, value_name = "FLOAT")]
    pub atom_size: Option<f64>,

    /// Show or hide ligands.
    #[arg(long, value_name = "BOOL")]
    pub show_ligand: Option<bool>,

    /// Show or hide waters and ions.
    #[arg(long, value_name = "BOOL")]
    pub show_water_ion: Option<bool>,
}

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Also write chain and residue CSV reports for every structure into this directory.
    #[arg(long, value_name = "DIR")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn stats_command_parses_files_and_overrides() {
        let cli = Cli::parse_from([
            "molstat",
            "-vv",
            "stats",
            "a.pdb",
            "b.pdb",
            "--atom-size",
            "1.5",
            "--show-ligand",
            "false",
            "--csv",
            "out",
        ]);

        assert_eq!(cli.verbose, 2);
        let Commands::Stats(args) = cli.command else {
            panic!("expected stats command");
        };
        assert_eq!(args.load.files.len(), 2);
        assert_eq!(args.load.viewer.atom_size, Some(1.5));
        assert_eq!(args.load.viewer.show_ligand, Some(false));
        assert_eq!(args.csv, Some(PathBuf::from("out")));
    }

    #[test]
    fn enum_flags_document_case_insensitive_matching() {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        let stats = cmd.find_subcommand_mut("stats").unwrap();
        for id in ["view_mode", "color_scheme", "id_policy"] {
            let arg = stats.get_arguments().find(|a| a.get_id() == id).unwrap();
            let help = arg.get_help().unwrap().to_string();
            assert!(help.contains("case-insensitive"), "{id}: {help}");
        }
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["molstat", "info"]).is_err());
    }
}
