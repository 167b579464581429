use crate::cli::{LoadArgs, ViewerArgs};
use crate::error::{CliError, Result};
use molstat::engine::config::{IdPolicy, SessionConfig, SessionConfigBuilder};
use molstat::engine::viewer::{ColorScheme, ViewMode, ViewerStateUpdate};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialViewerConfig {
    view_mode: Option<String>,
    color_scheme: Option<String>,
    atom_size: Option<f64>,
    show_ligand: Option<bool>,
    show_water_ion: Option<bool>,
}

impl PartialViewerConfig {
    /// Fields present in `args` replace the ones loaded from the file.
    fn overlay(&mut self, args: &ViewerArgs) {
        if let Some(mode) = &args.view_mode {
            self.view_mode = Some(mode.clone());
        }
        if let Some(scheme) = &args.color_scheme {
            self.color_scheme = Some(scheme.clone());
        }
        if args.atom_size.is_some() {
            self.atom_size = args.atom_size;
        }
        if args.show_ligand.is_some() {
            self.show_ligand = args.show_ligand;
        }
        if args.show_water_ion.is_some() {
            self.show_water_ion = args.show_water_ion;
        }
    }

    fn into_update(self) -> Result<ViewerStateUpdate> {
        let mut update = ViewerStateUpdate::new();
        if let Some(mode) = self.view_mode {
            update = update.view_mode(mode.parse::<ViewMode>()?);
        }
        if let Some(scheme) = self.color_scheme {
            update = update.color_scheme(scheme.parse::<ColorScheme>()?);
        }
        update.atom_size = self.atom_size;
        update.show_ligand = self.show_ligand;
        update.show_water_ion = self.show_water_ion;
        Ok(update)
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialIngestConfig {
    id_policy: Option<String>,
    max_parallel_parses: Option<usize>,
}

/// A session configuration as read from TOML, where every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSessionConfig {
    viewer: Option<PartialViewerConfig>,
    ingest: Option<PartialIngestConfig>,
}

impl PartialSessionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, if any, and layers the command-line values on top.
    pub fn resolve(args: &LoadArgs) -> Result<SessionConfig> {
        let partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.merge_with_cli(args)
    }

    /// Builds the final [`SessionConfig`]. Precedence, lowest first: defaults, file,
    /// `--set` values, dedicated flags.
    pub fn merge_with_cli(mut self, args: &LoadArgs) -> Result<SessionConfig> {
        self.apply_set_values(&args.set_values)?;

        let mut viewer = self.viewer.take().unwrap_or_default();
        viewer.overlay(&args.viewer);

        let mut ingest = self.ingest.take().unwrap_or_default();
        if let Some(policy) = &args.id_policy {
            ingest.id_policy = Some(policy.clone());
        }

        let mut builder = SessionConfigBuilder::new().viewer(viewer.into_update()?);
        if let Some(policy) = ingest.id_policy {
            let policy = policy
                .parse::<IdPolicy>()
                .map_err(|e| CliError::Config(e.to_string()))?;
            builder = builder.id_policy(policy);
        }
        if let Some(n) = ingest.max_parallel_parses {
            builder = builder.max_parallel_parses(n);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        debug!("Resolved session configuration: {:?}", config);
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "viewer.view-mode" => self.viewer_mut().view_mode = Some(value.to_string()),
                "viewer.color-scheme" => {
                    self.viewer_mut().color_scheme = Some(value.to_string())
                }
                "viewer.atom-size" => self.viewer_mut().atom_size = Some(parse_value(key, value)?),
                "viewer.show-ligand" => {
                    self.viewer_mut().show_ligand = Some(parse_value(key, value)?)
                }
                "viewer.show-water-ion" => {
                    self.viewer_mut().show_water_ion = Some(parse_value(key, value)?)
                }
                "ingest.id-policy" => {
                    self.ingest.get_or_insert_with(Default::default).id_policy =
                        Some(value.to_string())
                }
                "ingest.max-parallel-parses" => {
                    self.ingest
                        .get_or_insert_with(Default::default)
                        .max_parallel_parses = Some(parse_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown or unsupported key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn viewer_mut(&mut self) -> &mut PartialViewerConfig {
        self.viewer.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use molstat::engine::viewer::ViewerState;
    use std::fs;
    use tempfile::tempdir;

    fn load_args(argv: &[&str]) -> LoadArgs {
        let mut full = vec!["molstat", "info", "input.pdb"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Info(args) => args.load,
            Commands::Stats(args) => args.load,
        }
    }

    #[test]
    fn no_file_and_no_flags_gives_defaults() {
        let config = PartialSessionConfig::default()
            .merge_with_cli(&load_args(&[]))
            .unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn file_values_are_applied_and_cli_flags_win() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("molstat.toml");
        fs::write(
            &path,
            r#"
[viewer]
view-mode = "surface"
color-scheme = "chain"
atom-size = 2.0
show-water-ion = true

[ingest]
id-policy = "suffix"
max-parallel-parses = 2
"#,
        )
        .unwrap();

        let args = load_args(&[
            "--config",
            path.to_str().unwrap(),
            "--atom-size",
            "0.5",
            "--view-mode",
            "licorice",
        ]);
        let config = PartialSessionConfig::resolve(&args).unwrap();

        assert_eq!(config.initial_viewer.view_mode, ViewMode::Licorice);
        assert_eq!(config.initial_viewer.color_scheme, ColorScheme::Chain);
        assert_eq!(config.initial_viewer.atom_size, 0.5);
        assert!(config.initial_viewer.show_water_ion);
        assert!(config.initial_viewer.show_ligand);
        assert_eq!(config.ingest.id_policy, IdPolicy::Suffix);
        assert_eq!(config.ingest.max_parallel_parses, Some(2));
    }

    #[test]
    fn set_values_override_file_but_not_flags() {
        let args = load_args(&[
            "-S",
            "viewer.atom-size=2.5",
            "-S",
            "ingest.id-policy=suffix",
            "--id-policy",
            "reject",
        ]);
        let config = PartialSessionConfig::default()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.initial_viewer.atom_size, 2.5);
        assert_eq!(config.ingest.id_policy, IdPolicy::Reject);
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[viewer]\nzoom = 3\n").unwrap();
        assert!(matches!(
            PartialSessionConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn out_of_range_atom_size_is_a_config_error() {
        let args = load_args(&["--atom-size", "4.0"]);
        let result = PartialSessionConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn enum_values_match_case_insensitively() {
        let args = load_args(&["--view-mode", "SURFACE", "--color-scheme", "bfactor"]);
        let config = PartialSessionConfig::default()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.initial_viewer.view_mode, ViewMode::Surface);
        assert_eq!(config.initial_viewer.color_scheme, ColorScheme::BFactor);
    }

    #[test]
    fn unknown_view_mode_is_a_session_error() {
        let args = load_args(&["--view-mode", "wireframe"]);
        let result = PartialSessionConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Session(_))));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["viewer.atom-size", "viewer.zoom=2", "viewer.show-ligand=maybe"] {
            let args = load_args(&["-S", bad]);
            let result = PartialSessionConfig::default().merge_with_cli(&args);
            assert!(matches!(result, Err(CliError::Config(_))), "{bad}");
        }
    }

    #[test]
    fn defaults_match_viewer_state_defaults() {
        let config = PartialSessionConfig::default()
            .merge_with_cli(&load_args(&[]))
            .unwrap();
        assert_eq!(config.initial_viewer, ViewerState::default());
    }
}
