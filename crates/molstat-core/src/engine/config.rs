use super::error::SessionError;
use super::viewer::{ViewerCoordinator, ViewerState, ViewerStateUpdate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid initial viewer state: {0}")]
    Viewer(#[from] SessionError),
}

/// How ingestion treats a file whose name is already used as a structure id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdPolicy {
    /// Keep the file name as the id; a collision rejects the whole batch.
    #[default]
    Reject,
    /// Rename colliding ids to `name (2)`, `name (3)`, ... before committing.
    Suffix,
}

impl FromStr for IdPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(IdPolicy::Reject),
            "suffix" => Ok(IdPolicy::Suffix),
            _ => Err(ConfigError::InvalidParameter {
                name: "id_policy",
                reason: format!("unknown policy '{s}', expected 'reject' or 'suffix'"),
            }),
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IdPolicy::Reject => "reject",
                IdPolicy::Suffix => "suffix",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IngestConfig {
    pub id_policy: IdPolicy,
    /// Upper bound on concurrently running parse tasks; `None` uses the global pool.
    pub max_parallel_parses: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionConfig {
    pub initial_viewer: ViewerState,
    pub ingest: IngestConfig,
}

#[derive(Default)]
pub struct SessionConfigBuilder {
    viewer: ViewerStateUpdate,
    id_policy: Option<IdPolicy>,
    max_parallel_parses: Option<usize>,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides fields of the default initial viewer state. Repeated calls merge.
    pub fn viewer(mut self, update: ViewerStateUpdate) -> Self {
        self.viewer = self.viewer.merge(update);
        self
    }
    pub fn id_policy(mut self, policy: IdPolicy) -> Self {
        self.id_policy = Some(policy);
        self
    }
    pub fn max_parallel_parses(mut self, n: usize) -> Self {
        self.max_parallel_parses = Some(n);
        self
    }

    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let mut viewer = ViewerCoordinator::default();
        viewer.apply(&self.viewer)?;

        if self.max_parallel_parses == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "max_parallel_parses",
                reason: "must be at least 1".into(),
            });
        }

        Ok(SessionConfig {
            initial_viewer: viewer.state().clone(),
            ingest: IngestConfig {
                id_policy: self.id_policy.unwrap_or_default(),
                max_parallel_parses: self.max_parallel_parses,
            },
        })
    }
}
