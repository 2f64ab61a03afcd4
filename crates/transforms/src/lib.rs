pub mod catalog;
pub mod context;
pub mod deletion;
pub mod engine;
pub mod identifier;
pub mod pipeline;
pub mod substitution;

pub use catalog::{Group, Mutator, MutatorKind};
pub use context::MutationContext;
pub use engine::{MutationDetails, MutationEngine, apply, enumerate};
pub use identifier::MutationIdentifier;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Transform error type encompassing all mutation engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read.
    #[error("could not read config '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for [`EngineConfig`].
    #[error("invalid engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Core operation failed.
    #[error("core operation failed: {0}")]
    Core(#[from] stackmut_core::Error),

    /// A substitution table breaks one of its invariants.
    #[error("table {table} is inconsistent: {msg}")]
    InvalidTable { table: &'static str, msg: String },

    /// A selection string names no mutator, group or `ALL`.
    #[error("unknown mutator: {0}")]
    UnknownMutator(String),
}

/// Transform result type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for a mutation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Selection strings: display names, global ids, group names or `ALL`.
    pub mutators: Vec<String>,
    /// Leave instructions on lines no test executes alone.
    pub skip_uncovered: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mutators: vec!["ALL".to_string()],
            skip_uncovered: true,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Resolves the selection strings into catalog order without duplicates.
    pub fn resolve(&self) -> Result<Vec<Mutator>> {
        let mut selected = Vec::new();
        for selection in &self.mutators {
            selected.extend(Mutator::from_selection(selection)?);
        }
        Ok(Mutator::ALL
            .into_iter()
            .filter(|mutator| selected.contains(mutator))
            .collect())
    }
}
