//! Error types for tradeboard-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::GameId;

/// All errors that can arise from store and settings operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, with the path it happened on.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load. Includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, so we cannot locate `~/.tradeboard/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("member '{0}' not found")]
    MemberNotFound(String),

    /// A record failed validation before it was written.
    #[error("invalid record: {0}")]
    Invalid(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// Permission failures from record edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{0}")]
    Forbidden(&'static str),
}
