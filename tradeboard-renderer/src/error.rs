//! Error types for tradeboard-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template loading.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem error while loading a template override.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The override exists but carries none of the placeholder tokens.
    #[error("template at {path} contains no placeholders")]
    NoPlaceholders { path: PathBuf },
}
