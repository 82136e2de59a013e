//! Error types for tradeboard-export.

use std::path::PathBuf;

use thiserror::Error;

use tradeboard_core::StoreError;
use tradeboard_renderer::RenderError;

/// All errors that can escape an export operation.
///
/// Per-game compile failures never appear here; they are recorded in the
/// batch summary instead.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An external tool could not be launched at all.
    #[error("could not run {tool}: {source}")]
    ToolInvocation {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Merge requested while the holding area is empty.
    #[error("no PDF files in the holding area")]
    NoInputs,

    /// The merge tool ran but produced no merged document.
    #[error("merge tool failed (exit status {status:?})")]
    MergeFailed { status: Option<i32> },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Render(#[from] RenderError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    /// Text safe to show an end user. Raw tool output stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NoInputs => {
                "No PDF files found in the exports folder. Please generate PDFs first.".to_string()
            }
            ExportError::MergeFailed { .. } => {
                "Failed to merge PDFs. Please check if pdftk is installed.".to_string()
            }
            ExportError::ToolInvocation { tool, .. } => {
                let name = tool
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "the external tool".to_string());
                format!("Export failed: {name} could not be started.")
            }
            ExportError::Store(StoreError::Invalid(reason)) => format!("Invalid filter: {reason}"),
            _ => "Export failed; see the server log for details.".to_string(),
        }
    }
}

/// Convenience constructor for [`ExportError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.into(),
        source,
    }
}
