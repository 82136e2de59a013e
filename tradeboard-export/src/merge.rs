//! Merge every held label into one document.
//!
//! A successful merge consumes its inputs: the holding area is emptied of the
//! files that went into the merged PDF. A failed merge leaves it untouched.

use std::ffi::OsString;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::{io_err, ExportError};
use crate::holding::HoldingArea;
use crate::scratch::ScratchDir;
use crate::tool::ToolRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub bytes: Vec<u8>,
    /// `merged_games_<YYYYmmdd_HHMMSS>.pdf`
    pub filename: String,
    /// Holding-area entries that went into the merge, in merge order.
    pub consumed: Vec<String>,
}

pub fn merged_filename(at: DateTime<Local>) -> String {
    format!("merged_games_{}.pdf", at.format("%Y%m%d_%H%M%S"))
}

/// Merge arguments: `<inputs...> cat output <out>`.
pub fn merge_args(inputs: &[std::path::PathBuf], out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = inputs.iter().map(|p| p.clone().into_os_string()).collect();
    args.push(OsString::from("cat"));
    args.push(OsString::from("output"));
    args.push(out.as_os_str().to_os_string());
    args
}

/// Merge the holding area's PDFs in file-name order.
pub fn merge_holding_area<R: ToolRunner + ?Sized>(
    runner: &R,
    merger: &Path,
    holding: &HoldingArea,
    scratch_root: Option<&Path>,
) -> Result<MergeResult, ExportError> {
    let consumed = holding.entries()?;
    if consumed.is_empty() {
        return Err(ExportError::NoInputs);
    }

    let scratch = ScratchDir::create(scratch_root)?;
    let filename = merged_filename(Local::now());
    let out = scratch.path().join(&filename);
    let inputs: Vec<_> = consumed.iter().map(|name| holding.path_for(name)).collect();

    tracing::info!("merging {} PDFs into {filename}", inputs.len());
    let output = runner
        .run(merger, &merge_args(&inputs, &out), None)
        .map_err(|source| ExportError::ToolInvocation {
            tool: merger.to_path_buf(),
            source,
        })?;

    if !output.success() || !out.is_file() {
        tracing::warn!(
            "merge failed with status {:?}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(ExportError::MergeFailed {
            status: output.status,
        });
    }

    let bytes = std::fs::read(&out).map_err(|e| io_err(&out, e))?;

    for name in &consumed {
        if let Err(e) = holding.remove(name) {
            tracing::warn!("could not remove merged input: {e}");
        }
    }
    if let Err(e) = std::fs::remove_file(&out) {
        tracing::warn!("could not remove {}: {e}", out.display());
    }

    tracing::info!("merged {} PDFs ({} bytes)", consumed.len(), bytes.len());
    Ok(MergeResult {
        bytes,
        filename,
        consumed,
    })
}
