//! Per-batch scratch directory.
//!
//! Compiler intermediates never outlive the operation that produced them:
//! [`ScratchDir`] purges them and removes the directory when dropped, on
//! success, failure and unwind alike.

use std::path::Path;

use tempfile::TempDir;

use crate::error::{io_err, ExportError};

/// Extensions the compiler leaves behind for each job.
pub const INTERMEDIATE_EXTENSIONS: [&str; 4] = ["tex", "aux", "log", "out"];

#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `root`, or under the system
    /// temp dir when `root` is `None`.
    pub fn create(root: Option<&Path>) -> Result<Self, ExportError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("tradeboard-");
            b
        };
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
                builder.tempdir_in(root).map_err(|e| io_err(root, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| io_err(std::env::temp_dir(), e))?,
        };
        tracing::debug!("scratch dir {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete every intermediate file currently in the directory. Returns
    /// how many were removed.
    pub fn purge_intermediates(&self) -> usize {
        let Ok(read) = std::fs::read_dir(self.path()) else {
            return 0;
        };
        let mut removed = 0;
        for entry in read.flatten() {
            let path = entry.path();
            let is_intermediate = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| INTERMEDIATE_EXTENSIONS.contains(&ext))
                .unwrap_or(false);
            if is_intermediate && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let removed = self.purge_intermediates();
        tracing::debug!(
            "purged {removed} intermediate files from {}",
            self.path().display()
        );
        // The TempDir field removes the directory itself.
    }
}
