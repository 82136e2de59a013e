//! The holding area: the persistent directory where compiled labels wait
//! until a merge consumes them.
//!
//! Entries are `game_<id>_<safe-name>.pdf`. The id prefix keeps names
//! unique per record; the sanitized name keeps them readable and safe on
//! any filesystem.

use std::path::{Path, PathBuf};

use tradeboard_core::types::GameId;

use crate::error::{io_err, ExportError};

pub const PDF_EXTENSION: &str = "pdf";

/// Reduce `name` to ASCII alphanumerics, `-` and `_`.
///
/// Spaces survive long enough to trim trailing whitespace, then become
/// underscores. Everything else is dropped.
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().replace(' ', "_")
}

/// Job name for a game: `game_<id>_<safe-name>`, no extension.
pub fn job_name(id: GameId, name: &str) -> String {
    format!("game_{}_{}", id, sanitize_name(name))
}

/// File name the compiled label is stored under.
pub fn entry_name(id: GameId, name: &str) -> String {
    format!("{}.{}", job_name(id, name), PDF_EXTENSION)
}

// ---------------------------------------------------------------------------
// HoldingArea
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingArea {
    dir: PathBuf,
}

impl HoldingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// File names of every `.pdf` currently held, lexicographically sorted.
    /// The extension match is exact; `.PDF` files are left alone.
    ///
    /// A missing directory is an empty holding area.
    pub fn entries(&self) -> Result<Vec<String>, ExportError> {
        let read = match std::fs::read_dir(&self.dir) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_pdf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == PDF_EXTENSION)
                .unwrap_or(false);
            if !is_pdf {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Move `source` into the holding area as `name`, replacing any entry of
    /// the same name.
    ///
    /// Falls back to copy-then-remove when a rename is impossible, e.g.
    /// across filesystems.
    pub fn admit(&self, source: &Path, name: &str) -> Result<PathBuf, ExportError> {
        self.ensure()?;
        let target = self.path_for(name);
        if std::fs::rename(source, &target).is_ok() {
            return Ok(target);
        }
        std::fs::copy(source, &target).map_err(|e| io_err(&target, e))?;
        if let Err(e) = std::fs::remove_file(source) {
            tracing::debug!("could not remove {} after copy: {e}", source.display());
        }
        Ok(target)
    }

    pub fn remove(&self, name: &str) -> Result<(), ExportError> {
        let path = self.path_for(name);
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_drops_punctuation_and_underscores_spaces() {
        assert_eq!(sanitize_name("Catan: Seafarers!"), "Catan_Seafarers");
        assert_eq!(sanitize_name("7 Wonders - Duel "), "7_Wonders_-_Duel");
        assert_eq!(sanitize_name("Ticket_to_Ride"), "Ticket_to_Ride");
    }

    #[test]
    fn sanitize_drops_non_ascii() {
        assert_eq!(sanitize_name("Café Crème"), "Caf_Crme");
    }

    #[test]
    fn job_name_prefixes_id() {
        assert_eq!(job_name(GameId(12), "Azul"), "game_12_Azul");
        assert_eq!(entry_name(GameId(12), "Azul"), "game_12_Azul.pdf");
    }

    #[test]
    fn missing_dir_has_no_entries() {
        let tmp = TempDir::new().unwrap();
        let area = HoldingArea::new(tmp.path().join("exports"));
        assert!(area.entries().unwrap().is_empty());
    }

    #[test]
    fn entries_are_sorted_lowercase_pdfs_only() {
        let tmp = TempDir::new().unwrap();
        let area = HoldingArea::new(tmp.path());
        for name in ["game_2_b.pdf", "game_10_a.pdf", "notes.txt", "game_1_c.PDF"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(tmp.path().join("nested.pdf")).unwrap();

        assert_eq!(
            area.entries().unwrap(),
            vec!["game_10_a.pdf", "game_2_b.pdf"]
        );
        assert!(tmp.path().join("game_1_c.PDF").exists());
    }

    #[test]
    fn admit_moves_and_replaces() {
        let tmp = TempDir::new().unwrap();
        let area = HoldingArea::new(tmp.path().join("exports"));
        let src = tmp.path().join("job.pdf");

        std::fs::write(&src, b"first").unwrap();
        area.admit(&src, "game_1_x.pdf").unwrap();
        std::fs::write(&src, b"second").unwrap();
        let held = area.admit(&src, "game_1_x.pdf").unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read(held).unwrap(), b"second");
        assert_eq!(area.entries().unwrap(), vec!["game_1_x.pdf"]);
    }
}
