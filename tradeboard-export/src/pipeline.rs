//! Shared export entrypoint used by CLI and server.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tradeboard_core::{store, FileStore, GameFilter, GameStore, Listing, Settings};
use tradeboard_renderer::LabelTemplate;

use crate::batch::{run_batch, BatchOptions, BatchSummary};
use crate::csv_export;
use crate::error::ExportError;
use crate::holding::HoldingArea;
use crate::merge::{merge_holding_area, MergeResult};
use crate::tool::{ProcessRunner, ToolRunner};

/// Which export an admin asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Latex,
    Merge,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportKind::Csv),
            "latex" => Ok(ExportKind::Latex),
            "merge" => Ok(ExportKind::Merge),
            other => Err(format!("unknown export '{other}' (expected csv, latex or merge)")),
        }
    }
}

/// Export operations over one home directory and its settings.
#[derive(Debug, Clone)]
pub struct Exporter<R = ProcessRunner> {
    store: FileStore,
    settings: Settings,
    runner: R,
    scratch_root: Option<PathBuf>,
}

impl Exporter<ProcessRunner> {
    pub fn new(home: impl Into<PathBuf>, settings: Settings) -> Self {
        Self::with_runner(home, settings, ProcessRunner)
    }
}

impl<R: ToolRunner> Exporter<R> {
    pub fn with_runner(home: impl Into<PathBuf>, settings: Settings, runner: R) -> Self {
        Self {
            store: FileStore::new(home),
            settings,
            runner,
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn home(&self) -> &Path {
        self.store.home()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn holding_area(&self) -> HoldingArea {
        HoldingArea::new(self.settings.exports_dir(self.home()))
    }

    pub fn listings(&self, filter: &GameFilter) -> Result<Vec<Listing>, ExportError> {
        Ok(self.store.listings(filter)?)
    }

    pub fn export_csv(&self, filter: &GameFilter) -> Result<Vec<u8>, ExportError> {
        csv_export::to_csv_bytes(&self.listings(filter)?)
    }

    /// The member roster, newest joined first.
    pub fn export_members_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut members = store::list_members_at(self.home())?;
        csv_export::sort_roster(&mut members);
        csv_export::members_to_csv_bytes(&members)
    }

    /// Generate labels for every game matching `filter`, newest first.
    pub fn generate_labels(&self, filter: &GameFilter) -> Result<BatchSummary, ExportError> {
        let template = LabelTemplate::load(self.settings.label_template.as_deref())?;
        let games: Vec<_> = self
            .listings(filter)?
            .into_iter()
            .map(|listing| listing.game)
            .collect();
        let options = BatchOptions {
            compiler: self.settings.tools.pdflatex.clone(),
            scratch_root: self.scratch_root.clone(),
        };
        run_batch(
            &self.store,
            &self.runner,
            &template,
            &games,
            &self.holding_area(),
            &options,
        )
    }

    pub fn merge_labels(&self) -> Result<MergeResult, ExportError> {
        merge_holding_area(
            &self.runner,
            &self.settings.tools.pdftk,
            &self.holding_area(),
            self.scratch_root.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_kind_parses_known_values() {
        assert_eq!("csv".parse::<ExportKind>(), Ok(ExportKind::Csv));
        assert_eq!("latex".parse::<ExportKind>(), Ok(ExportKind::Latex));
        assert_eq!("merge".parse::<ExportKind>(), Ok(ExportKind::Merge));
        assert!("pdf".parse::<ExportKind>().is_err());
    }

    #[test]
    fn holding_area_follows_settings() {
        let home = TempDir::new().unwrap();
        let default = Exporter::new(home.path(), Settings::default());
        assert_eq!(
            default.holding_area().dir(),
            home.path().join(".tradeboard").join("exports")
        );

        let settings = Settings {
            exports_dir: Some(home.path().join("labels")),
            ..Settings::default()
        };
        let custom = Exporter::new(home.path(), settings);
        assert_eq!(custom.holding_area().dir(), home.path().join("labels"));
    }

    #[test]
    fn empty_home_generates_nothing() {
        let home = TempDir::new().unwrap();
        let summary = Exporter::new(home.path(), Settings::default())
            .generate_labels(&GameFilter::default())
            .unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn empty_home_has_nothing_to_merge() {
        let home = TempDir::new().unwrap();
        let err = Exporter::new(home.path(), Settings::default())
            .merge_labels()
            .unwrap_err();
        assert!(matches!(err, ExportError::NoInputs));
    }
}
