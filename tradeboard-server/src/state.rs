use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tradeboard_core::Settings;
use tradeboard_export::{Exporter, Notice, ProcessRunner, ToolRunner};

/// Tool runner shared by every request.
pub type SharedRunner = Arc<dyn ToolRunner + Send + Sync>;

/// Shared application state accessible to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store, settings and tools for every export.
    pub exporter: Arc<Exporter<SharedRunner>>,

    /// Status messages waiting for the next listing request.
    flash: Arc<Mutex<Vec<Notice>>>,

    /// Serializes label generation and merging, the two operations that
    /// touch the holding area.
    export_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(home: impl Into<PathBuf>, settings: Settings) -> Self {
        Self::from_exporter(Exporter::with_runner(
            home,
            settings,
            Arc::new(ProcessRunner) as SharedRunner,
        ))
    }

    pub fn from_exporter(exporter: Exporter<SharedRunner>) -> Self {
        Self {
            exporter: Arc::new(exporter),
            flash: Arc::new(Mutex::new(Vec::new())),
            export_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn home(&self) -> &Path {
        self.exporter.home()
    }

    pub fn admin_key(&self) -> Option<&str> {
        self.exporter.settings().server.admin_key.as_deref()
    }

    pub fn export_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.export_lock
    }

    pub fn push_notices(&self, notices: impl IntoIterator<Item = Notice>) {
        let mut queue = self.flash.lock().unwrap_or_else(|e| e.into_inner());
        queue.extend(notices);
    }

    /// Take every pending notice, oldest first.
    pub fn drain_notices(&self) -> Vec<Notice> {
        let mut queue = self.flash.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *queue)
    }
}
