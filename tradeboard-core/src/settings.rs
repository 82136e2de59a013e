//! Runtime settings.
//!
//! Loaded from `<home>/.tradeboard/config.yaml` when present, defaults
//! otherwise, then overridden by `TRADEBOARD_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, StoreError};
use crate::paths;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// External programs the export pipeline shells out to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub pdflatex: PathBuf,
    pub pdftk: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pdflatex: PathBuf::from("pdflatex"),
            pdftk: PathBuf::from("pdftk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Key expected in the `X-Admin-Key` header. Unset disables admin routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_key: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            admin_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Holding area for compiled labels; `<root>/exports` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exports_dir: Option<PathBuf>,
    /// Label template override; the embedded template is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_template: Option<PathBuf>,
    pub tools: ToolPaths,
    pub server: ServerSettings,
}

impl Settings {
    /// Load settings for `home`, applying process environment overrides.
    pub fn load_at(home: &Path) -> Result<Self, StoreError> {
        let mut settings = Self::read_file_at(home)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load settings from `config.yaml` only. Missing file → defaults.
    pub fn read_file_at(home: &Path) -> Result<Self, StoreError> {
        let path = paths::config_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| StoreError::Parse { path, source })
    }

    /// Apply `TRADEBOARD_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("TRADEBOARD_EXPORTS_DIR") {
            self.exports_dir = Some(PathBuf::from(dir));
        }
        if let Some(template) = get("TRADEBOARD_TEMPLATE") {
            self.label_template = Some(PathBuf::from(template));
        }
        if let Some(tool) = get("TRADEBOARD_PDFLATEX") {
            self.tools.pdflatex = PathBuf::from(tool);
        }
        if let Some(tool) = get("TRADEBOARD_PDFTK") {
            self.tools.pdftk = PathBuf::from(tool);
        }
        if let Some(bind) = get("TRADEBOARD_BIND") {
            self.server.bind = bind;
        }
        if let Some(key) = get("TRADEBOARD_ADMIN_KEY") {
            self.server.admin_key = Some(key);
        }
    }

    /// Effective holding area directory.
    pub fn exports_dir(&self, home: &Path) -> PathBuf {
        self.exports_dir
            .clone()
            .unwrap_or_else(|| paths::exports_dir(home))
    }
}
