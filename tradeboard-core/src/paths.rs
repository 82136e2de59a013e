use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const HONEYPOT_LOG: &str = "honeypot.jsonl";

pub fn tradeboard_root(home: &Path) -> PathBuf {
    home.join(".tradeboard")
}

pub fn config_path(home: &Path) -> PathBuf {
    tradeboard_root(home).join(CONFIG_FILE)
}

pub fn games_dir(home: &Path) -> PathBuf {
    tradeboard_root(home).join("games")
}

pub fn members_dir(home: &Path) -> PathBuf {
    tradeboard_root(home).join("members")
}

/// Default holding area for compiled label PDFs.
pub fn exports_dir(home: &Path) -> PathBuf {
    tradeboard_root(home).join("exports")
}

pub fn honeypot_log_path(home: &Path) -> PathBuf {
    tradeboard_root(home).join(HONEYPOT_LOG)
}
