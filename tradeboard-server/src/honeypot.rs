//! Fake admin login that records whoever knocks.
//!
//! Attempts are appended, one JSON object per line, to
//! `<home>/.tradeboard/honeypot.jsonl`. Passwords are never stored.

use std::io::{BufRead, Write};
use std::net::SocketAddr;
use std::path::Path;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    Form,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradeboard_core::paths;

use crate::error::{io_err, ServerError};
use crate::state::AppState;

const LOGIN_PAGE: &str = include_str!("templates/admin_login.html");
const ERROR_SLOT: &str = "<!-- error -->";
pub const LOGIN_ERROR: &str =
    "Please enter the correct username and password for a staff account.";
const SHORT_USER_AGENT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneypotAttempt {
    pub ip_address: String,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_login_attempt: bool,
}

impl HoneypotAttempt {
    /// First 50 characters of the user agent, with `...` when cut.
    pub fn short_user_agent(&self) -> String {
        if self.user_agent.chars().count() > SHORT_USER_AGENT {
            let head: String = self.user_agent.chars().take(SHORT_USER_AGENT).collect();
            format!("{head}...")
        } else {
            self.user_agent.clone()
        }
    }
}

impl std::fmt::Display for HoneypotAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = if self.is_login_attempt {
            "Login attempt"
        } else {
            "Page access"
        };
        write!(f, "{action} from {} at {}", self.ip_address, self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Append one attempt to the honeypot log.
pub fn record_at(home: &Path, attempt: &HoneypotAttempt) -> Result<(), ServerError> {
    let path = paths::honeypot_log_path(home);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let mut line = serde_json::to_string(attempt)?;
    line.push('\n');

    let mut options = std::fs::OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path).map_err(|e| io_err(&path, e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| io_err(&path, e))
}

/// Every recorded attempt, newest first. Unreadable lines are skipped.
pub fn load_at(home: &Path) -> Result<Vec<HoneypotAttempt>, ServerError> {
    let path = paths::honeypot_log_path(home);
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(&path, e)),
    };
    let mut attempts = Vec::new();
    for line in std::io::BufReader::new(file).lines() {
        let line = line.map_err(|e| io_err(&path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HoneypotAttempt>(&line) {
            Ok(attempt) => attempts.push(attempt),
            Err(e) => tracing::debug!("skipping honeypot line: {e}"),
        }
    }
    attempts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(attempts)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: Option<String>,
}

fn login_page(error: Option<&str>) -> Html<String> {
    let slot = error
        .map(|msg| format!("<p class=\"errornote\">{msg}</p>"))
        .unwrap_or_default();
    Html(LOGIN_PAGE.replace(ERROR_SLOT, &slot))
}

fn client(connect: Option<ConnectInfo<SocketAddr>>, headers: &HeaderMap) -> (String, String) {
    let ip = connect
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    (ip, user_agent)
}

fn persist(state: &AppState, attempt: &HoneypotAttempt) {
    if let Err(e) = record_at(state.home(), attempt) {
        tracing::error!("could not record honeypot attempt: {e}");
    }
}

pub async fn page(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let (ip_address, user_agent) = client(connect, &headers);
    tracing::warn!("honeypot accessed by IP: {ip_address}, User-Agent: {user_agent}");
    persist(
        &state,
        &HoneypotAttempt {
            ip_address,
            user_agent,
            username: None,
            timestamp: Utc::now(),
            is_login_attempt: false,
        },
    );
    login_page(None)
}

pub async fn login(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Option<Form<LoginForm>>,
) -> impl IntoResponse {
    let (ip_address, user_agent) = client(connect, &headers);
    let username = form
        .and_then(|Form(f)| f.username)
        .filter(|u| !u.is_empty());
    tracing::warn!(
        "honeypot login attempt - IP: {ip_address}, User-Agent: {user_agent}, Username: {}",
        username.as_deref().unwrap_or("")
    );
    persist(
        &state,
        &HoneypotAttempt {
            ip_address,
            user_agent,
            username,
            timestamp: Utc::now(),
            is_login_attempt: true,
        },
    );
    login_page(Some(LOGIN_ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn attempt(agent: &str, at: &str) -> HoneypotAttempt {
        HoneypotAttempt {
            ip_address: "203.0.113.9".to_string(),
            user_agent: agent.to_string(),
            username: None,
            timestamp: DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc),
            is_login_attempt: false,
        }
    }

    #[test]
    fn short_user_agent_truncates_at_fifty() {
        let long = "x".repeat(60);
        assert_eq!(
            attempt(&long, "2024-01-01T00:00:00Z").short_user_agent(),
            format!("{}...", "x".repeat(50))
        );
        assert_eq!(
            attempt("curl/8.0", "2024-01-01T00:00:00Z").short_user_agent(),
            "curl/8.0"
        );
    }

    #[test]
    fn log_round_trip_is_newest_first() {
        let home = TempDir::new().unwrap();
        record_at(home.path(), &attempt("a", "2024-01-01T00:00:00Z")).unwrap();
        record_at(home.path(), &attempt("b", "2024-02-01T00:00:00Z")).unwrap();

        let loaded = load_at(home.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].user_agent, "b");
        assert_eq!(
            loaded[1].to_string(),
            "Page access from 203.0.113.9 at 2024-01-01 00:00:00 UTC"
        );
    }

    #[test]
    fn missing_log_is_empty() {
        let home = TempDir::new().unwrap();
        assert!(load_at(home.path()).unwrap().is_empty());
    }

    #[test]
    fn error_slot_is_filled_only_on_login() {
        assert!(!login_page(None).0.contains(LOGIN_ERROR));
        assert!(login_page(Some(LOGIN_ERROR)).0.contains(LOGIN_ERROR));
    }
}
