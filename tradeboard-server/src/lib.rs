//! HTTP surface: staff listing and exports, honeypot, health check.

pub mod admin;
mod error;
pub mod honeypot;
mod runtime;
mod state;

pub use admin::{ADMIN_GAMES_PATH, ADMIN_KEY_HEADER, ADMIN_USERS_PATH};
pub use error::ServerError;
pub use honeypot::HoneypotAttempt;
pub use runtime::{init_tracing, router, run, start_blocking};
pub use state::{AppState, SharedRunner};
