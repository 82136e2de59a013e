use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use tradeboard_core::Settings;

use crate::admin::{self, ADMIN_GAMES_PATH, ADMIN_USERS_PATH};
use crate::error::{io_err, ServerError};
use crate::honeypot;
use crate::state::AppState;

/// All routes, wired to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(ADMIN_GAMES_PATH, get(admin::admin_games))
        .route(ADMIN_USERS_PATH, get(admin::admin_users))
        .route("/admin/", get(honeypot::page).post(honeypot::login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Start the server and block the current thread until it exits.
pub fn start_blocking(home: &Path, settings: Settings) -> Result<(), ServerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf(), settings))
}

/// Serve until ctrl-c.
pub async fn run(home: PathBuf, settings: Settings) -> Result<(), ServerError> {
    let bind = settings.server.bind.clone();
    if settings.server.admin_key.as_deref().unwrap_or("").is_empty() {
        tracing::warn!("no admin key configured; {ADMIN_GAMES_PATH} will reject every request");
    }

    let state = AppState::new(home, settings);
    let holding = state.exporter.holding_area();
    holding.ensure()?;
    tracing::info!("holding area at {}", holding.dir().display());

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind.clone(),
            source,
        })?;
    tracing::info!("listening on {bind}");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| io_err(bind, e))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down server"),
        Err(err) => tracing::error!("ctrl-c handler failed: {err}"),
    }
}

/// Initialise `tracing` once; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
