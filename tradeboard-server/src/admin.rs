//! `GET /games/admin-games/`: the staff listing and its exports.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use tradeboard_core::{store, FilterParams, GameFilter, GameStats};
use tradeboard_export::{
    csv_export, ExportError, ExportKind, Notice, CSV_FILENAME, MEMBERS_CSV_FILENAME,
};

use crate::error::ServerError;
use crate::state::AppState;

pub const ADMIN_GAMES_PATH: &str = "/games/admin-games/";
pub const ADMIN_USERS_PATH: &str = "/users/admin-users/";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    #[serde(flatten)]
    pub filter: FilterParams,
    #[serde(default)]
    pub export: Option<String>,
}

/// Unset admin key rejects everyone.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ServerError> {
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    match state.admin_key() {
        Some(expected) if !expected.is_empty() && presented == expected => Ok(()),
        _ => Err(ServerError::Forbidden),
    }
}

/// Run blocking pipeline work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(format!("export task failed: {e}")))
}

pub async fn admin_games(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Result<Response, ServerError> {
    authorize(&state, &headers)?;
    let filter = GameFilter::try_from(&query.filter)?;

    let export = match query.export.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ExportKind>().map_err(ServerError::InvalidRequest)?),
    };

    match export {
        None => listing(state, filter).await,
        Some(ExportKind::Csv) => csv(state, filter).await,
        Some(ExportKind::Latex) => labels(state, filter).await,
        Some(ExportKind::Merge) => merge(state).await,
    }
}

/// Stats cover the whole catalogue regardless of the filter.
async fn listing(state: AppState, filter: GameFilter) -> Result<Response, ServerError> {
    let exporter = state.exporter.clone();
    let (games, stats) = blocking(move || -> Result<_, ExportError> {
        let games = exporter.listings(&filter)?;
        let all = store::list_games_at(exporter.home())?;
        Ok((games, GameStats::catalogue(&all, chrono::Utc::now().date_naive())))
    })
    .await??;
    let messages = state.drain_notices();
    Ok(Json(json!({ "messages": messages, "stats": stats, "games": games })).into_response())
}

async fn csv(state: AppState, filter: GameFilter) -> Result<Response, ServerError> {
    let exporter = state.exporter.clone();
    let bytes = blocking(move || exporter.export_csv(&filter)).await??;
    tracing::info!("csv export ({} bytes)", bytes.len());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn labels(state: AppState, filter: GameFilter) -> Result<Response, ServerError> {
    let _guard = state.export_lock().lock().await;
    let exporter = state.exporter.clone();
    match blocking(move || exporter.generate_labels(&filter)).await? {
        Ok(summary) => state.push_notices(summary.messages()),
        Err(e) => {
            tracing::warn!("label generation failed: {e}");
            state.push_notices([Notice::error(e.user_message())]);
        }
    }
    Ok(Redirect::to(ADMIN_GAMES_PATH).into_response())
}

async fn merge(state: AppState) -> Result<Response, ServerError> {
    let _guard = state.export_lock().lock().await;
    let exporter = state.exporter.clone();
    match blocking(move || exporter.merge_labels()).await? {
        Ok(merged) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", merged.filename),
                ),
            ],
            merged.bytes,
        )
            .into_response()),
        Err(e) => {
            if !matches!(e, ExportError::NoInputs) {
                tracing::warn!("merge failed: {e}");
            }
            state.push_notices([Notice::error(e.user_message())]);
            Ok(Redirect::to(ADMIN_GAMES_PATH).into_response())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub export: Option<String>,
}

/// Member roster as JSON, or as `users_export.csv` with `?export=csv`.
pub async fn admin_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UsersQuery>,
) -> Result<Response, ServerError> {
    authorize(&state, &headers)?;
    let exporter = state.exporter.clone();

    match query.export.as_deref().map(str::trim) {
        None | Some("") => {
            let members = blocking(move || -> Result<_, ExportError> {
                let mut members = store::list_members_at(exporter.home())?;
                csv_export::sort_roster(&mut members);
                Ok(members)
            })
            .await??;
            Ok(Json(json!({ "users": members })).into_response())
        }
        Some("csv") => {
            let bytes = blocking(move || exporter.export_members_csv()).await??;
            tracing::info!("member export ({} bytes)", bytes.len());
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{MEMBERS_CSV_FILENAME}\""),
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        Some(other) => Err(ServerError::InvalidRequest(format!(
            "unknown export '{other}' (expected csv)"
        ))),
    }
}
