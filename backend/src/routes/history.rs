use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{HistoryParams, SaveSnapshot, SnapshotWithChange};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_history).post(save_snapshot))
}

pub async fn get_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<SnapshotWithChange>>, AppError> {
    info!("GET /history - {} from {:?} to {:?}", user.identity, params.from, params.to);
    let history = state
        .snapshotter
        .get_range_with_changes(&user.identity, params.from, params.to)
        .await?;
    Ok(Json(history))
}

pub async fn save_snapshot(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<SaveSnapshot>,
) -> Result<Json<Value>, AppError> {
    info!("POST /history - Saving snapshot for {}", user.identity);
    let portfolio_value = data
        .portfolio_value
        .ok_or_else(|| AppError::Validation("portfolio_value is required".to_string()))?;

    let today = Utc::now().date_naive();
    let inserted = state
        .snapshotter
        .record_if_absent(&user.identity, today, portfolio_value, data.assets)
        .await
        .map_err(|e| {
            error!("Failed to save snapshot for {}: {}", user.identity, e);
            e
        })?;

    let message = if inserted {
        "Portfolio history saved"
    } else {
        "Portfolio history already recorded for today"
    };
    Ok(Json(json!({ "message": message, "date": today, "inserted": inserted })))
}
