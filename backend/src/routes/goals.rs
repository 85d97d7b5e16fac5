use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use http::StatusCode;
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CreateGoal, Goal, GoalProgress, InvestmentSuggestion};
use crate::services::goal_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_goal).get(list_goals))
        .route("/progress", get(goal_progress))
        .route("/suggestions", get(investment_suggestions))
}

pub async fn create_goal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<CreateGoal>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    info!("POST /goals - Creating goal for {}", user.identity);
    let goal = goal_service::add_goal(state.store.as_ref(), &user.identity, data)
        .await
        .map_err(|e| {
            error!("Failed to create goal for {}: {}", user.identity, e);
            e
        })?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn list_goals(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Goal>>, AppError> {
    info!("GET /goals - Listing goals for {}", user.identity);
    let goals = goal_service::list_goals(state.store.as_ref(), &user.identity).await?;
    Ok(Json(goals))
}

pub async fn goal_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<GoalProgress>>, AppError> {
    info!("GET /goals/progress - Projecting goals for {}", user.identity);
    let progress = state.projector.progress(&user.identity, Utc::now().date_naive()).await?;
    Ok(Json(progress))
}

pub async fn investment_suggestions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<InvestmentSuggestion>>, AppError> {
    info!("GET /goals/suggestions - Suggesting strategies for {}", user.identity);
    let suggestions = state.projector.suggest(&user.identity, Utc::now().date_naive()).await?;
    Ok(Json(suggestions))
}
