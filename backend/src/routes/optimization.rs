use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{SharpeRequest, SharpeResponse};
use crate::services::optimizer::PortfolioOptimizer;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sharpe", post(sharpe_ratio))
}

pub async fn sharpe_ratio(
    State(state): State<AppState>,
    Json(req): Json<SharpeRequest>,
) -> Result<Json<SharpeResponse>, AppError> {
    info!("POST /optimizer/sharpe - {} assets", req.weights.len());
    let risk_free_rate = req.risk_free_rate.unwrap_or(state.risk_free_rate);
    let assets = if req.assets.is_empty() {
        (0..req.weights.len()).map(|i| format!("asset_{}", i)).collect()
    } else {
        req.assets
    };

    let result = PortfolioOptimizer::new(assets, req.expected_returns, req.covariance)
        .with_risk_free_rate(risk_free_rate)
        .evaluate(&req.weights)
        .map_err(|e| {
            warn!("Sharpe ratio not computed: {}", e);
            e
        })?;
    Ok(Json(result))
}
