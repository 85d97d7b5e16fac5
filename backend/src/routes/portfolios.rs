use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use chrono::Utc;
use http::StatusCode;
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, LiveValuationResponse, Portfolio, Quoted};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_portfolio))
        .route("/holdings", post(add_holding))
        .route("/live", get(get_live_portfolio))
        .route("/prices", get(get_live_prices))
}

pub async fn add_holding(
    State(state): State<AppState>,
    user: AuthUser,
    Json(data): Json<CreateHolding>,
) -> Result<(StatusCode, Json<Holding>), AppError> {
    info!("POST /portfolio/holdings - Adding holding for {}", user.identity);
    let holding = services::portfolio_service::add_holding(
        state.store.as_ref(),
        &user.identity,
        data,
        &state.base_currency,
    )
    .await
    .map_err(|e| {
        error!("Failed to add holding for {}: {}", user.identity, e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(holding)))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Portfolio>, AppError> {
    info!("GET /portfolio - Fetching portfolio for {}", user.identity);
    let portfolio = services::portfolio_service::get_portfolio(state.store.as_ref(), &user.identity).await?;
    Ok(Json(portfolio))
}

/// Values the portfolio at live prices and records today's snapshot if none exists yet.
pub async fn get_live_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<LiveValuationResponse>, AppError> {
    info!("GET /portfolio/live - Valuing portfolio for {}", user.identity);
    let portfolio = services::portfolio_service::get_portfolio(state.store.as_ref(), &user.identity).await?;

    let valuation = state.valuator.value(&portfolio).await;
    let snapshot_recorded = state
        .snapshotter
        .record_valuation(&user.identity, Utc::now().date_naive(), &valuation)
        .await
        .map_err(|e| {
            error!("Failed to record snapshot for {}: {}", user.identity, e);
            e
        })?;

    Ok(Json(LiveValuationResponse { valuation, snapshot_recorded }))
}

pub async fn get_live_prices(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BTreeMap<String, Quoted<BigDecimal>>>, AppError> {
    info!("GET /portfolio/prices - Fetching live prices for {}", user.identity);
    let portfolio = services::portfolio_service::get_portfolio(state.store.as_ref(), &user.identity).await?;

    let prices = state.valuator.fetch_live_prices(&portfolio.tickers()).await;
    Ok(Json(prices.into_iter().map(|(t, p)| (t, Quoted::from(p))).collect()))
}
