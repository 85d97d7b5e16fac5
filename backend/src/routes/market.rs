use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::MarketQuote;
use crate::services::market_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_market_data))
        .route("/:ticker", get(get_quote))
}

pub async fn get_quote(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MarketQuote>, AppError> {
    info!("GET /market/{} - Looking up latest quote", ticker);
    let quote = market_service::lookup_quote(state.store.as_ref(), &state.gateway, &ticker)
        .await
        .map_err(|e| {
            error!("Failed to look up {}: {}", ticker, e);
            e
        })?;
    Ok(Json(quote))
}

pub async fn list_market_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketQuote>>, AppError> {
    info!("GET /market - Listing stored market data");
    let quotes = market_service::list_market_data(state.store.as_ref()).await?;
    Ok(Json(quotes))
}
