use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{goals, health, history, market, optimization, portfolios};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/portfolio", portfolios::router())
        .nest("/api/goals", goals::router())
        .nest("/api/history", history::router())
        .nest("/api/market", market::router())
        .nest("/api/optimizer", optimization::router())
        .layer(cors)
        .with_state(state)
}
