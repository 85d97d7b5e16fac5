pub mod currency_service;
pub mod goal_service;
pub mod history_service;
pub mod market_price_gateway;
pub mod market_service;
pub mod optimizer;
pub mod portfolio_service;
pub mod quote_cache;
pub mod valuation_service;
