pub mod alphavantage;
pub mod fx_provider;
pub mod multi_provider;
pub mod price_provider;
pub mod yahoofinance;
