use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// One daily bar as returned by a market-data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

impl ExternalPricePoint {
    /// Bar where only the close is known.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }
}

/// Lookback that covers the most recent trading day (weekends and holidays included).
pub const LATEST_TRADING_DAY: u32 = 1;
/// Lookback used by the market-growth heuristic.
pub const FIVE_YEARS: u32 = 5 * 365;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("symbol not found")]
    NotFound,

    #[error("provider timed out")]
    Timeout,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily bars for `ticker` covering roughly the last `days` calendar days,
    /// ascending by date.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError>;
}
