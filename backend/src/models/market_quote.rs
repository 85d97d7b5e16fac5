use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Latest trading-day bar for a ticker, cached per (ticker, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MarketQuote {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    #[serde(rename = "price")]
    pub close: BigDecimal,
    pub volume: Option<i64>,
}
