use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// A recorded quantity of one ticker at a unit cost, owned by one user's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub ticker: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
    pub investment_date: NaiveDate,
    /// Currency the instrument is quoted in. `None` for holdings recorded
    /// before the attribute existed; see `CurrencyNormalizer::currency_of`.
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub owner: String,
    pub holdings: Vec<Holding>,
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            holdings: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        self.holdings.iter().any(|h| h.ticker == ticker)
    }

    /// Distinct tickers in insertion order.
    pub fn tickers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.holdings.len());
        for h in &self.holdings {
            if !out.contains(&h.ticker) {
                out.push(h.ticker.clone());
            }
        }
        out
    }
}

/// Request body for adding a holding.
///
/// Every field is optional at the wire level so that a missing field turns
/// into a `Validation` error instead of a generic extractor rejection.
/// `purchase_price` is accepted for clients written against the older payload.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateHolding {
    pub ticker: Option<String>,
    pub quantity: Option<BigDecimal>,
    #[serde(alias = "purchase_price")]
    pub average_price: Option<BigDecimal>,
    pub investment_date: Option<String>,
    pub currency: Option<String>,
}
