use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ValuedPosition;

// Simplified per-asset record kept inside a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAsset {
    pub ticker: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
    pub current_price: Option<BigDecimal>,
}

impl From<&ValuedPosition> for SnapshotAsset {
    fn from(p: &ValuedPosition) -> Self {
        Self {
            ticker: p.ticker.clone(),
            quantity: p.quantity.clone(),
            average_price: p.average_price.clone(),
            current_price: p.current_price.as_available().cloned(),
        }
    }
}

// One persisted valuation per owner per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub owner: String,
    pub date: NaiveDate,
    pub portfolio_value: BigDecimal,
    pub assets: Vec<SnapshotAsset>,
    pub created_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    pub fn new(
        owner: impl Into<String>,
        date: NaiveDate,
        portfolio_value: BigDecimal,
        assets: Vec<SnapshotAsset>,
    ) -> Self {
        Self {
            owner: owner.into(),
            date,
            portfolio_value,
            assets,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotWithChange {
    #[serde(flatten)]
    pub snapshot: PortfolioSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<BigDecimal>,
}

/// Body of a manual history save.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SaveSnapshot {
    pub portfolio_value: Option<BigDecimal>,
    #[serde(default)]
    pub assets: Vec<SnapshotAsset>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HistoryParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
