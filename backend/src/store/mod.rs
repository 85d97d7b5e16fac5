use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::StoreError;
use crate::models::{Goal, Holding, MarketQuote, Portfolio, PortfolioSnapshot};

pub mod memory;
pub mod postgres;

/// The document store behind every component.
///
/// One instance is built at start-up and shared through `AppState`.
/// Both uniqueness rules (one holding per owner and ticker, one snapshot per
/// owner and day) are enforced by the backend in a single conditional write.
#[async_trait]
pub trait Store: Send + Sync {
    /// Appends `holding` to the owner's portfolio, creating the portfolio if needed.
    /// Returns `false` and leaves the portfolio unchanged when the ticker is already held.
    async fn insert_holding(&self, owner: &str, holding: &Holding) -> Result<bool, StoreError>;

    async fn fetch_portfolio(&self, owner: &str) -> Result<Option<Portfolio>, StoreError>;

    async fn insert_goal(&self, goal: &Goal) -> Result<(), StoreError>;

    async fn fetch_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError>;

    /// Insert or replace the bar for `(ticker, date)`.
    async fn upsert_market_quote(&self, quote: &MarketQuote) -> Result<(), StoreError>;

    async fn fetch_market_quotes(&self) -> Result<Vec<MarketQuote>, StoreError>;

    /// Returns `false` without writing when `(owner, date)` already exists.
    async fn insert_snapshot_if_absent(&self, snapshot: &PortfolioSnapshot) -> Result<bool, StoreError>;

    /// Snapshots within the inclusive bounds, ordered by date descending.
    async fn fetch_snapshots(
        &self,
        owner: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>, StoreError>;
}
