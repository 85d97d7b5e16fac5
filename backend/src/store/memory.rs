use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::errors::StoreError;
use crate::models::{Goal, Holding, MarketQuote, Portfolio, PortfolioSnapshot};
use crate::store::Store;

/// Process-local store for tests and `STORE_BACKEND=memory` runs.
///
/// Conditional writes go through the dashmap entry API, which holds the
/// shard lock for the duration of the check-and-insert.
#[derive(Default)]
pub struct MemoryStore {
    portfolios: DashMap<String, Portfolio>,
    goals: RwLock<Vec<Goal>>,
    market_data: DashMap<(String, NaiveDate), MarketQuote>,
    history: DashMap<(String, NaiveDate), PortfolioSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_holding(&self, owner: &str, holding: &Holding) -> Result<bool, StoreError> {
        let mut portfolio = self
            .portfolios
            .entry(owner.to_string())
            .or_insert_with(|| Portfolio::new(owner));

        if portfolio.contains_ticker(&holding.ticker) {
            return Ok(false);
        }
        portfolio.holdings.push(holding.clone());
        Ok(true)
    }

    async fn fetch_portfolio(&self, owner: &str) -> Result<Option<Portfolio>, StoreError> {
        Ok(self.portfolios.get(owner).map(|p| p.value().clone()))
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        self.goals.write().push(goal.clone());
        Ok(())
    }

    async fn fetch_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError> {
        Ok(self
            .goals
            .read()
            .iter()
            .filter(|g| g.owner == owner)
            .cloned()
            .collect())
    }

    async fn upsert_market_quote(&self, quote: &MarketQuote) -> Result<(), StoreError> {
        self.market_data
            .insert((quote.ticker.clone(), quote.date), quote.clone());
        Ok(())
    }

    async fn fetch_market_quotes(&self) -> Result<Vec<MarketQuote>, StoreError> {
        let mut quotes: Vec<MarketQuote> = self
            .market_data
            .iter()
            .map(|e| e.value().clone())
            .collect();
        quotes.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(b.date.cmp(&a.date)));
        Ok(quotes)
    }

    async fn insert_snapshot_if_absent(&self, snapshot: &PortfolioSnapshot) -> Result<bool, StoreError> {
        match self.history.entry((snapshot.owner.clone(), snapshot.date)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(snapshot.clone());
                Ok(true)
            }
        }
    }

    async fn fetch_snapshots(
        &self,
        owner: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>, StoreError> {
        let mut snapshots: Vec<PortfolioSnapshot> = self
            .history
            .iter()
            .filter(|e| e.key().0 == owner)
            .filter(|e| from.map_or(true, |f| e.key().1 >= f))
            .filter(|e| to.map_or(true, |t| e.key().1 <= t))
            .map(|e| e.value().clone())
            .collect();
        snapshots.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(snapshots)
    }
}
