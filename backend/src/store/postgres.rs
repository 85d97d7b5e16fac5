use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::db;
use crate::errors::StoreError;
use crate::models::{Goal, Holding, MarketQuote, Portfolio, PortfolioSnapshot};
use crate::store::Store;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("✓ Database migrations applied");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_holding(&self, owner: &str, holding: &Holding) -> Result<bool, StoreError> {
        Ok(db::holding_queries::insert_if_absent(&self.pool, owner, holding).await?)
    }

    async fn fetch_portfolio(&self, owner: &str) -> Result<Option<Portfolio>, StoreError> {
        Ok(db::holding_queries::fetch_portfolio(&self.pool, owner).await?)
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        Ok(db::goal_queries::create(&self.pool, goal).await?)
    }

    async fn fetch_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError> {
        Ok(db::goal_queries::fetch_by_owner(&self.pool, owner).await?)
    }

    async fn upsert_market_quote(&self, quote: &MarketQuote) -> Result<(), StoreError> {
        Ok(db::market_data_queries::upsert(&self.pool, quote).await?)
    }

    async fn fetch_market_quotes(&self) -> Result<Vec<MarketQuote>, StoreError> {
        Ok(db::market_data_queries::fetch_all(&self.pool).await?)
    }

    async fn insert_snapshot_if_absent(&self, snapshot: &PortfolioSnapshot) -> Result<bool, StoreError> {
        Ok(db::history_queries::insert_if_absent(&self.pool, snapshot).await?)
    }

    async fn fetch_snapshots(
        &self,
        owner: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>, StoreError> {
        Ok(db::history_queries::fetch_range(&self.pool, owner, from, to).await?)
    }
}
