use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::FIVE_YEARS;
use crate::models::{CreateGoal, Goal, GoalProgress, InvestmentSuggestion, Strategy};
use crate::services::market_price_gateway::MarketPriceGateway;
use crate::store::Store;
use crate::utils::{ratio_percent, REPORT_SCALE};

/// Growth rate assumed when the reference index series cannot be used.
pub const FALLBACK_GROWTH_RATE: f64 = 0.07;

/// Above this CAGR the market is considered strong.
const STRONG_MARKET_CAGR: f64 = 0.08;

const LAGGING_PROGRESS_PERCENT: i64 = 50;

const CAGR_YEARS: f64 = 5.0;

const DAYS_PER_YEAR: i64 = 365;
const MONTHS_PER_YEAR: i64 = 12;

pub const NO_GOALS_MESSAGE: &str = "No goals found for this user";

/// Smallest horizon a projection will divide by, in years.
fn min_years_left() -> BigDecimal {
    BigDecimal::from(1i64) / BigDecimal::from(100i64)
}

pub async fn add_goal(store: &dyn Store, owner: &str, input: CreateGoal) -> Result<Goal, AppError> {
    let goal_name = input
        .goal_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("goal_name is required".to_string()))?;

    let target_amount = input
        .target_amount
        .ok_or_else(|| AppError::Validation("target_amount is required".to_string()))?;
    if target_amount <= BigDecimal::zero() {
        return Err(AppError::Validation("target_amount must be greater than 0".to_string()));
    }

    let current_progress = input.current_progress.unwrap_or_else(BigDecimal::zero);
    if current_progress < BigDecimal::zero() {
        return Err(AppError::Validation("current_progress cannot be negative".to_string()));
    }

    let deadline = input
        .deadline
        .ok_or_else(|| AppError::Validation("deadline is required".to_string()))?;
    let deadline = NaiveDate::parse_from_str(deadline.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("deadline '{}' must be YYYY-MM-DD", deadline)))?;

    let goal = Goal::new(owner, goal_name, target_amount, current_progress, deadline);
    store.insert_goal(&goal).await?;

    info!("🎯 Goal '{}' added for {}", goal.goal_name, owner);
    Ok(goal)
}

pub async fn list_goals(store: &dyn Store, owner: &str) -> Result<Vec<Goal>, AppError> {
    Ok(store.fetch_goals(owner).await?)
}

/// Projects a single goal at `as_of`.
///
/// `years_left` never drops below 0.01, so a lapsed deadline yields a very
/// large monthly figure instead of an error. A negative monthly figure means
/// the goal is already met.
pub fn project(goal: &Goal, as_of: NaiveDate) -> Result<GoalProgress, AppError> {
    let progress_percentage = ratio_percent(&goal.current_progress, &goal.target_amount)?;

    let days = (goal.deadline - as_of).num_days();
    let years_left = (BigDecimal::from(days) / BigDecimal::from(DAYS_PER_YEAR)).max(min_years_left());

    let remaining = &goal.target_amount - &goal.current_progress;
    let months = &years_left * BigDecimal::from(MONTHS_PER_YEAR);
    let monthly_investment_needed = (remaining / months).round(REPORT_SCALE);

    Ok(GoalProgress {
        goal_name: goal.goal_name.clone(),
        target_amount: goal.target_amount.clone(),
        current_progress: goal.current_progress.clone(),
        progress_percentage,
        deadline: goal.deadline,
        years_left: years_left.round(REPORT_SCALE),
        monthly_investment_needed,
    })
}

/// Fixed-priority decision table: lagging progress first, then market strength.
pub fn classify(progress_percentage: &BigDecimal, market_growth_rate: f64) -> Strategy {
    if *progress_percentage < BigDecimal::from(LAGGING_PROGRESS_PERCENT) {
        Strategy::IncreaseInvestment
    } else if market_growth_rate > STRONG_MARKET_CAGR {
        Strategy::StayInvested
    } else {
        Strategy::BalancedSip
    }
}

/// `(end / start)^(1/5) - 1` over an ascending close series.
pub fn cagr(closes: &[f64]) -> Option<f64> {
    let start = *closes.first()?;
    let end = *closes.last()?;
    if !(start > 0.0 && end > 0.0) || !start.is_finite() || !end.is_finite() {
        return None;
    }
    Some((end / start).powf(1.0 / CAGR_YEARS) - 1.0)
}

#[derive(Clone)]
pub struct GoalProjector {
    store: Arc<dyn Store>,
    gateway: MarketPriceGateway,
    reference_index: String,
}

impl GoalProjector {
    pub fn new(store: Arc<dyn Store>, gateway: MarketPriceGateway, reference_index: impl Into<String>) -> Self {
        Self {
            store,
            gateway,
            reference_index: reference_index.into(),
        }
    }

    /// Five-year CAGR of the reference index, or the fallback rate.
    pub async fn market_growth_rate(&self) -> f64 {
        let series = match self.gateway.history(&self.reference_index, FIVE_YEARS).await {
            Ok(series) => series,
            Err(e) => {
                warn!("Reference index {} unavailable, assuming {}: {}", self.reference_index, FALLBACK_GROWTH_RATE, e);
                return FALLBACK_GROWTH_RATE;
            }
        };

        let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
        match cagr(&closes) {
            Some(rate) => {
                info!("📈 {} CAGR over {} points: {:.4}", self.reference_index, closes.len(), rate);
                rate
            }
            None => {
                warn!("Reference index {} series unusable ({} points), assuming {}", self.reference_index, closes.len(), FALLBACK_GROWTH_RATE);
                FALLBACK_GROWTH_RATE
            }
        }
    }

    async fn goals_or_not_found(&self, owner: &str) -> Result<Vec<Goal>, AppError> {
        let goals = self.store.fetch_goals(owner).await?;
        if goals.is_empty() {
            return Err(AppError::NotFound(NO_GOALS_MESSAGE.to_string()));
        }
        Ok(goals)
    }

    pub async fn progress(&self, owner: &str, as_of: NaiveDate) -> Result<Vec<GoalProgress>, AppError> {
        let goals = self.goals_or_not_found(owner).await?;
        goals.iter().map(|goal| project(goal, as_of)).collect()
    }

    /// Projections with a strategy each. The reference index is fetched once
    /// for the whole batch.
    pub async fn suggest(&self, owner: &str, as_of: NaiveDate) -> Result<Vec<InvestmentSuggestion>, AppError> {
        let goals = self.goals_or_not_found(owner).await?;
        let market_growth_rate = self.market_growth_rate().await;

        goals
            .iter()
            .map(|goal| {
                let progress = project(goal, as_of)?;
                let strategy = classify(&progress.progress_percentage, market_growth_rate);
                Ok(InvestmentSuggestion {
                    progress,
                    strategy,
                    suggested_strategy: strategy.message(),
                    market_growth_rate,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
    use crate::services::quote_cache::QuoteCache;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::str::FromStr;
    use std::time::Duration;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(target: &str, progress: &str, deadline: NaiveDate) -> Goal {
        Goal::new("u", "Retirement", dec(target), dec(progress), deadline)
    }

    struct IndexSeries {
        closes: Vec<f64>,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl PriceProvider for IndexSeries {
        async fn fetch_daily_history(&self, _: &str, _: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            *self.calls.lock() += 1;
            if self.closes.is_empty() {
                return Err(PriceProviderError::NotFound);
            }
            Ok(self
                .closes
                .iter()
                .enumerate()
                .map(|(i, c)| ExternalPricePoint::from_close(date(2020, 1, 1) + chrono::Duration::days(i as i64), *c))
                .collect())
        }
    }

    fn projector(closes: Vec<f64>) -> (GoalProjector, Arc<IndexSeries>, Arc<MemoryStore>) {
        let provider = Arc::new(IndexSeries { closes, calls: Mutex::new(0) });
        let store = Arc::new(MemoryStore::new());
        let gateway = MarketPriceGateway::new(provider.clone(), QuoteCache::disabled(), Duration::from_secs(1));
        (GoalProjector::new(store.clone(), gateway, "^NSEI"), provider, store)
    }

    #[test]
    fn test_projection_for_fifteen_year_goal() {
        let progress = project(&goal("500000", "10000", date(2040, 1, 1)), date(2025, 1, 29)).unwrap();

        assert_eq!(progress.progress_percentage, dec("2"));
        assert_eq!(progress.years_left, dec("14.93"));
        assert!((progress.years_left.clone() - dec("15")).abs() < dec("0.1"));
        assert_eq!(progress.monthly_investment_needed, dec("2734.71"));
    }

    #[test]
    fn test_lapsed_deadline_floors_years_left() {
        let as_of = date(2025, 1, 29);

        for deadline in [as_of, date(2024, 6, 1)] {
            let progress = project(&goal("1200", "0", deadline), as_of).unwrap();
            assert_eq!(progress.years_left, dec("0.01"));
            // 1200 / (0.01 * 12): huge but finite
            assert_eq!(progress.monthly_investment_needed, dec("10000"));
        }
    }

    #[test]
    fn test_goal_already_met_needs_negative_monthly() {
        let progress = project(&goal("1000", "2200", date(2026, 1, 29)), date(2025, 1, 29)).unwrap();

        assert_eq!(progress.progress_percentage, dec("220"));
        assert_eq!(progress.monthly_investment_needed, dec("-100"));
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(classify(&dec("49.99"), 0.25), Strategy::IncreaseInvestment);
        assert_eq!(classify(&dec("50"), 0.09), Strategy::StayInvested);
        assert_eq!(classify(&dec("80"), 0.08), Strategy::BalancedSip);
        assert_eq!(classify(&dec("80"), FALLBACK_GROWTH_RATE), Strategy::BalancedSip);
    }

    #[test]
    fn test_cagr() {
        let rate = cagr(&[100.0, 120.0, 200.0]).unwrap();
        assert!((rate - (2.0f64.powf(0.2) - 1.0)).abs() < 1e-12);
        assert!(cagr(&[]).is_none());
        assert!(cagr(&[0.0, 10.0]).is_none());
    }

    #[tokio::test]
    async fn test_unavailable_index_uses_fallback_rate() {
        let (projector, _, _) = projector(vec![]);
        assert_eq!(projector.market_growth_rate().await, FALLBACK_GROWTH_RATE);
    }

    #[tokio::test]
    async fn test_suggestions_fetch_index_once() {
        let (projector, provider, store) = projector(vec![100.0, 250.0]);
        store.insert_goal(&goal("1000", "900", date(2030, 1, 1))).await.unwrap();
        store.insert_goal(&goal("1000", "100", date(2030, 1, 1))).await.unwrap();

        let suggestions = projector.suggest("u", date(2025, 1, 29)).await.unwrap();

        assert_eq!(*provider.calls.lock(), 1);
        assert_eq!(suggestions.len(), 2);
        let strategies: Vec<Strategy> = suggestions.iter().map(|s| s.strategy).collect();
        assert!(strategies.contains(&Strategy::StayInvested));
        assert!(strategies.contains(&Strategy::IncreaseInvestment));
    }

    #[tokio::test]
    async fn test_no_goals_is_not_found() {
        let (projector, _, _) = projector(vec![]);
        match projector.progress("nobody", date(2025, 1, 29)).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, NO_GOALS_MESSAGE),
            other => panic!("expected NotFound, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_add_goal_validation() {
        let store = MemoryStore::new();
        let valid = CreateGoal {
            goal_name: Some("House".into()),
            target_amount: Some(dec("100000")),
            current_progress: None,
            deadline: Some("2030-12-31".into()),
        };

        let created = add_goal(&store, "u", valid.clone()).await.unwrap();
        assert_eq!(created.current_progress, BigDecimal::zero());
        add_goal(&store, "u", valid.clone()).await.unwrap();
        assert_eq!(list_goals(&store, "u").await.unwrap().len(), 2);

        let zero_target = CreateGoal { target_amount: Some(BigDecimal::zero()), ..valid.clone() };
        assert!(matches!(add_goal(&store, "u", zero_target).await, Err(AppError::Validation(_))));

        let bad_date = CreateGoal { deadline: Some("31/12/2030".into()), ..valid.clone() };
        assert!(matches!(add_goal(&store, "u", bad_date).await, Err(AppError::Validation(_))));

        let blank_name = CreateGoal { goal_name: Some("  ".into()), ..valid };
        assert!(matches!(add_goal(&store, "u", blank_name).await, Err(AppError::Validation(_))));
    }
}
