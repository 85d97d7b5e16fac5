use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A savings target with a deadline. Several goals may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub owner: String,
    pub goal_name: String,
    pub target_amount: BigDecimal,
    pub current_progress: BigDecimal,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        owner: impl Into<String>,
        goal_name: impl Into<String>,
        target_amount: BigDecimal,
        current_progress: BigDecimal,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            goal_name: goal_name.into(),
            target_amount,
            current_progress,
            deadline,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateGoal {
    pub goal_name: Option<String>,
    pub target_amount: Option<BigDecimal>,
    pub current_progress: Option<BigDecimal>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_name: String,
    pub target_amount: BigDecimal,
    pub current_progress: BigDecimal,
    pub progress_percentage: BigDecimal,
    pub deadline: NaiveDate,
    pub years_left: BigDecimal,
    pub monthly_investment_needed: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    IncreaseInvestment,
    StayInvested,
    BalancedSip,
}

impl Strategy {
    pub fn message(&self) -> &'static str {
        match self {
            Strategy::IncreaseInvestment => "Increase investments. Consider high-growth stocks or ETFs.",
            Strategy::StayInvested => "Stock market is performing well. Stay invested in equities.",
            Strategy::BalancedSip => "Market is volatile. Consider balanced funds or SIP investments.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentSuggestion {
    #[serde(flatten)]
    pub progress: GoalProgress,
    pub strategy: Strategy,
    pub suggested_strategy: &'static str,
    pub market_growth_rate: f64,
}
