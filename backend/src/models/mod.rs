mod goal;
mod holding;
mod market_quote;
mod snapshot;
mod valuation;
pub mod optimization;

pub use goal::{CreateGoal, Goal, GoalProgress, InvestmentSuggestion, Strategy};
pub use holding::{CreateHolding, Holding, Portfolio};
pub use market_quote::MarketQuote;
pub use optimization::{SharpeRequest, SharpeResponse};
pub use snapshot::{HistoryParams, PortfolioSnapshot, SaveSnapshot, SnapshotAsset, SnapshotWithChange};
pub use valuation::{LiveValuationResponse, PortfolioValuation, Quoted, ValuedPosition, UNAVAILABLE};
