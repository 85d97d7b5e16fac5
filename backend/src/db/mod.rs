pub mod goal_queries;
pub mod history_queries;
pub mod holding_queries;
pub mod market_data_queries;
