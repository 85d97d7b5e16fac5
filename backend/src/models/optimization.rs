use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SharpeRequest {
    /// Optional asset labels; positional names are used when omitted.
    #[serde(default)]
    pub assets: Vec<String>,
    pub weights: Vec<f64>,
    pub expected_returns: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
    pub risk_free_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharpeResponse {
    pub portfolio_return: f64,
    pub portfolio_volatility: f64,
    pub sharpe_ratio: f64,
}
