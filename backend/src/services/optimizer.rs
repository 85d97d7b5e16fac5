use ndarray::{Array1, Array2};
use tracing::debug;

use crate::errors::AppError;
use crate::models::SharpeResponse;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

fn to_matrix(rows: &[Vec<f64>], n: usize) -> Result<Array2<f64>, AppError> {
    if rows.len() != n || rows.iter().any(|r| r.len() != n) {
        return Err(AppError::Validation(format!("covariance must be a {}x{} matrix", n, n)));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n, n), flat).map_err(|e| AppError::Validation(e.to_string()))
}

/// Return, volatility and Sharpe ratio of a weighted portfolio.
///
/// `return = w·μ`, `volatility = sqrt(wᵀΣw)`, `sharpe = (return − rf) / volatility`.
/// Zero volatility is `DivisionUndefined`.
pub fn sharpe(
    weights: &[f64],
    expected_returns: &[f64],
    covariance: &[Vec<f64>],
    risk_free_rate: f64,
) -> Result<SharpeResponse, AppError> {
    let n = weights.len();
    if n == 0 {
        return Err(AppError::Validation("weights cannot be empty".to_string()));
    }
    if expected_returns.len() != n {
        return Err(AppError::Validation(format!(
            "expected {} expected_returns, got {}",
            n,
            expected_returns.len()
        )));
    }

    let w = Array1::from_vec(weights.to_vec());
    let mu = Array1::from_vec(expected_returns.to_vec());
    let sigma = to_matrix(covariance, n)?;

    let portfolio_return = w.dot(&mu);
    let variance = w.dot(&sigma.dot(&w));

    if !variance.is_finite() || variance < 0.0 {
        return Err(AppError::Validation(format!(
            "covariance yields invalid variance {}",
            variance
        )));
    }

    let portfolio_volatility = variance.sqrt();
    if portfolio_volatility == 0.0 {
        debug!("Sharpe requested for a zero-volatility portfolio");
        return Err(AppError::DivisionUndefined("portfolio volatility is zero".to_string()));
    }

    Ok(SharpeResponse {
        portfolio_return,
        portfolio_volatility,
        sharpe_ratio: (portfolio_return - risk_free_rate) / portfolio_volatility,
    })
}

/// A fixed asset universe that can be scored under different weightings.
#[derive(Debug, Clone)]
pub struct PortfolioOptimizer {
    pub assets: Vec<String>,
    pub expected_returns: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
    pub risk_free_rate: f64,
}

impl PortfolioOptimizer {
    pub fn new(assets: Vec<String>, expected_returns: Vec<f64>, covariance: Vec<Vec<f64>>) -> Self {
        Self {
            assets,
            expected_returns,
            covariance,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Scores one weighting of the universe, one weight per asset.
    pub fn evaluate(&self, weights: &[f64]) -> Result<SharpeResponse, AppError> {
        if weights.len() != self.assets.len() {
            return Err(AppError::Validation(format!(
                "{} weights for {} assets",
                weights.len(),
                self.assets.len()
            )));
        }
        sharpe(weights, &self.expected_returns, &self.covariance, self.risk_free_rate)
    }

    pub fn sharpe_ratio(&self, weights: &[f64]) -> Result<f64, AppError> {
        self.evaluate(weights).map(|r| r.sharpe_ratio)
    }
}
