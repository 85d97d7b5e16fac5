use std::sync::Arc;

use async_trait::async_trait;

use crate::external::price_provider::{PriceProvider, PriceProviderError, LATEST_TRADING_DAY};

#[async_trait]
pub trait FxProvider: Send + Sync {
    /// Units of `quote` per one unit of `base`.
    async fn get_rate(&self, base: &str, quote: &str) -> Result<f64, PriceProviderError>;
}

/// Resolves FX rates through a chart-style price provider that lists currency
/// pairs as `BASEQUOTE=X` (Yahoo convention).
pub struct ChartFxProvider {
    prices: Arc<dyn PriceProvider>,
}

impl ChartFxProvider {
    pub fn new(prices: Arc<dyn PriceProvider>) -> Self {
        Self { prices }
    }

    pub fn pair_symbol(base: &str, quote: &str) -> String {
        format!("{}{}=X", base.to_uppercase(), quote.to_uppercase())
    }
}

#[async_trait]
impl FxProvider for ChartFxProvider {
    async fn get_rate(&self, base: &str, quote: &str) -> Result<f64, PriceProviderError> {
        if base.eq_ignore_ascii_case(quote) {
            return Ok(1.0);
        }

        let symbol = Self::pair_symbol(base, quote);
        let series = self.prices.fetch_daily_history(&symbol, LATEST_TRADING_DAY).await?;
        let rate = series.last().map(|p| p.close).ok_or(PriceProviderError::NotFound)?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(PriceProviderError::BadResponse(format!("invalid rate {} for {}", rate, symbol)));
        }
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::price_provider::ExternalPricePoint;
    use chrono::NaiveDate;
    use parking_lot::Mutex;

    struct Recording {
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PriceProvider for Recording {
        async fn fetch_daily_history(&self, ticker: &str, _: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            self.asked.lock().push(ticker.to_string());
            let date = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
            Ok(vec![ExternalPricePoint::from_close(date, 86.5)])
        }
    }

    #[tokio::test]
    async fn test_rate_uses_pair_symbol() {
        let prices = Arc::new(Recording { asked: Mutex::new(Vec::new()) });
        let fx = ChartFxProvider::new(prices.clone());

        let rate = fx.get_rate("usd", "inr").await.unwrap();
        assert_eq!(rate, 86.5);
        assert_eq!(prices.asked.lock().as_slice(), ["USDINR=X".to_string()]);
    }

    #[tokio::test]
    async fn test_same_currency_skips_lookup() {
        let prices = Arc::new(Recording { asked: Mutex::new(Vec::new()) });
        let fx = ChartFxProvider::new(prices.clone());

        assert_eq!(fx.get_rate("INR", "INR").await.unwrap(), 1.0);
        assert!(prices.asked.lock().is_empty());
    }
}
