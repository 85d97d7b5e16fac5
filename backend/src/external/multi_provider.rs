use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use tracing::{info, warn};

/// Tries the primary provider first and falls back to the secondary one on any error.
///
/// Exchange-suffixed symbols (`.NS`, `.BO`) and indices (`^NSEI`) only exist on
/// Yahoo, so the usual setup is Yahoo as primary and Alpha Vantage as fallback.
pub struct MultiProvider {
    primary: Box<dyn PriceProvider>,
    fallback: Box<dyn PriceProvider>,
}

impl MultiProvider {
    pub fn new(primary: Box<dyn PriceProvider>, fallback: Box<dyn PriceProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl PriceProvider for MultiProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        match self.primary.fetch_daily_history(ticker, days).await {
            Ok(data) => return Ok(data),
            Err(PriceProviderError::RateLimited) => {
                info!("⚠️ Primary provider rate limited for {}, trying fallback", ticker);
            }
            Err(e) => {
                warn!("Primary provider error for {}: {}", ticker, e);
            }
        }

        match self.fallback.fetch_daily_history(ticker, days).await {
            Ok(data) => {
                info!("✓ Fetched {} from fallback provider", ticker);
                Ok(data)
            }
            Err(e) => {
                warn!("Fallback provider failed for {}: {}", ticker, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Failing;
    struct Fixed(f64);

    #[async_trait]
    impl PriceProvider for Failing {
        async fn fetch_daily_history(&self, _: &str, _: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            Err(PriceProviderError::Network("connection reset".into()))
        }
    }

    #[async_trait]
    impl PriceProvider for Fixed {
        async fn fetch_daily_history(&self, _: &str, _: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            let date = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
            Ok(vec![ExternalPricePoint::from_close(date, self.0)])
        }
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_fails() {
        let provider = MultiProvider::new(Box::new(Failing), Box::new(Fixed(42.0)));
        let points = provider.fetch_daily_history("AAPL", 1).await.unwrap();
        assert_eq!(points[0].close, 42.0);
    }

    #[tokio::test]
    async fn test_reports_fallback_error_when_both_fail() {
        let provider = MultiProvider::new(Box::new(Failing), Box::new(Failing));
        assert!(provider.fetch_daily_history("AAPL", 1).await.is_err());
    }
}
