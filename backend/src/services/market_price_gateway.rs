use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::external::price_provider::{
    ExternalPricePoint, PriceProvider, PriceProviderError, LATEST_TRADING_DAY,
};
use crate::services::quote_cache::QuoteCache;
use crate::utils::{decimal_from_f64, REPORT_SCALE};

/// NSE blue chips that users commonly enter without the exchange suffix.
const KNOWN_NSE_TICKERS: [&str; 8] = [
    "RELIANCE", "TCS", "INFY", "HDFC", "ICICIBANK", "KOTAKBANK", "SBIN", "ITC",
];

/// Maps a user-entered ticker to the symbol the provider understands.
///
/// Upper-cases, keeps explicit `.NS` / `.BO` suffixes, and appends `.NS` to
/// bare symbols on the NSE allow-list.
pub fn normalize_ticker(ticker: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    if ticker.ends_with(".NS") || ticker.ends_with(".BO") {
        return ticker;
    }
    if KNOWN_NSE_TICKERS.contains(&ticker.as_str()) {
        return format!("{}.NS", ticker);
    }
    ticker
}

/// Latest-price lookups against the configured market-data provider.
///
/// Every provider call is bounded by `timeout`; a timeout is handled exactly
/// like any other provider failure.
#[derive(Clone)]
pub struct MarketPriceGateway {
    provider: Arc<dyn PriceProvider>,
    cache: QuoteCache,
    timeout: Duration,
}

impl MarketPriceGateway {
    pub fn new(provider: Arc<dyn PriceProvider>, cache: QuoteCache, timeout: Duration) -> Self {
        Self { provider, cache, timeout }
    }

    /// Latest close for each ticker, keyed by the ticker as given.
    ///
    /// A failing ticker maps to `None`; it never aborts the rest of the batch.
    pub async fn fetch(&self, tickers: &[String]) -> HashMap<String, Option<BigDecimal>> {
        self.cache.cleanup_expired();
        if !self.cache.is_empty() {
            debug!("Quote cache holds {} symbols", self.cache.len());
        }
        let distinct: BTreeSet<&String> = tickers.iter().collect();

        let lookups = distinct.into_iter().map(|ticker| async move {
            (ticker.clone(), self.latest_close(ticker).await)
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn latest_close(&self, ticker: &str) -> Option<BigDecimal> {
        let symbol = normalize_ticker(ticker);

        if let Some(cached) = self.cache.get(&symbol) {
            debug!("Quote cache hit for {}", symbol);
            return cached;
        }

        let price = match self.latest_bar(&symbol).await {
            Ok(bar) => decimal_from_f64(bar.close, REPORT_SCALE),
            Err(e) => {
                warn!("Price unavailable for {} ({}): {}", ticker, symbol, e);
                None
            }
        };

        self.cache.record(&symbol, price.clone());
        price
    }

    /// Most recent daily bar for an already-normalized symbol.
    pub async fn latest_bar(&self, symbol: &str) -> Result<ExternalPricePoint, PriceProviderError> {
        self.history(symbol, LATEST_TRADING_DAY)
            .await?
            .pop()
            .ok_or(PriceProviderError::NotFound)
    }

    /// Daily bars for an already-normalized symbol, ascending.
    pub async fn history(&self, symbol: &str, days: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.fetch_daily_history(symbol, days)).await {
            Ok(result) => result,
            Err(_) => Err(PriceProviderError::Timeout),
        }
    }
}
