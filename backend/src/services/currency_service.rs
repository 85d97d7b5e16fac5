use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::{BigDecimal, One};
use futures::future::join_all;
use tracing::{info, warn};

use crate::external::fx_provider::FxProvider;
use crate::models::Holding;
use crate::utils::decimal_from_f64;

/// Tickers known to be quoted in USD. Only consulted for holdings recorded
/// without an explicit currency.
const LEGACY_USD_TICKERS: [&str; 3] = ["AAPL", "TSLA", "GOOG"];

const FX_RATE_SCALE: i64 = 6;

/// Quote currency → rate into the base currency, fetched once per valuation.
pub type FxRates = HashMap<String, BigDecimal>;

/// Fallback currency detection for holdings that predate the `currency` attribute.
pub fn detect_currency(ticker: &str, base_currency: &str) -> String {
    if LEGACY_USD_TICKERS.contains(&ticker.to_uppercase().as_str()) {
        "USD".to_string()
    } else {
        base_currency.to_string()
    }
}

#[derive(Clone)]
pub struct CurrencyNormalizer {
    fx: Arc<dyn FxProvider>,
    base_currency: String,
    timeout: Duration,
}

impl CurrencyNormalizer {
    pub fn new(fx: Arc<dyn FxProvider>, base_currency: impl Into<String>, timeout: Duration) -> Self {
        Self {
            fx,
            base_currency: base_currency.into().to_uppercase(),
            timeout,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn currency_of(&self, holding: &Holding) -> String {
        match &holding.currency {
            Some(c) => c.to_uppercase(),
            None => detect_currency(&holding.ticker, &self.base_currency),
        }
    }

    /// Rates for every foreign currency in `currencies`.
    ///
    /// A currency whose rate cannot be fetched gets a rate of 1.
    pub async fn rates_for<I>(&self, currencies: I) -> FxRates
    where
        I: IntoIterator<Item = String>,
    {
        let foreign: BTreeSet<String> = currencies
            .into_iter()
            .filter(|c| *c != self.base_currency)
            .collect();

        let lookups = foreign.into_iter().map(|currency| async move {
            let rate = self.fetch_rate(&currency).await;
            (currency, rate)
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn fetch_rate(&self, currency: &str) -> BigDecimal {
        let fetched = tokio::time::timeout(self.timeout, self.fx.get_rate(currency, &self.base_currency)).await;

        match fetched {
            Ok(Ok(rate)) => match decimal_from_f64(rate, FX_RATE_SCALE) {
                Some(rate) => {
                    info!("💱 {}{} = {}", currency, self.base_currency, rate);
                    rate
                }
                None => {
                    warn!("Unusable FX rate {} for {}{}, using 1", rate, currency, self.base_currency);
                    BigDecimal::one()
                }
            },
            Ok(Err(e)) => {
                warn!("FX rate {}{} unavailable, using 1: {}", currency, self.base_currency, e);
                BigDecimal::one()
            }
            Err(_) => {
                warn!("FX rate {}{} timed out, using 1", currency, self.base_currency);
                BigDecimal::one()
            }
        }
    }

    /// Multiplier from `currency` into the base currency.
    pub fn rate(&self, currency: &str, rates: &FxRates) -> BigDecimal {
        if currency.eq_ignore_ascii_case(&self.base_currency) {
            return BigDecimal::one();
        }
        rates
            .get(&currency.to_uppercase())
            .cloned()
            .unwrap_or_else(BigDecimal::one)
    }
}
