use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::{Holding, Portfolio, PortfolioValuation, Quoted, ValuedPosition};
use crate::services::currency_service::CurrencyNormalizer;
use crate::services::market_price_gateway::MarketPriceGateway;
use crate::utils::{ratio_percent, REPORT_SCALE};

/// Values one holding against its live price, both quoted in `currency`.
///
/// Gain and percentage are computed in the holding's own currency:
/// `profit_loss = quantity × (price − average_price)` and
/// `percentage_change = profit_loss / (quantity × average_price) × 100` (2 dp).
/// `fx_rate` then converts `current_price`, `current_value` and `profit_loss`
/// into the base currency, so the percentage does not depend on the rate.
/// A zero cost basis leaves `percentage_change` as `null`.
/// Without a price every derived field is `Unavailable`.
pub fn value_position(
    holding: &Holding,
    currency: &str,
    price: Option<BigDecimal>,
    fx_rate: &BigDecimal,
) -> ValuedPosition {
    let Some(price) = price else {
        return ValuedPosition {
            ticker: holding.ticker.clone(),
            quantity: holding.quantity.clone(),
            average_price: holding.average_price.clone(),
            currency: currency.to_string(),
            current_price: Quoted::Unavailable,
            current_value: Quoted::Unavailable,
            profit_loss: Quoted::Unavailable,
            percentage_change: Quoted::Unavailable,
        };
    };

    let current_value = &holding.quantity * &price;
    let cost_basis = &holding.quantity * &holding.average_price;
    let profit_loss = &current_value - &cost_basis;

    let percentage_change = match ratio_percent(&profit_loss, &cost_basis) {
        Ok(pct) => Some(pct),
        Err(AppError::DivisionUndefined(reason)) => {
            debug!("percentage change for {} undefined: {}", holding.ticker, reason);
            None
        }
        Err(e) => {
            warn!("percentage change for {} failed: {}", holding.ticker, e);
            None
        }
    };

    let in_base = |v: &BigDecimal| (v * fx_rate).round(REPORT_SCALE);

    ValuedPosition {
        ticker: holding.ticker.clone(),
        quantity: holding.quantity.clone(),
        average_price: holding.average_price.clone(),
        currency: currency.to_string(),
        current_price: Quoted::Available(in_base(&price)),
        current_value: Quoted::Available(in_base(&current_value)),
        profit_loss: Quoted::Available(in_base(&profit_loss)),
        percentage_change: Quoted::Available(percentage_change),
    }
}

/// Sum of available `current_value`s; unavailable positions count as zero.
pub fn total_value(positions: &[ValuedPosition]) -> BigDecimal {
    positions
        .iter()
        .filter_map(|p| p.current_value.as_available())
        .fold(BigDecimal::zero(), |acc, v| acc + v)
}

#[derive(Clone)]
pub struct PortfolioValuator {
    gateway: MarketPriceGateway,
    normalizer: CurrencyNormalizer,
}

impl PortfolioValuator {
    pub fn new(gateway: MarketPriceGateway, normalizer: CurrencyNormalizer) -> Self {
        Self { gateway, normalizer }
    }

    /// Values every holding with one batched price lookup and one FX lookup
    /// per foreign currency.
    pub async fn value(&self, portfolio: &Portfolio) -> PortfolioValuation {
        let prices = self.gateway.fetch(&portfolio.tickers()).await;

        let currencies: Vec<String> = portfolio
            .holdings
            .iter()
            .map(|h| self.normalizer.currency_of(h))
            .collect();
        let rates = self.normalizer.rates_for(currencies.iter().cloned()).await;

        let positions: Vec<ValuedPosition> = portfolio
            .holdings
            .iter()
            .zip(currencies.iter())
            .map(|(holding, currency)| {
                let price = prices.get(&holding.ticker).cloned().flatten();
                let fx_rate = self.normalizer.rate(currency, &rates);
                value_position(holding, currency, price, &fx_rate)
            })
            .collect();

        let valuation = PortfolioValuation {
            total_value: total_value(&positions),
            base_currency: self.normalizer.base_currency().to_string(),
            positions,
        };

        let unavailable = valuation.unavailable_tickers();
        if !unavailable.is_empty() {
            warn!("Valued {} without live prices for {:?}", portfolio.owner, unavailable);
        }
        info!("📊 Portfolio of {} valued at {} {}", portfolio.owner, valuation.total_value, valuation.base_currency);

        valuation
    }

    /// Raw latest prices, for callers that only list quotes.
    pub async fn fetch_live_prices(&self, tickers: &[String]) -> HashMap<String, Option<BigDecimal>> {
        self.gateway.fetch(tickers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fx_provider::FxProvider;
    use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
    use crate::services::quote_cache::QuoteCache;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn holding(ticker: &str, quantity: &str, average_price: &str) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            quantity: dec(quantity),
            average_price: dec(average_price),
            investment_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            currency: Some("INR".to_string()),
        }
    }

    struct Quotes;

    #[async_trait]
    impl PriceProvider for Quotes {
        async fn fetch_daily_history(&self, ticker: &str, _: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            let date = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
            match ticker {
                "AAPL" => Ok(vec![ExternalPricePoint::from_close(date, 170.0)]),
                "TCS.NS" => Ok(vec![ExternalPricePoint::from_close(date, 4000.0)]),
                _ => Err(PriceProviderError::NotFound),
            }
        }
    }

    struct UsdInr;

    #[async_trait]
    impl FxProvider for UsdInr {
        async fn get_rate(&self, _: &str, _: &str) -> Result<f64, PriceProviderError> {
            Ok(80.0)
        }
    }

    fn valuator() -> PortfolioValuator {
        let gateway = MarketPriceGateway::new(Arc::new(Quotes), QuoteCache::disabled(), Duration::from_secs(1));
        let normalizer = CurrencyNormalizer::new(Arc::new(UsdInr), "INR", Duration::from_secs(1));
        PortfolioValuator::new(gateway, normalizer)
    }

    #[test]
    fn test_value_position_with_price() {
        let position = value_position(&holding("AAPL", "10", "150"), "INR", Some(dec("170")), &BigDecimal::from(1i64));

        assert_eq!(position.current_value, Quoted::Available(dec("1700")));
        assert_eq!(position.profit_loss, Quoted::Available(dec("200")));
        assert_eq!(position.percentage_change, Quoted::Available(Some(dec("13.33"))));
    }

    #[test]
    fn test_value_position_loss() {
        let position = value_position(&holding("INFY", "4", "1500"), "INR", Some(dec("1200")), &BigDecimal::from(1i64));

        assert_eq!(position.profit_loss, Quoted::Available(dec("-1200")));
        assert_eq!(position.percentage_change, Quoted::Available(Some(dec("-20"))));
    }

    #[test]
    fn test_value_position_without_price_is_unavailable() {
        let position = value_position(&holding("DELISTED", "3", "10"), "INR", None, &BigDecimal::from(1i64));

        assert_eq!(position.current_price, Quoted::Unavailable);
        assert_eq!(position.current_value, Quoted::Unavailable);
        assert_eq!(position.profit_loss, Quoted::Unavailable);
        assert_eq!(position.percentage_change, Quoted::Unavailable);
        assert_eq!(position.quantity, dec("3"));
        assert_eq!(position.average_price, dec("10"));
    }

    #[test]
    fn test_zero_cost_basis_reports_null_percentage() {
        let gifted = value_position(&holding("ITC", "10", "0"), "INR", Some(dec("450")), &BigDecimal::from(1i64));
        assert_eq!(gifted.current_value, Quoted::Available(dec("4500")));
        assert_eq!(gifted.percentage_change, Quoted::Available(None));

        let empty = value_position(&holding("ITC", "0", "300"), "INR", Some(dec("450")), &BigDecimal::from(1i64));
        assert_eq!(empty.current_value, Quoted::Available(dec("0")));
        assert_eq!(empty.percentage_change, Quoted::Available(None));
    }

    #[tokio::test]
    async fn test_portfolio_total_skips_unavailable_positions() {
        let mut portfolio = Portfolio::new("u@example.com");
        portfolio.holdings.push(holding("TCS", "2", "3500"));
        portfolio.holdings.push(holding("DELISTED", "100", "10"));

        let valuation = valuator().value(&portfolio).await;

        assert_eq!(valuation.total_value, dec("8000"));
        assert_eq!(valuation.positions.len(), 2);
        assert_eq!(valuation.unavailable_tickers(), vec!["DELISTED"]);
    }

    #[tokio::test]
    async fn test_foreign_gain_is_measured_in_quote_currency() {
        let mut portfolio = Portfolio::new("u@example.com");
        let mut apple = holding("AAPL", "10", "150");
        apple.currency = None;
        portfolio.holdings.push(apple);

        let valuation = valuator().value(&portfolio).await;
        let position = &valuation.positions[0];

        assert_eq!(position.currency, "USD");
        assert_eq!(position.average_price, dec("150"));
        assert_eq!(position.current_price, Quoted::Available(dec("13600")));
        assert_eq!(position.current_value, Quoted::Available(dec("136000")));
        assert_eq!(position.profit_loss, Quoted::Available(dec("16000")));
        assert_eq!(position.percentage_change, Quoted::Available(Some(dec("13.33"))));
        assert_eq!(valuation.total_value, dec("136000"));
        assert_eq!(valuation.base_currency, "INR");
    }

    #[test]
    fn test_converted_figures_are_rounded() {
        let rate = dec("83.123456");
        let position = value_position(&holding("AAPL", "3", "150"), "USD", Some(dec("170.15")), &rate);

        // 3 x 170.15 x 83.123456 = 42430.368...
        assert_eq!(position.current_value, Quoted::Available(dec("42430.37")));
        // 3 x 20.15 x 83.123456 = 5024.81...
        assert_eq!(position.profit_loss, Quoted::Available(dec("5024.81")));
        assert_eq!(position.current_price, Quoted::Available(dec("14143.46")));
        assert_eq!(position.percentage_change, Quoted::Available(Some(dec("13.43"))));
    }
}
