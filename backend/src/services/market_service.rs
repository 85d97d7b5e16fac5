use tracing::{error, info};

use crate::errors::AppError;
use crate::external::price_provider::{ExternalPricePoint, PriceProviderError};
use crate::models::MarketQuote;
use crate::services::market_price_gateway::{normalize_ticker, MarketPriceGateway};
use crate::store::Store;
use crate::utils::{decimal_from_f64, REPORT_SCALE};

fn to_quote(symbol: &str, bar: &ExternalPricePoint) -> Result<MarketQuote, AppError> {
    let price = |field: &str, value: f64| {
        decimal_from_f64(value, REPORT_SCALE)
            .ok_or_else(|| AppError::External(format!("{} {} is not a number", symbol, field)))
    };

    Ok(MarketQuote {
        ticker: symbol.to_string(),
        date: bar.date,
        open: price("open", bar.open)?,
        high: price("high", bar.high)?,
        low: price("low", bar.low)?,
        close: price("close", bar.close)?,
        volume: bar.volume,
    })
}

/// Latest daily bar for `ticker`, stored under `(symbol, date)`.
pub async fn lookup_quote(
    store: &dyn Store,
    gateway: &MarketPriceGateway,
    ticker: &str,
) -> Result<MarketQuote, AppError> {
    let symbol = normalize_ticker(ticker);

    let bar = gateway.latest_bar(&symbol).await.map_err(|e| match e {
        PriceProviderError::NotFound => AppError::NotFound(format!("No market data found for {}", symbol)),
        other => {
            error!("Quote lookup for {} failed: {}", symbol, other);
            AppError::External(other.to_string())
        }
    })?;

    let quote = to_quote(&symbol, &bar)?;
    store.upsert_market_quote(&quote).await?;

    info!("💹 {} closed at {} on {}", quote.ticker, quote.close, quote.date);
    Ok(quote)
}

pub async fn list_market_data(store: &dyn Store) -> Result<Vec<MarketQuote>, AppError> {
    Ok(store.fetch_market_quotes().await?)
}
