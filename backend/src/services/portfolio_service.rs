use std::sync::OnceLock;

use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::info;

use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, Portfolio};
use crate::services::currency_service::detect_currency;
use crate::store::Store;

pub const NO_PORTFOLIO_MESSAGE: &str = "No portfolio found for this user";

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=^&]{0,19}$").expect("static ticker pattern"))
}

fn currency_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("static currency pattern"))
}

fn non_negative(field: &str, value: Option<BigDecimal>) -> Result<BigDecimal, AppError> {
    let value = value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))?;
    if value < BigDecimal::zero() {
        return Err(AppError::Validation(format!("{} cannot be negative", field)));
    }
    Ok(value)
}

/// Validates `input` into a `Holding`.
///
/// The currency is fixed at creation time: an explicit value wins, otherwise
/// the ticker-based detection rule decides.
pub fn build_holding(input: CreateHolding, base_currency: &str, today: NaiveDate) -> Result<Holding, AppError> {
    let ticker = input
        .ticker
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("ticker is required".to_string()))?;
    if !ticker_pattern().is_match(&ticker) {
        return Err(AppError::Validation(format!("'{}' is not a valid ticker", ticker)));
    }

    let quantity = non_negative("quantity", input.quantity)?;
    let average_price = non_negative("average_price", input.average_price)?;

    let investment_date = match input.investment_date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("investment_date '{}' must be YYYY-MM-DD", raw)))?,
    };

    let currency = match input.currency.map(|c| c.trim().to_uppercase()) {
        Some(c) if !c.is_empty() => {
            if !currency_pattern().is_match(&c) {
                return Err(AppError::Validation(format!("'{}' is not an ISO currency code", c)));
            }
            c
        }
        _ => detect_currency(&ticker, base_currency),
    };

    Ok(Holding {
        ticker,
        quantity,
        average_price,
        investment_date,
        currency: Some(currency),
    })
}

/// Appends a holding to the owner's portfolio, creating the portfolio on first use.
/// A ticker the owner already holds is rejected and nothing is written.
pub async fn add_holding(
    store: &dyn Store,
    owner: &str,
    input: CreateHolding,
    base_currency: &str,
) -> Result<Holding, AppError> {
    let holding = build_holding(input, base_currency, Utc::now().date_naive())?;

    if !store.insert_holding(owner, &holding).await? {
        return Err(AppError::Validation(format!(
            "{} already exists in your portfolio",
            holding.ticker
        )));
    }

    info!("➕ Added {} x {} to portfolio of {}", holding.quantity, holding.ticker, owner);
    Ok(holding)
}

pub async fn get_portfolio(store: &dyn Store, owner: &str) -> Result<Portfolio, AppError> {
    store
        .fetch_portfolio(owner)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_PORTFOLIO_MESSAGE.to_string()))
}
