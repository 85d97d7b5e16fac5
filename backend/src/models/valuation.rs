use bigdecimal::BigDecimal;
use serde::{Serialize, Serializer};

pub const UNAVAILABLE: &str = "unavailable";

/// A derived figure that may not be computable because the live price is missing.
///
/// `Unavailable` serializes as the string `"unavailable"` and is never folded
/// into zero for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Quoted<T> {
    Available(T),
    Unavailable,
}

impl<T> Quoted<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Quoted::Available(_))
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Quoted::Available(v) => Some(v),
            Quoted::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Quoted<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Quoted::Available(v),
            None => Quoted::Unavailable,
        }
    }
}

impl<T: Serialize> Serialize for Quoted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quoted::Available(v) => v.serialize(serializer),
            Quoted::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

// A holding combined with its live price. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedPosition {
    pub ticker: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
    pub currency: String,
    pub current_price: Quoted<BigDecimal>,
    pub current_value: Quoted<BigDecimal>,
    pub profit_loss: Quoted<BigDecimal>,
    /// `Available(None)` when the cost basis is zero and the ratio is undefined.
    pub percentage_change: Quoted<Option<BigDecimal>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioValuation {
    pub total_value: BigDecimal,
    pub base_currency: String,
    pub positions: Vec<ValuedPosition>,
}

impl PortfolioValuation {
    pub fn unavailable_tickers(&self) -> Vec<&str> {
        self.positions
            .iter()
            .filter(|p| !p.current_price.is_available())
            .map(|p| p.ticker.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveValuationResponse {
    #[serde(flatten)]
    pub valuation: PortfolioValuation,
    pub snapshot_recorded: bool,
}
