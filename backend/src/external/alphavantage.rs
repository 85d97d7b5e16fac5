use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvDailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, AvDailyBar>>,

    // When rate-limited Alpha Vantage returns:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Information")]
    information: Option<String>,

    // When invalid:
    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

fn parse_f64(raw: &str) -> Result<f64, PriceProviderError> {
    raw.parse::<f64>()
        .map_err(|e| PriceProviderError::Parse(format!("{}: {}", raw, e)))
}

fn parse_daily(body: AvDailyResponse, days: u32) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    if body.note.is_some() || body.information.is_some() {
        return Err(PriceProviderError::RateLimited);
    }

    if let Some(msg) = body.error_message {
        if msg.contains("Invalid API call") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(msg));
    }

    let series = body
        .time_series
        .ok_or_else(|| PriceProviderError::BadResponse("missing time series".into()))?;

    // BTreeMap keyed by "YYYY-MM-DD" iterates ascending
    let mut out: Vec<ExternalPricePoint> = Vec::with_capacity(series.len());
    for (date_str, bar) in series {
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        out.push(ExternalPricePoint {
            date,
            open: parse_f64(&bar.open)?,
            high: parse_f64(&bar.high)?,
            low: parse_f64(&bar.low)?,
            close: parse_f64(&bar.close)?,
            volume: bar.volume.and_then(|v| v.parse::<i64>().ok()),
        });
    }

    if out.is_empty() {
        return Err(PriceProviderError::NotFound);
    }

    if days > 0 && out.len() > days as usize {
        out.drain(..out.len() - days as usize);
    }

    Ok(out)
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        // compact = latest ~100 points, full = 20+ years
        let outputsize = if days <= 100 { "compact" } else { "full" };

        let resp = self
            .client
            .get("https://www.alphavantage.co/query")
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", ticker),
                ("outputsize", outputsize),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let body = resp
            .json::<AvDailyResponse>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_daily(body, days)
    }
}
