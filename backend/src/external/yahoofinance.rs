use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use serde::Deserialize;

/// Yahoo Finance chart API. No API key required, covers NSE/BSE symbols
/// (`*.NS`, `*.BO`), indices (`^NSEI`) and FX pairs (`USDINR=X`).
pub struct YahooFinanceProvider {
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; Goalfolio/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

// Yahoo uses "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"
fn range_for_days(days: u32) -> &'static str {
    if days <= 5 {
        "5d"
    } else if days <= 30 {
        "1mo"
    } else if days <= 90 {
        "3mo"
    } else if days <= 180 {
        "6mo"
    } else if days <= 365 {
        "1y"
    } else if days <= 730 {
        "2y"
    } else {
        "5y"
    }
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(error.description));
    }

    let results = body.chart.result
        .ok_or_else(|| PriceProviderError::BadResponse("No results in response".into()))?;

    let Some(result) = results.into_iter().next() else {
        return Err(PriceProviderError::NotFound);
    };

    let quote = result.indicators.quote.into_iter().next()
        .ok_or_else(|| PriceProviderError::BadResponse("No quote data in response".into()))?;

    if result.timestamp.len() != quote.close.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into()
        ));
    }

    let field = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    let mut points: Vec<ExternalPricePoint> = result.timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            // Skip null closes (market holidays, halted sessions)
            let close = field(&quote.close, i)?;
            let date = chrono::DateTime::from_timestamp(*ts, 0)?.date_naive();

            Some(ExternalPricePoint {
                date,
                open: field(&quote.open, i).unwrap_or(close),
                high: field(&quote.high, i).unwrap_or(close),
                low: field(&quote.low, i).unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten(),
            })
        })
        .collect();

    points.sort_by(|a, b| a.date.cmp(&b.date));

    if points.is_empty() {
        return Err(PriceProviderError::NotFound);
    }

    Ok(points)
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{}", ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", "1d"),
                ("range", range_for_days(days)),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", resp.status())));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_chart(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chart(json: &str) -> YahooChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let body = chart(r#"{
            "chart": {
                "result": [{
                    "timestamp": [1706140800, 1706227200, 1706486400],
                    "indicators": { "quote": [{
                        "open":   [100.0, null, 102.0],
                        "high":   [101.0, null, 103.5],
                        "low":    [99.0, null, 101.0],
                        "close":  [100.5, null, 103.0],
                        "volume": [1000, null, 1500]
                    }]}
                }],
                "error": null
            }
        }"#);

        let points = parse_chart(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
        assert_eq!(points[1].close, 103.0);
        assert_eq!(points[1].volume, Some(1500));
    }

    #[test]
    fn test_parse_chart_no_data_is_not_found() {
        let body = chart(r#"{
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" } }
        }"#);
        assert!(matches!(parse_chart(body), Err(PriceProviderError::NotFound)));
    }

    #[test]
    fn test_range_mapping() {
        assert_eq!(range_for_days(1), "5d");
        assert_eq!(range_for_days(60), "3mo");
        assert_eq!(range_for_days(5 * 365), "5y");
    }
}
