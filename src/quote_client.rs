// src/quote_client.rs
use crate::error::{FetchError, Result};
use crate::models::{PricePoint, PriceSeries, Quote};
use crate::watchlist::normalize_symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Where the store gets its data from. `QuoteClient` is the production
/// implementation.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;

    async fn fetch_daily_series(&self, symbol: &str, count: usize) -> Result<PriceSeries>;
}

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: Option<String>,
}

#[derive(Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_percent(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    parse_decimal(Some(raw.strip_suffix('%').unwrap_or(raw)))
}

impl GlobalQuote {
    fn into_quote(self, requested: &str) -> Quote {
        let symbol = self
            .symbol
            .as_deref()
            .and_then(normalize_symbol)
            .unwrap_or_else(|| requested.trim().to_uppercase());
        Quote {
            symbol,
            price: parse_decimal(self.price.as_deref()),
            change_percent: parse_percent(self.change_percent.as_deref()),
        }
    }
}

/// Alpha Vantage HTTP client.
#[derive(Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl QuoteClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        QuoteClient::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        QuoteClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn query<T: DeserializeOwned>(&self, function: &str, symbol: &str) -> Result<T> {
        let url = format!("{}/query", self.base_url);
        debug!("Requesting {} for {}", function, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", function),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Provider returned HTTP {} for {} {}", status, function, symbol);
            return Err(FetchError::Status { status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches the current quote. A response without the `Global Quote`
    /// envelope means the provider has no data, which is not an error.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let response: GlobalQuoteResponse = self.query("GLOBAL_QUOTE", symbol).await?;
        if let Some(message) = response.note.or(response.information) {
            warn!("Provider message for {}: {}", symbol, message);
        }
        let quote = match response.global_quote {
            Some(raw) => raw.into_quote(symbol),
            None => Quote::empty(symbol.trim().to_uppercase()),
        };
        if !quote.has_data() {
            info!("No quote data for {}", quote.symbol);
        }
        Ok(quote)
    }

    /// Fetches daily closes and keeps the `count` most recent, oldest first.
    pub async fn fetch_daily_series(&self, symbol: &str, count: usize) -> Result<PriceSeries> {
        let response: DailySeriesResponse = self.query("TIME_SERIES_DAILY", symbol).await?;
        let symbol = symbol.trim().to_uppercase();
        let Some(time_series) = response.time_series else {
            if let Some(message) = response.note.or(response.information) {
                warn!("Provider message for {}: {}", symbol, message);
            }
            return Err(FetchError::MissingSeries(symbol));
        };

        let mut points: Vec<PricePoint> = time_series
            .into_iter()
            .filter_map(|(date, bar)| {
                let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok();
                match (parsed, parse_decimal(bar.close.as_deref())) {
                    (Some(date), Some(close)) => Some(PricePoint { date, close }),
                    _ => {
                        debug!("Skipping unparsable bar {} for {}", date, symbol);
                        None
                    }
                }
            })
            .collect();
        points.sort_by_key(|point| point.date);
        let skip = points.len().saturating_sub(count);
        points.drain(..skip);

        info!("Fetched {} daily closes for {}", points.len(), symbol);
        Ok(PriceSeries { symbol, points })
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        QuoteClient::fetch_quote(self, symbol).await
    }

    async fn fetch_daily_series(&self, symbol: &str, count: usize) -> Result<PriceSeries> {
        QuoteClient::fetch_daily_series(self, symbol, count).await
    }
}
