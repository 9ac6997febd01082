#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stock_dashboard::{FetchError, PricePoint, PriceSeries, Quote, QuoteSource, Result};
use tokio::sync::Notify;

/// In-memory `QuoteSource` with per-symbol failures and gates that hold a
/// request until the test releases it.
#[derive(Default)]
pub struct FakeSource {
    quotes: Mutex<HashMap<String, Quote>>,
    failing: Mutex<HashSet<String>>,
    series: Mutex<HashMap<String, PriceSeries>>,
    quote_gates: Mutex<HashMap<String, Arc<Notify>>>,
    series_gates: Mutex<HashMap<String, Arc<Notify>>>,
    quote_calls: AtomicUsize,
    series_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, symbol: &str, price: f64, change_percent: f64) -> Self {
        self.quotes.lock().unwrap().insert(
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                price: Some(price),
                change_percent: Some(change_percent),
            },
        );
        self
    }

    pub fn with_series(self, symbol: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .zip(start.iter_days())
            .map(|(close, date)| PricePoint {
                date,
                close: *close,
            })
            .collect();
        self.series.lock().unwrap().insert(
            symbol.to_string(),
            PriceSeries {
                symbol: symbol.to_string(),
                points,
            },
        );
        self
    }

    pub fn failing(self, symbol: &str) -> Self {
        self.set_failing(symbol, true);
        self
    }

    pub fn set_failing(&self, symbol: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(symbol.to_string());
        } else {
            set.remove(symbol);
        }
    }

    pub fn gate_quote(&self, symbol: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.quote_gates
            .lock()
            .unwrap()
            .insert(symbol.to_string(), gate.clone());
        gate
    }

    pub fn gate_series(&self, symbol: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.series_gates
            .lock()
            .unwrap()
            .insert(symbol.to_string(), gate.clone());
        gate
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn series_calls(&self) -> usize {
        self.series_calls.load(Ordering::SeqCst)
    }

    fn failure() -> FetchError {
        FetchError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.quote_gates.lock().unwrap().get(symbol).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(Self::failure());
        }
        let quote = self.quotes.lock().unwrap().get(symbol).cloned();
        Ok(quote.unwrap_or_else(|| Quote::empty(symbol)))
    }

    async fn fetch_daily_series(&self, symbol: &str, count: usize) -> Result<PriceSeries> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.series_gates.lock().unwrap().get(symbol).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(Self::failure());
        }
        let series = self.series.lock().unwrap().get(symbol).cloned();
        match series {
            Some(mut series) => {
                let skip = series.points.len().saturating_sub(count);
                series.points.drain(..skip);
                Ok(series)
            }
            None => Err(FetchError::MissingSeries(symbol.to_string())),
        }
    }
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
