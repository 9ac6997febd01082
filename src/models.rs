// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Latest known price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
}

impl Quote {
    /// A quote the provider had no data for.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Quote {
            symbol: symbol.into(),
            price: None,
            change_percent: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.price.is_some() || self.change_percent.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// What the chart area should show for the current selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ChartState {
    #[default]
    None,
    Loading { symbol: String },
    Ready { series: PriceSeries },
    Unavailable { symbol: String },
}

impl ChartState {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            ChartState::None => None,
            ChartState::Loading { symbol } | ChartState::Unavailable { symbol } => Some(symbol),
            ChartState::Ready { series } => Some(&series.symbol),
        }
    }
}
