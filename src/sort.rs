// src/sort.rs
use crate::models::Quote;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Symbol,
    Price,
    Change,
}

impl SortKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortKey::Symbol => "symbol",
            SortKey::Price => "price",
            SortKey::Change => "change",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "symbol" => Ok(SortKey::Symbol),
            "price" => Ok(SortKey::Price),
            "change" => Ok(SortKey::Change),
            other => Err(format!("unknown sort column: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOrder {
    pub sort_by: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn new(sort_by: SortKey, direction: SortDirection) -> Self {
        SortOrder { sort_by, direction }
    }

    /// Clicking the active column flips direction; any other column starts
    /// ascending.
    pub fn toggle(self, column: SortKey) -> Self {
        if self.sort_by == column {
            SortOrder::new(column, self.direction.toggled())
        } else {
            SortOrder::new(column, SortDirection::Asc)
        }
    }
}

// Missing values rank below every defined one.
fn numeric_key(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NEG_INFINITY)
}

fn compare(a: &Quote, b: &Quote, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::Price => numeric_key(a.price).total_cmp(&numeric_key(b.price)),
        SortKey::Change => {
            numeric_key(a.change_percent).total_cmp(&numeric_key(b.change_percent))
        }
    }
}

/// Returns a newly ordered copy of `quotes`. Ties keep their input order in
/// both directions.
pub fn sorted_view(quotes: &[Quote], order: SortOrder) -> Vec<Quote> {
    let mut sorted = quotes.to_vec();
    sorted.sort_by(|a, b| match order.direction {
        SortDirection::Asc => compare(a, b, order.sort_by),
        SortDirection::Desc => compare(a, b, order.sort_by).reverse(),
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: Option<f64>, change: Option<f64>) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            change_percent: change,
        }
    }

    fn symbols(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.symbol.as_str()).collect()
    }

    fn sample() -> Vec<Quote> {
        vec![
            quote("MSFT", Some(300.0), Some(-0.5)),
            quote("ZZZ", None, None),
            quote("AAPL", Some(150.0), Some(1.25)),
            quote("NEG", Some(-5.0), Some(3.0)),
        ]
    }

    #[test]
    fn sorts_by_symbol() {
        let asc = sorted_view(&sample(), SortOrder::new(SortKey::Symbol, SortDirection::Asc));
        assert_eq!(symbols(&asc), ["AAPL", "MSFT", "NEG", "ZZZ"]);
        let desc = sorted_view(&sample(), SortOrder::new(SortKey::Symbol, SortDirection::Desc));
        assert_eq!(symbols(&desc), ["ZZZ", "NEG", "MSFT", "AAPL"]);
    }

    #[test]
    fn missing_price_sorts_first_ascending() {
        let asc = sorted_view(&sample(), SortOrder::new(SortKey::Price, SortDirection::Asc));
        assert_eq!(symbols(&asc), ["ZZZ", "NEG", "AAPL", "MSFT"]);
    }

    #[test]
    fn missing_price_sorts_last_descending() {
        let desc = sorted_view(&sample(), SortOrder::new(SortKey::Price, SortDirection::Desc));
        assert_eq!(symbols(&desc), ["MSFT", "AAPL", "NEG", "ZZZ"]);
    }

    #[test]
    fn sorts_by_change() {
        let asc = sorted_view(&sample(), SortOrder::new(SortKey::Change, SortDirection::Asc));
        assert_eq!(symbols(&asc), ["ZZZ", "MSFT", "AAPL", "NEG"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let quotes = vec![
            quote("B", Some(1.0), None),
            quote("A", Some(1.0), None),
            quote("C", None, None),
            quote("D", None, None),
        ];
        let asc = sorted_view(&quotes, SortOrder::new(SortKey::Price, SortDirection::Asc));
        assert_eq!(symbols(&asc), ["C", "D", "B", "A"]);
        let desc = sorted_view(&quotes, SortOrder::new(SortKey::Price, SortDirection::Desc));
        assert_eq!(symbols(&desc), ["B", "A", "C", "D"]);
    }

    #[test]
    fn is_pure() {
        let input = sample();
        let order = SortOrder::new(SortKey::Price, SortDirection::Desc);
        let first = sorted_view(&input, order);
        let second = sorted_view(&input, order);
        assert_eq!(first, second);
        assert_eq!(input, sample());
    }

    #[test]
    fn toggle_flips_active_column_and_resets_others() {
        let order = SortOrder::default();
        let flipped = order.toggle(SortKey::Symbol);
        assert_eq!(flipped, SortOrder::new(SortKey::Symbol, SortDirection::Desc));
        let switched = flipped.toggle(SortKey::Price);
        assert_eq!(switched, SortOrder::new(SortKey::Price, SortDirection::Asc));
    }

    #[test]
    fn parses_column_names() {
        assert_eq!("Price".parse::<SortKey>(), Ok(SortKey::Price));
        assert!("volume".parse::<SortKey>().is_err());
    }
}
