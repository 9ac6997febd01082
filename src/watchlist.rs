// src/watchlist.rs
use crate::models::Quote;
use serde::Serialize;

pub const MAX_SYMBOLS: usize = 20;

pub const DEFAULT_SYMBOLS: [&str; 4] = ["AAPL", "MSFT", "GOOGL", "TSLA"];

/// Trims and uppercases user input. Returns `None` when nothing is left.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// Ordered, duplicate-free list of tracked symbols, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Watchlist {
    symbols: Vec<String>,
}

impl Watchlist {
    /// Builds a watchlist keeping the given order. Blank and repeated entries
    /// are dropped and the result is capped at `MAX_SYMBOLS`.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Watchlist {
            symbols: Vec::new(),
        };
        for raw in symbols {
            if list.symbols.len() == MAX_SYMBOLS {
                break;
            }
            if let Some(symbol) = normalize_symbol(raw.as_ref()) {
                if !list.contains(&symbol) {
                    list.symbols.push(symbol);
                }
            }
        }
        list
    }

    /// Prepends the normalized symbol. Returns false (and changes nothing)
    /// for blank input or a symbol already tracked.
    pub fn add(&mut self, raw: &str) -> bool {
        let Some(symbol) = normalize_symbol(raw) else {
            return false;
        };
        if self.contains(&symbol) {
            return false;
        }
        self.symbols.insert(0, symbol);
        self.symbols.truncate(MAX_SYMBOLS);
        true
    }

    pub fn remove(&mut self, raw: &str) -> Option<String> {
        let symbol = normalize_symbol(raw)?;
        let index = self.symbols.iter().position(|s| *s == symbol)?;
        Some(self.symbols.remove(index))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Watchlist::new(DEFAULT_SYMBOLS)
    }
}

/// Result of the last applied refresh cycle, keyed by the symbols that were
/// requested. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSet {
    entries: Vec<(String, Quote)>,
}

impl QuoteSet {
    /// Pairs `quotes[i]` with `symbols[i]`.
    pub fn from_batch(symbols: &[String], quotes: Vec<Quote>) -> Self {
        QuoteSet {
            entries: symbols.iter().cloned().zip(quotes).collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.entries
            .iter()
            .find(|(key, _)| key == symbol)
            .map(|(_, quote)| quote)
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.entries.iter().map(|(_, quote)| quote.clone()).collect()
    }
}
