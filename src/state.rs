// src/state.rs
use crate::error::{FetchError, Result};
use crate::models::{ChartState, PriceSeries, Quote};
use crate::sort::{sorted_view, SortKey, SortOrder};
use crate::watchlist::{normalize_symbol, QuoteSet, Watchlist};
use log::debug;
use serde::Serialize;

/// Handed out when a refresh cycle starts; required to apply its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Handed out when a symbol is selected; required to apply its series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    symbol: String,
}

impl SelectionTicket {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A later refresh started before this one finished; results dropped.
    Superseded,
}

/// Read-only copy of the state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub watchlist: Vec<String>,
    pub quotes: Vec<Quote>,
    pub sort: SortOrder,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<String>,
    pub chart: ChartState,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    watchlist: Watchlist,
    quotes: QuoteSet,
    sort: SortOrder,
    loading: bool,
    error: Option<String>,
    refresh_generation: u64,
    selected: Option<String>,
    selection_generation: u64,
    chart: ChartState,
}

impl DashboardState {
    pub fn new(watchlist: Watchlist) -> Self {
        DashboardState {
            watchlist,
            ..Default::default()
        }
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn quotes(&self) -> &QuoteSet {
        &self.quotes
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn add_symbol(&mut self, raw: &str) -> bool {
        self.watchlist.add(raw)
    }

    /// Removes a symbol and clears the chart if it was the one selected.
    pub fn remove_symbol(&mut self, raw: &str) -> bool {
        let Some(removed) = self.watchlist.remove(raw) else {
            return false;
        };
        if self.selected.as_deref() == Some(removed.as_str()) {
            self.select(None);
        }
        true
    }

    pub fn toggle_sort(&mut self, column: SortKey) -> SortOrder {
        self.sort = self.sort.toggle(column);
        self.sort
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refresh_generation += 1;
        self.loading = true;
        RefreshTicket(self.refresh_generation)
    }

    /// Nothing is applied unless `ticket` is the newest refresh. A failed
    /// batch leaves the quote set untouched.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        symbols: &[String],
        result: Result<Vec<Quote>>,
    ) -> Result<RefreshOutcome> {
        let current = ticket.0 == self.refresh_generation;
        if current {
            self.loading = false;
        }
        match result {
            Ok(quotes) if current => {
                self.quotes = QuoteSet::from_batch(symbols, quotes);
                self.error = None;
                Ok(RefreshOutcome::Applied)
            }
            Ok(_) => {
                debug!("Dropping results of superseded refresh #{}", ticket.0);
                Ok(RefreshOutcome::Superseded)
            }
            Err(err) => {
                if current {
                    self.error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// A refresh that will never finish. Quotes and error are left as is.
    pub fn abandon_refresh(&mut self, ticket: RefreshTicket) {
        if ticket.0 == self.refresh_generation {
            self.loading = false;
        }
    }

    /// Changes the selection. Returns a ticket when a series should be
    /// fetched; `None` when the selection was cleared or did not change.
    pub fn select(&mut self, raw: Option<&str>) -> Option<SelectionTicket> {
        let symbol = raw.and_then(normalize_symbol);
        if symbol.is_some() && symbol == self.selected {
            return None;
        }
        self.selection_generation += 1;
        self.selected = symbol.clone();
        match symbol {
            Some(symbol) => {
                self.chart = ChartState::Loading {
                    symbol: symbol.clone(),
                };
                Some(SelectionTicket {
                    generation: self.selection_generation,
                    symbol,
                })
            }
            None => {
                self.chart = ChartState::None;
                None
            }
        }
    }

    /// Applies a fetched series if the selection has not changed since the
    /// ticket was issued. A failed fetch degrades to "no chart available".
    pub fn apply_series(
        &mut self,
        ticket: &SelectionTicket,
        result: Result<PriceSeries, FetchError>,
    ) -> bool {
        if ticket.generation != self.selection_generation {
            debug!("Discarding stale series for {}", ticket.symbol);
            return false;
        }
        self.chart = match result {
            Ok(series) => ChartState::Ready { series },
            Err(_) => ChartState::Unavailable {
                symbol: ticket.symbol.clone(),
            },
        };
        true
    }

    pub fn sorted_quotes(&self, order: SortOrder) -> Vec<Quote> {
        sorted_view(&self.quotes.quotes(), order)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            watchlist: self.watchlist.symbols().to_vec(),
            quotes: self.sorted_quotes(self.sort),
            sort: self.sort,
            loading: self.loading,
            error: self.error.clone(),
            selected: self.selected.clone(),
            chart: self.chart.clone(),
        }
    }
}
