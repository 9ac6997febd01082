// src/store.rs
use crate::error::{FetchError, Result};
use crate::models::{ChartState, Quote};
use crate::quote_client::QuoteSource;
use crate::sort::{SortKey, SortOrder};
use crate::state::{
    DashboardSnapshot, DashboardState, RefreshOutcome, RefreshTicket, SelectionTicket,
};
use crate::watchlist::Watchlist;
use futures::future::join_all;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Clears the loading flag if a refresh future is dropped before finishing.
struct PendingRefresh<'a> {
    state: &'a Mutex<DashboardState>,
    ticket: Option<RefreshTicket>,
}

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            warn!("Refresh dropped before completion");
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abandon_refresh(ticket);
        }
    }
}

/// Shared handle over the dashboard state and the quote source.
///
/// Cloning is cheap; all clones see the same state.
pub struct WatchlistStore<S> {
    source: Arc<S>,
    state: Arc<Mutex<DashboardState>>,
    series_points: usize,
}

impl<S> Clone for WatchlistStore<S> {
    fn clone(&self) -> Self {
        WatchlistStore {
            source: self.source.clone(),
            state: self.state.clone(),
            series_points: self.series_points,
        }
    }
}

impl<S: QuoteSource + 'static> WatchlistStore<S> {
    pub fn new(source: S, watchlist: Watchlist, series_points: usize) -> Self {
        WatchlistStore {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(DashboardState::new(watchlist))),
            series_points,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // Never held across an await.
    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().snapshot()
    }

    pub fn watchlist(&self) -> Vec<String> {
        self.lock().watchlist().symbols().to_vec()
    }

    pub fn chart(&self) -> ChartState {
        self.lock().chart().clone()
    }

    pub fn sort(&self) -> SortOrder {
        self.lock().sort()
    }

    pub fn quote(&self, symbol: &str) -> Option<Quote> {
        self.lock().quotes().get(symbol).cloned()
    }

    /// Sorted copy of the current quotes; `None` uses the stored preference.
    pub fn sorted_quotes(&self, order: Option<SortOrder>) -> Vec<Quote> {
        let state = self.lock();
        let order = order.unwrap_or_else(|| state.sort());
        state.sorted_quotes(order)
    }

    /// Does not fetch; callers refresh when this returns true.
    pub fn add_symbol(&self, raw: &str) -> bool {
        let added = self.lock().add_symbol(raw);
        if added {
            info!("Added {} to watchlist", raw.trim().to_uppercase());
        }
        added
    }

    pub fn remove_symbol(&self, raw: &str) -> bool {
        let removed = self.lock().remove_symbol(raw);
        if removed {
            info!("Removed {} from watchlist", raw.trim().to_uppercase());
        }
        removed
    }

    pub fn toggle_sort(&self, column: SortKey) -> SortOrder {
        self.lock().toggle_sort(column)
    }

    pub fn dismiss_error(&self) {
        self.lock().dismiss_error();
    }

    /// Fetches every symbol concurrently and waits for all of them.
    ///
    /// The batch is all-or-nothing: one failed fetch fails the refresh and
    /// leaves the previous quotes in place. Results of a refresh that was
    /// overtaken by a later one are dropped.
    pub async fn refresh(&self, symbols: &[String]) -> Result<RefreshOutcome> {
        let ticket = self.lock().begin_refresh();
        let mut pending = PendingRefresh {
            state: &self.state,
            ticket: Some(ticket),
        };
        info!("Refreshing {} quotes", symbols.len());

        let results = join_all(symbols.iter().map(|s| self.source.fetch_quote(s))).await;
        let total = results.len();
        let mut quotes = Vec::with_capacity(total);
        let mut failed = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(quote) => quotes.push(quote),
                Err(err) => {
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        let batch = match first_error {
            None => Ok(quotes),
            Some(source) => {
                error!("{} of {} quote requests failed: {}", failed, total, source);
                Err(FetchError::Refresh {
                    failed,
                    total,
                    source: Box::new(source),
                })
            }
        };

        pending.ticket = None;
        self.lock().finish_refresh(ticket, symbols, batch)
    }

    pub async fn refresh_watchlist(&self) -> Result<RefreshOutcome> {
        let symbols = self.watchlist();
        self.refresh(&symbols).await
    }

    /// Changes the selection without fetching. Pair with `load_series`.
    pub fn begin_select(&self, symbol: Option<&str>) -> Option<SelectionTicket> {
        self.lock().select(symbol)
    }

    /// Fetches the series for a selection. Returns whether it was applied;
    /// it is not if the selection changed while the request was in flight.
    pub async fn load_series(&self, ticket: SelectionTicket) -> bool {
        let result = self
            .source
            .fetch_daily_series(ticket.symbol(), self.series_points)
            .await;
        if let Err(err) = &result {
            warn!("Chart data unavailable for {}: {}", ticket.symbol(), err);
        }
        self.lock().apply_series(&ticket, result)
    }

    /// Selects a symbol and waits for its series.
    pub async fn select(&self, symbol: Option<&str>) -> ChartState {
        if let Some(ticket) = self.begin_select(symbol) {
            self.load_series(ticket).await;
        }
        self.chart()
    }
}
