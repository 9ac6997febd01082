// src/lib.rs
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod quote_client;
pub mod sort;
pub mod state;
pub mod store;
pub mod watchlist;

pub use error::{FetchError, Result};
pub use models::{ChartState, PricePoint, PriceSeries, Quote};
pub use quote_client::{QuoteClient, QuoteSource};
pub use store::WatchlistStore;
pub use watchlist::Watchlist;
