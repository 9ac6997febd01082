// src/config.rs
use crate::quote_client::DEFAULT_BASE_URL;
use crate::watchlist::Watchlist;
use clap::Parser;
use log::LevelFilter;
use std::net::SocketAddr;
use std::time::Duration;

/// Command-line and environment settings.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Stock watch-list dashboard backed by Alpha Vantage", long_about = None)]
pub struct Settings {
    /// Alpha Vantage API key.
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Provider base URL; the `/query` path is appended.
    #[arg(long, env = "ALPHAVANTAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Address the HTTP API listens on.
    #[arg(long, env = "DASHBOARD_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Initial watchlist, comma separated.
    #[arg(
        long,
        env = "DASHBOARD_SYMBOLS",
        value_delimiter = ',',
        default_value = "AAPL,MSFT,GOOGL,TSLA"
    )]
    pub symbols: Vec<String>,

    /// Number of daily closes shown for the selected symbol.
    #[arg(long, env = "DASHBOARD_SERIES_POINTS", default_value_t = 40)]
    pub series_points: usize,

    /// Seconds between background refreshes; 0 disables them.
    #[arg(long, env = "DASHBOARD_REFRESH_INTERVAL_SECS", default_value_t = 0)]
    pub refresh_interval_secs: u64,

    #[arg(long, env = "DASHBOARD_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn initial_watchlist(&self) -> Watchlist {
        Watchlist::new(&self.symbols)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}
