// src/main.rs
use clap::Parser;
use env_logger::Builder;
use log::{error, info, warn};
use stock_dashboard::api;
use stock_dashboard::config::Settings;
use stock_dashboard::quote_client::{QuoteClient, QuoteSource};
use stock_dashboard::store::WatchlistStore;
use tokio::task;
use tokio::time::{self, Duration, MissedTickBehavior};

async fn worker<S: QuoteSource + 'static>(store: WatchlistStore<S>, period: Option<Duration>) {
    if let Err(e) = store.refresh_watchlist().await {
        error!("Initial refresh failed: {}", e);
    }
    let Some(period) = period else {
        return;
    };

    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial refresh already ran.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = store.refresh_watchlist().await {
            warn!("Scheduled refresh failed: {}", e);
        }
    }
}

#[tokio::main]
async fn main() {
    let settings = Settings::parse();
    Builder::new()
        .filter_level(settings.log_level)
        .format_timestamp_secs()
        .init();

    info!("Starting the stock dashboard...");
    let client = QuoteClient::new(&settings.base_url, &settings.api_key);
    let store = WatchlistStore::new(
        client,
        settings.initial_watchlist(),
        settings.series_points,
    );
    info!("Tracking {}", store.watchlist().join(", "));

    task::spawn(worker(store.clone(), settings.refresh_interval()));

    let api = api::routes(store);

    info!("Server running on http://{}", settings.bind);
    warp::serve(api).run(settings.bind).await;
}
