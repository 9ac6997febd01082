// src/api.rs
use crate::error::ApiError;
use crate::quote_client::QuoteSource;
use crate::sort::{SortDirection, SortKey, SortOrder};
use crate::state::RefreshOutcome;
use crate::store::WatchlistStore;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
pub struct AddSymbolRequest {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuotesQuery {
    pub sort_by: Option<SortKey>,
    pub direction: Option<SortDirection>,
}

pub fn routes<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let dashboard = warp::path!("dashboard")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(dashboard_handler);

    let add = warp::path!("watchlist")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and(warp::body::json())
        .and_then(add_symbol_handler);

    let remove = warp::path!("watchlist" / String)
        .and(warp::delete())
        .and(with_store(store.clone()))
        .and_then(remove_symbol_handler);

    let refresh = warp::path!("refresh")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and_then(refresh_handler);

    let quotes = warp::path!("quotes")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and(warp::query::<QuotesQuery>())
        .and_then(quotes_handler);

    let sort = warp::path!("sort" / SortKey)
        .and(warp::post())
        .and(with_store(store.clone()))
        .and_then(sort_handler);

    let select = warp::path!("selection")
        .and(warp::put())
        .and(with_store(store.clone()))
        .and(warp::body::json())
        .and_then(select_handler);

    let chart = warp::path!("chart")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(chart_handler);

    let dismiss = warp::path!("error")
        .and(warp::delete())
        .and(with_store(store))
        .and_then(dismiss_error_handler);

    dashboard
        .or(add)
        .or(remove)
        .or(refresh)
        .or(quotes)
        .or(sort)
        .or(select)
        .or(chart)
        .or(dismiss)
        .recover(handle_rejection)
}

fn with_store<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> impl Filter<Extract = (WatchlistStore<S>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn spawn_refresh<S: QuoteSource + 'static>(store: WatchlistStore<S>) {
    tokio::spawn(async move {
        if let Err(e) = store.refresh_watchlist().await {
            warn!("Background refresh failed: {}", e);
        }
    });
}

async fn dashboard_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&store.snapshot()))
}

async fn add_symbol_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
    request: AddSymbolRequest,
) -> Result<impl Reply, Rejection> {
    let added = store.add_symbol(&request.symbol);
    let snapshot = store.snapshot();
    let status = if added {
        spawn_refresh(store);
        StatusCode::CREATED
    } else {
        info!("Ignoring blank or duplicate symbol {:?}", request.symbol);
        StatusCode::OK
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&snapshot),
        status,
    ))
}

async fn remove_symbol_handler<S: QuoteSource + 'static>(
    symbol: String,
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    if !store.remove_symbol(&symbol) {
        return Err(warp::reject::custom(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("{} is not in the watchlist", symbol.trim().to_uppercase()),
        }));
    }
    let snapshot = store.snapshot();
    spawn_refresh(store);
    Ok(warp::reply::json(&snapshot))
}

async fn refresh_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    match store.refresh_watchlist().await {
        Ok(RefreshOutcome::Applied) => {
            info!("Quotes refreshed successfully.");
            Ok(warp::reply::json(&store.snapshot()))
        }
        Ok(RefreshOutcome::Superseded) => {
            info!("Refresh superseded by a newer one.");
            Ok(warp::reply::json(&store.snapshot()))
        }
        Err(e) => {
            error!("Failed to refresh quotes: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

async fn quotes_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
    query: QuotesQuery,
) -> Result<impl Reply, Rejection> {
    let stored = store.sort();
    let order = SortOrder::new(
        query.sort_by.unwrap_or(stored.sort_by),
        query.direction.unwrap_or(stored.direction),
    );
    Ok(warp::reply::json(&store.sorted_quotes(Some(order))))
}

async fn sort_handler<S: QuoteSource + 'static>(
    column: SortKey,
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    let order = store.toggle_sort(column);
    info!("Sorting by {} {:?}", order.sort_by, order.direction);
    Ok(warp::reply::json(&store.snapshot()))
}

async fn select_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
    request: SelectRequest,
) -> Result<impl Reply, Rejection> {
    let ticket = store.begin_select(request.symbol.as_deref());
    let chart = store.chart();
    if let Some(ticket) = ticket {
        tokio::spawn(async move {
            store.load_series(ticket).await;
        });
    }
    Ok(warp::reply::json(&chart))
}

async fn chart_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&store.chart()))
}

async fn dismiss_error_handler<S: QuoteSource + 'static>(
    store: WatchlistStore<S>,
) -> Result<impl Reply, Rejection> {
    store.dismiss_error();
    Ok(warp::reply::with_status(
        "Error dismissed",
        StatusCode::OK,
    ))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<ApiError>() {
        (e.status, e.message.clone())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
