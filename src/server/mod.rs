//! HTTP surface: the placefile route and the instructions page.

mod error;
mod routes;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::feed::FeedFetcher;

pub use error::{FETCH_FAILED_MESSAGE, PARSE_FAILED_MESSAGE};

/// Immutable per-process state shared by all requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub fetcher: Arc<FeedFetcher>,
    pub cache_max_age_secs: u64,
}

impl AppState {
    pub fn new(fetcher: FeedFetcher, cache_max_age_secs: u64) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            cache_max_age_secs,
        }
    }
}

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(routes::index))
        .route("/alerts.txt", get(routes::alerts))
}
