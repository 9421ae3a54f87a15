mod error;
use std::sync::Arc;

pub use error::{AppError, Result};
pub mod config;
pub mod converter;
pub mod currency_service;
pub mod dashboard;
pub mod models;
pub mod render;
mod routes;
pub mod utils;

use axum::Router;
use config::Config;
use currency_service::{HttpRateFetcher, RateFetcher};
use models::AppState;

/// Router of the whole service over an already built state
pub fn app(state: AppState) -> Router {
    routes::init(state)
}

/// State wired to the real upstream API
pub fn live_state(config: Config) -> Result<AppState> {
    let fetcher: Arc<dyn RateFetcher> = Arc::new(HttpRateFetcher::new(&config.api_base)?);
    Ok(AppState::new(config, fetcher))
}
