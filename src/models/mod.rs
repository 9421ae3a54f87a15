mod currency;
mod history;
mod view;
pub use currency::*;
pub use history::*;
pub use view::*;

use std::sync::Arc;

use crate::config::Config;
use crate::currency_service::RateFetcher;
use crate::dashboard::SessionRegistry;

/// Shared data of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CurrencyCatalog>,
    pub fetcher: Arc<dyn RateFetcher>,
    pub sessions: SessionRegistry,
}
impl AppState {
    pub fn new(config: Config, fetcher: Arc<dyn RateFetcher>) -> Self {
        let config = Arc::new(config);
        let catalog = Arc::new(CurrencyCatalog::default());
        let sessions = SessionRegistry::new(config.clone(), catalog.clone(), fetcher.clone());
        Self {
            config,
            catalog,
            fetcher,
            sessions,
        }
    }
}
