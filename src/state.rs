use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::rate_limiter::RateLimiter;
use crate::services::summary::{
    ModelLoader, ModelManager, SummarizerClient, SummaryCache, SummaryEngine,
};
use crate::store::SharedStore;

/// Everything a handler needs, built once at startup. `store` is `None` when
/// the key-value store was unreachable; cache and rate limiter then no-op.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Option<SharedStore>,
    pub engine: SummaryEngine,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, store: Option<SharedStore>, loader: Arc<dyn ModelLoader>) -> Self {
        let models = Arc::new(ModelManager::new(loader));
        let cache = SummaryCache::new(store.clone(), Duration::from_secs(config.cache_ttl_secs));
        let rate_limiter = RateLimiter::new(
            store.clone(),
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        );

        Self {
            config: Arc::new(config),
            store,
            engine: SummaryEngine::new(cache, SummarizerClient::new(models)),
            rate_limiter,
        }
    }

    pub fn store_status(&self) -> &'static str {
        if self.store.is_some() {
            "connected"
        } else {
            "disconnected"
        }
    }
}
