use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend};

pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

pub type StoreBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Handle shared by the cache and the rate limiter. `None` at the call site
/// means the store was unavailable at startup and both features are off.
pub type SharedStore = Arc<dyn KvStore>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid value for key {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub memory_used: String,
    pub connected_clients: i64,
}

pub trait KvStore: Send + Sync {
    fn name(&self) -> &'static str;

    fn ping<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<()>>;

    fn get<'a>(&'a self, key: &'a str) -> StoreBoxFuture<'a, StoreResult<Option<String>>>;

    fn set_ex<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<()>>;

    /// Increments the counter and resets its expiry as a single atomic step.
    /// Returns the counter value after the increment.
    fn incr_with_expiry<'a>(
        &'a self,
        key: &'a str,
        window: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<i64>>;

    fn size<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<i64>>;

    fn info<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<StoreInfo>>;
}

/// Connects the configured backend once at startup. Any failure leaves the
/// process running without a store.
pub async fn connect(cfg: &Config) -> Option<SharedStore> {
    match cfg.store_backend {
        StoreBackend::Memory => {
            info!("[STORE] using in-process memory store");
            Some(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let timeout = Duration::from_secs(cfg.redis_socket_timeout_secs.max(1));
            match RedisStore::connect(&cfg.redis_url(), timeout).await {
                Ok(store) => {
                    info!(
                        "[STORE] Redis connected successfully: {}:{}/{}",
                        cfg.redis_host, cfg.redis_port, cfg.redis_db
                    );
                    Some(Arc::new(store))
                }
                Err(err) => {
                    warn!("[STORE] Redis not available - caching disabled: {:#}", err);
                    None
                }
            }
        }
    }
}
