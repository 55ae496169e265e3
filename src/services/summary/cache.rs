use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::models::summary::{SummaryLength, SummaryResult};
use crate::store::{SharedStore, StoreResult};

pub const CACHE_KEY_PREFIX: &str = "summary:";
pub const FINGERPRINT_PREFIX_CHARS: usize = 1000;

/// Cache key for a summary request. Only the first 1000 characters of the
/// text take part, so longer texts sharing that prefix share an entry.
pub fn fingerprint(text: &str, length: SummaryLength) -> String {
    let prefix: String = text.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(b":");
    hasher.update(length.as_str().as_bytes());
    format!("{CACHE_KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Best-effort summary cache. Store failures are logged and read as misses.
#[derive(Clone)]
pub struct SummaryCache {
    store: Option<SharedStore>,
    ttl: Duration,
}

impl SummaryCache {
    pub fn new(store: Option<SharedStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn lookup(&self, text: &str, length: SummaryLength) -> Option<SummaryResult> {
        let store = self.store.as_ref()?;
        let key = fingerprint(text, length);
        match read_entry(store, &key).await {
            Ok(Some(mut result)) => {
                info!("[CACHE] hit key={}", key);
                result.cached = true;
                Some(result)
            }
            Ok(None) => None,
            Err(err) => {
                error!("[CACHE] retrieval error: {}", err);
                None
            }
        }
    }

    pub async fn store(&self, text: &str, length: SummaryLength, result: &SummaryResult) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let key = fingerprint(text, length);
        match write_entry(store, &key, result, self.ttl).await {
            Ok(()) => info!("[CACHE] summary cached key={}", key),
            Err(err) => error!("[CACHE] storage error: {}", err),
        }
    }
}

async fn read_entry(store: &SharedStore, key: &str) -> StoreResult<Option<SummaryResult>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

async fn write_entry(
    store: &SharedStore,
    key: &str,
    result: &SummaryResult,
    ttl: Duration,
) -> StoreResult<()> {
    let raw = serde_json::to_string(result)?;
    store.set_ex(key, raw, ttl).await
}
