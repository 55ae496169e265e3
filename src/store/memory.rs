use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::{KvStore, StoreBoxFuture, StoreError, StoreInfo, StoreResult};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// Process-local TTL map with the same semantics as the Redis store.
/// Expired entries are never returned and are dropped lazily.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.len()
    }

    fn approx_bytes(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .map(|(key, entry)| key.len() + entry.value.len())
            .sum()
    }
}

impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn ping<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<()>> {
        Box::pin(async move { Ok(()) })
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreBoxFuture<'a, StoreResult<Option<String>>> {
        Box::pin(async move { Ok(self.live_value(key)) })
    }

    fn set_ex<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let entry = MemoryEntry {
                value,
                expires_at: Some(Instant::now() + ttl),
            };
            self.entries.lock().insert(key.to_string(), entry);
            Ok(())
        })
    }

    fn incr_with_expiry<'a>(
        &'a self,
        key: &'a str,
        window: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<i64>> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.entries.lock();
            let current = match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    entry
                        .value
                        .parse::<i64>()
                        .map_err(|_| StoreError::InvalidValue {
                            key: key.to_string(),
                            value: entry.value.clone(),
                        })?
                }
                _ => 0,
            };
            let next = current + 1;
            entries.insert(
                key.to_string(),
                MemoryEntry {
                    value: next.to_string(),
                    expires_at: Some(now + window),
                },
            );
            Ok(next)
        })
    }

    fn size<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<i64>> {
        Box::pin(async move { Ok(self.purge_expired() as i64) })
    }

    fn info<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<StoreInfo>> {
        Box::pin(async move {
            self.purge_expired();
            Ok(StoreInfo {
                memory_used: human_bytes(self.approx_bytes()),
                connected_clients: 1,
            })
        })
    }
}

fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.2}{}", UNITS[unit])
    }
}
