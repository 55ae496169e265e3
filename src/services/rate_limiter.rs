use std::time::Duration;

use tracing::{error, warn};

use crate::store::{SharedStore, StoreError, StoreResult};

pub const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Rejected,
}

/// Fixed-window request counter per client. The window restarts on the first
/// increment after the previous one expired, so bursts straddling a boundary
/// may reach twice the nominal rate.
#[derive(Clone)]
pub struct RateLimiter {
    store: Option<SharedStore>,
    max_requests: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Option<SharedStore>, max_requests: i64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> i64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fails open: without a store, or when the store errors, the request is allowed.
    pub async fn allow(&self, client_id: &str) -> RateDecision {
        let Some(store) = self.store.as_ref() else {
            return RateDecision::Allowed;
        };
        let key = format!("{RATE_LIMIT_KEY_PREFIX}{client_id}");
        match self.check(store, &key).await {
            Ok(decision) => decision,
            Err(err) => {
                error!("[RATE] rate limit error for {}: {}", client_id, err);
                RateDecision::Allowed
            }
        }
    }

    async fn check(&self, store: &SharedStore, key: &str) -> StoreResult<RateDecision> {
        if let Some(raw) = store.get(key).await? {
            let current = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| StoreError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                })?;
            if current >= self.max_requests {
                warn!(
                    "[RATE] limit exceeded key={} count={} max={}",
                    key, current, self.max_requests
                );
                return Ok(RateDecision::Rejected);
            }
        }

        store.incr_with_expiry(key, self.window).await?;
        Ok(RateDecision::Allowed)
    }
}
