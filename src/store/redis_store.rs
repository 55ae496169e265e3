use std::time::Duration;

use anyhow::Context;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::{KvStore, StoreBoxFuture, StoreInfo, StoreResult};

/// Redis-backed store over one multiplexed connection. Clones of the
/// connection share the underlying socket.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(url).context("invalid redis url")?;
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(timeout, timeout)
            .await
            .context("connect to redis")?;
        let store = Self { conn };
        store.ping().await.context("ping redis")?;
        Ok(store)
    }
}

impl KvStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn ping<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreBoxFuture<'a, StoreResult<Option<String>>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
    }

    fn set_ex<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            Ok(())
        })
    }

    fn incr_with_expiry<'a>(
        &'a self,
        key: &'a str,
        window: Duration,
    ) -> StoreBoxFuture<'a, StoreResult<i64>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let seconds = window.as_secs().max(1) as i64;
            let (count, _): (i64, i64) = redis::pipe()
                .atomic()
                .incr(key, 1)
                .expire(key, seconds)
                .query_async(&mut conn)
                .await?;
            Ok(count)
        })
    }

    fn size<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<i64>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let count: i64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
            Ok(count)
        })
    }

    fn info<'a>(&'a self) -> StoreBoxFuture<'a, StoreResult<StoreInfo>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let raw: String = redis::cmd("INFO").query_async(&mut conn).await?;
            Ok(parse_info(&raw))
        })
    }
}

fn parse_info(raw: &str) -> StoreInfo {
    let mut info = StoreInfo {
        memory_used: "N/A".to_string(),
        connected_clients: 0,
    };
    for line in raw.lines() {
        let Some((field, value)) = line.trim().split_once(':') else {
            continue;
        };
        match field {
            "used_memory_human" => info.memory_used = value.trim().to_string(),
            "connected_clients" => {
                info.connected_clients = value.trim().parse().unwrap_or(0);
            }
            _ => {}
        }
    }
    info
}
