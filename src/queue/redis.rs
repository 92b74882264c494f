//! Redis-backed task queue.
//!
//! RPUSH/BLPOP lists, one per task category. BLPOP over multiple keys
//! pops from the first non-empty list in key order, which gives the
//! fixed polling priority for free.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{PoppedTask, QueueError, QueueResult, TaskQueue};

/// Redis list-based task queue.
pub struct RedisTaskQueue {
    conn: ConnectionManager,
}

impl RedisTaskQueue {
    /// Connect to Redis at `redis_url` (e.g. "redis://localhost:6379").
    pub async fn new(redis_url: &str) -> QueueResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| QueueError::Backend(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            QueueError::Backend(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn push(&self, queue: &str, raw: &str) -> QueueResult<()> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(queue, raw)
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn pop_any(&self, queues: &[&str], timeout: Duration) -> QueueResult<Option<PoppedTask>> {
        let mut conn = self.conn.clone();

        // BLPOP returns (key, value) or nil on timeout.
        let popped: Option<(String, String)> = conn
            .blpop(queues, timeout.as_secs_f64())
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;

        Ok(popped.map(|(queue, raw)| PoppedTask { queue, raw }))
    }
}

impl Clone for RedisTaskQueue {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}
