//! Redis-backed result store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{ResultStore, ResultStoreError, ResultStoreResult};
use crate::models::TaskOutcome;

/// Key prefix for terminal task outcomes.
const RESULT_KEY_PREFIX: &str = "task:result:";
/// Key prefix for per-task content-id caching.
const CID_KEY_PREFIX: &str = "task:cid:";
/// Key prefix for worker-generated complaint ids.
const ASSIGNED_ID_KEY_PREFIX: &str = "task:assigned:";
/// TTL for retry bookkeeping keys. Long enough to outlive any retry
/// cycle, short enough to not accumulate forever.
const BOOKKEEPING_TTL_SECS: u64 = 86400;

/// Result store over a shared Redis connection.
pub struct RedisResultStore {
    conn: ConnectionManager,
}

impl RedisResultStore {
    pub async fn new(redis_url: &str) -> ResultStoreResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| ResultStoreError::Backend(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            ResultStoreError::Backend(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self { conn })
    }

    /// Build a store sharing an existing connection manager.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn set_result(&self, outcome: &TaskOutcome, ttl: Duration) -> ResultStoreResult<()> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", RESULT_KEY_PREFIX, outcome.task_id);
        let json = serde_json::to_string(outcome)
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;

        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs())
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_result(&self, task_id: &str) -> ResultStoreResult<Option<TaskOutcome>> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", RESULT_KEY_PREFIX, task_id);

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ResultStoreError::Backend(e.to_string())),
            None => Ok(None),
        }
    }

    async fn cache_content_id(&self, task_id: &str, content_id: &str) -> ResultStoreResult<()> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", CID_KEY_PREFIX, task_id);
        conn.set_ex::<_, _, ()>(&key, content_id, BOOKKEEPING_TTL_SECS)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn cached_content_id(&self, task_id: &str) -> ResultStoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", CID_KEY_PREFIX, task_id);
        conn.get(&key)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))
    }

    async fn cache_assigned_id(&self, task_id: &str, assigned_id: &str) -> ResultStoreResult<()> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", ASSIGNED_ID_KEY_PREFIX, task_id);
        conn.set_ex::<_, _, ()>(&key, assigned_id, BOOKKEEPING_TTL_SECS)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn cached_assigned_id(&self, task_id: &str) -> ResultStoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let key = format!("{}{}", ASSIGNED_ID_KEY_PREFIX, task_id);
        conn.get(&key)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))
    }

    async fn store_record(
        &self,
        kind: &str,
        record_id: &str,
        json: &str,
        content_id: &str,
    ) -> ResultStoreResult<()> {
        let mut conn = self.conn.clone();

        redis::pipe()
            .set(format!("{}:json:{}", kind, record_id), json)
            .set(format!("{}:cid:{}", kind, record_id), content_id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| ResultStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl Clone for RedisResultStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}
