use redis::AsyncCommands;
use redis::Client;

use crate::error::{AppError, AppResult};
use crate::models::WatchEntry;

/// Read-only source of prior-watched entries
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchHistoryStore: Send + Sync {
    /// Up to `limit` most recent entries, oldest first
    async fn recent_entries(&self, limit: usize) -> AppResult<Vec<WatchEntry>>;
}

/// Creates a Redis client for the watch-history store
///
/// Opening a client only parses the URL; connections are made per read.
pub fn create_redis_client(redis_url: &str) -> AppResult<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Watch history kept as a JSON array under a single Redis key
#[derive(Clone)]
pub struct RedisWatchHistory {
    redis_client: Client,
    key: String,
}

impl RedisWatchHistory {
    pub fn new(redis_client: Client, key: String) -> Self {
        Self { redis_client, key }
    }
}

/// Parses the stored list and keeps its last `limit` entries
pub fn recent_from_json(json: &str, limit: usize) -> AppResult<Vec<WatchEntry>> {
    let entries: Vec<WatchEntry> = serde_json::from_str(json)
        .map_err(|e| AppError::Internal(format!("Watch-history deserialization error: {}", e)))?;

    let skip = entries.len().saturating_sub(limit);
    Ok(entries.into_iter().skip(skip).collect())
}

#[async_trait::async_trait]
impl WatchHistoryStore for RedisWatchHistory {
    async fn recent_entries(&self, limit: usize) -> AppResult<Vec<WatchEntry>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(&self.key).await?;

        let entries = match stored {
            Some(json) => recent_from_json(&json, limit)?,
            None => Vec::new(),
        };

        tracing::debug!(key = %self.key, entries = entries.len(), "Watch history read");
        Ok(entries)
    }
}
