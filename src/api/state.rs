use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_redis_client, RedisWatchHistory, WatchHistoryStore};
use crate::error::{AppError, AppResult};
use crate::services::providers::{MetadataProvider, TmdbProvider};
use crate::services::MetadataClient;

/// Shared application state
///
/// Collaborators are built once from the configuration; a missing credential
/// leaves the slot empty and surfaces as a configuration error per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Option<Arc<dyn MetadataProvider>>,
    pub watch_history: Option<Arc<dyn WatchHistoryStore>>,
}

impl AppState {
    pub fn new(
        config: Config,
        provider: Option<Arc<dyn MetadataProvider>>,
        watch_history: Option<Arc<dyn WatchHistoryStore>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            watch_history,
        }
    }

    /// Builds the TMDB provider and Redis watch history the configuration allows
    pub fn from_config(config: Config) -> AppResult<Self> {
        let provider: Option<Arc<dyn MetadataProvider>> = match config.tmdb_key() {
            Some(key) => Some(Arc::new(TmdbProvider::new(
                key.to_string(),
                config.tmdb_api_url.clone(),
                config.provider_timeout(),
            )?)),
            None => {
                tracing::warn!("TMDB_API_KEY is not set; recommendation modes are disabled");
                None
            }
        };

        let watch_history: Option<Arc<dyn WatchHistoryStore>> = match &config.redis_url {
            Some(url) => Some(Arc::new(RedisWatchHistory::new(
                create_redis_client(url)?,
                config.watchlist_key.clone(),
            ))),
            None => None,
        };

        Ok(Self::new(config, provider, watch_history))
    }

    /// Metadata client for a request
    pub fn metadata(&self) -> AppResult<MetadataClient> {
        self.provider
            .clone()
            .map(MetadataClient::new)
            .ok_or_else(|| AppError::Config("TMDB_API_KEY is not set".to_string()))
    }

    pub fn watch_history(&self) -> AppResult<Arc<dyn WatchHistoryStore>> {
        self.watch_history
            .clone()
            .ok_or_else(|| AppError::Config("REDIS_URL is not set".to_string()))
    }
}
