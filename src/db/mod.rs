pub mod watch_history;

pub use watch_history::create_redis_client;
pub use watch_history::RedisWatchHistory;
pub use watch_history::WatchHistoryStore;
