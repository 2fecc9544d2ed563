//! Redis connections implementing the key-value client seam.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use kvsync_core::kv::{AsyncKvClient, KvClient, RemoteDestination};
use kvsync_core::store::{Result, StoreError};

use super::error::map_redis_error;

/// Remote destination over a pair of Redis connections.
pub type RedisDestination = RemoteDestination<RedisClient, RedisAsyncClient>;

fn closed() -> StoreError {
    StoreError::ConnectionFailed("connection closed".to_string())
}

fn mset_cmd(pairs: &[(String, String)]) -> redis::Cmd {
    let mut cmd = redis::cmd("MSET");
    for (key, value) in pairs {
        cmd.arg(key).arg(value);
    }
    cmd
}

fn scan_cmd(cursor: u64, pattern: &str, count: usize) -> redis::Cmd {
    let mut cmd = redis::cmd("SCAN");
    cmd.arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(count);
    cmd
}

/// Blocking Redis connection.
pub struct RedisClient {
    conn: Option<redis::Connection>,
}

impl RedisClient {
    /// Opens a connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot be established.
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = client.get_connection().map_err(map_redis_error)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut redis::Connection> {
        self.conn.as_mut().ok_or_else(closed)
    }
}

impl KvClient for RedisClient {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(())
    }

    fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(values)
    }

    fn mset(&mut self, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let _: () = mset_cmd(pairs)
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(())
    }

    fn scan(&mut self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let step: (u64, Vec<String>) = scan_cmd(cursor, pattern, count)
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(step)
    }

    fn ping(&mut self) -> Result<String> {
        let pong: String = redis::cmd("PING")
            .query(self.conn()?)
            .map_err(map_redis_error)?;
        Ok(pong)
    }

    fn close(&mut self) -> Result<()> {
        self.conn = None;
        Ok(())
    }
}

/// Async Redis connection using the connection manager for reconnects.
pub struct RedisAsyncClient {
    conn: Option<ConnectionManager>,
}

impl RedisAsyncClient {
    /// Opens a managed connection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<ConnectionManager> {
        self.conn.clone().ok_or_else(closed)
    }
}

#[async_trait]
impl AsyncKvClient for RedisAsyncClient {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn()?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(values)
    }

    async fn mset(&mut self, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn()?;
        let cmd = mset_cmd(pairs);
        let _: () = cmd.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>)> {
        let mut conn = self.conn()?;
        let cmd = scan_cmd(cursor, pattern, count);
        let step: (u64, Vec<String>) = cmd.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(step)
    }

    async fn ping(&mut self) -> Result<String> {
        let mut conn = self.conn()?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(pong)
    }

    async fn close(&mut self) -> Result<()> {
        self.conn = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvsync_core::kv::DEFAULT_BATCH_SIZE;
    use kvsync_core::store::{
        AsyncDestination, Backend, Destination, Fallback, SyncedStore, Write,
    };
    use serde_json::json;
    use uuid::Uuid;

    /// Helper to get Redis URL from environment.
    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_destination(batch_size: usize) -> Option<RedisDestination> {
        let client = RedisClient::connect(&redis_url()).ok()?;
        let async_client = RedisAsyncClient::connect(&redis_url()).await.ok()?;
        RemoteDestination::new(client, async_client, batch_size).ok()
    }

    /// Generate a unique test key to avoid conflicts.
    fn test_key(suffix: &str) -> String {
        format!("test:kvsync:{}:{}", Uuid::new_v4(), suffix)
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(mut dest) = get_test_destination(DEFAULT_BATCH_SIZE).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        dest.write_one(&key, &json!({"a": [1, 2]})).unwrap();

        assert_eq!(dest.read_one(&key).unwrap(), Some(json!({"a": [1, 2]})));
        assert_eq!(
            dest.read_one_async(&key).await.unwrap(),
            Some(json!({"a": [1, 2]}))
        );
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(mut dest) = get_test_destination(DEFAULT_BATCH_SIZE).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        assert_eq!(dest.read_one(&test_key("nonexistent")).unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_read_all_in_small_batches() {
        let Some(mut dest) = get_test_destination(2).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let keys: Vec<String> = (0..5).map(|i| test_key(&format!("batch{i}"))).collect();
        let mut data = kvsync_core::DataMap::new();
        for (i, key) in keys.iter().enumerate() {
            data.insert(key.clone(), json!(i));
        }
        dest.write_all_async(&data).await.unwrap();

        let all = dest.read_all().unwrap();

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(all.get(key), Some(&json!(i)));
        }
    }

    #[tokio::test]
    async fn test_redis_foreign_value_reads_as_string() {
        let Some(mut dest) = get_test_destination(DEFAULT_BATCH_SIZE).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("foreign");
        let mut foreign = RedisClient::connect(&redis_url()).unwrap();
        foreign.set(&key, "not json").unwrap();

        assert_eq!(dest.read_one(&key).unwrap(), Some(json!("not json")));
    }

    #[tokio::test]
    async fn test_redis_ping_and_disconnect() {
        let Some(mut dest) = get_test_destination(DEFAULT_BATCH_SIZE).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        assert_eq!(dest.ping().unwrap(), "PONG");
        assert_eq!(dest.ping_async().await.unwrap(), "PONG");

        dest.disconnect().unwrap();
        dest.disconnect_async().await.unwrap();

        assert!(matches!(dest.ping(), Err(StoreError::ConnectionFailed(_))));
        assert!(matches!(
            dest.ping_async().await,
            Err(StoreError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_redis_synced_store_round_trip() {
        let Some(dest) = get_test_destination(DEFAULT_BATCH_SIZE).await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };
        let mut store = SyncedStore::new(dest, true);
        let key = test_key("synced");

        store.set_async(&key, json!(5), Write::Default).await.unwrap();
        store.set(&key, json!("5"), Write::Never).unwrap();

        assert_eq!(
            store.get_async(&key, Fallback::Propagate).await.unwrap(),
            Some(json!(5))
        );
    }
}
