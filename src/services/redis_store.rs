//! Store efêmero em Redis (`SET EX` / `GET` / `DEL`)

use async_trait::async_trait;
use hubspot::{EphemeralStore, HubSpotError, Result};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Conexão multiplexada criada sob demanda e reaproveitada
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStore {
    pub fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| HubSpotError::store(format!("Redis client error: {}", e)))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
            key_prefix: key_prefix.into(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;

        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| HubSpotError::store(format!("Connection failed: {}", e)))?;

        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Descarta a conexão para que a próxima chamada reconecte
    async fn reset_connection(&self) {
        *self.connection.lock().await = None;
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn on_error(&self, op: &str, err: redis::RedisError) -> HubSpotError {
        if err.is_io_error() || err.is_connection_dropped() {
            self.reset_connection().await;
        }
        HubSpotError::store(format!("Redis {} failed: {}", op, err))
    }

    /// Health check - PING
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => Ok(()),
            Err(e) => Err(self.on_error("PING", e).await),
        }
    }
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection().await?;

        // Redis rejeita EX 0
        let seconds = ttl.as_secs().max(1);
        let result: redis::RedisResult<()> = conn.set_ex(&key, value, seconds).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_error("SET", e).await),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection().await?;

        let result: redis::RedisResult<Option<String>> = conn.get(&key).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.on_error("GET", e).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection().await?;

        let result: redis::RedisResult<()> = conn.del(&key).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_error("DEL", e).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key() {
        let store = RedisStore::new("redis://127.0.0.1:6379/", "hubspot:").unwrap();
        assert_eq!(store.prefixed_key("state:o:u"), "hubspot:state:o:u");
    }

    #[test]
    fn test_invalid_url_is_store_error() {
        let err = RedisStore::new("not a redis url", "").err().unwrap();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_store_error() {
        let store = RedisStore::new("redis://127.0.0.1:1/", "").unwrap();
        let err = store.get("k").await.unwrap_err();
        assert!(matches!(err, HubSpotError::Store(_)));
    }
}
