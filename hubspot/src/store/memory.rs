use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::EphemeralStore;
use crate::error::{HubSpotError, Result};

#[derive(Debug, Clone)]
struct StoreEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Store em memória do processo, usado em desenvolvimento e nos testes
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove todas as entradas expiradas, retornando quantas foram removidas
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Remove a chave só se ainda estiver expirada sob o lock de escrita;
    /// um `put` concorrente entre a leitura e a remoção é preservado
    async fn remove_if_expired(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(StoreEntry::is_expired) {
            entries.remove(key);
            true
        } else {
            false
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| HubSpotError::store(format!("TTL inválido para {}: {}", key, e)))?;

        let entry = StoreEntry {
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        };

        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        self.remove_if_expired(key).await;
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
