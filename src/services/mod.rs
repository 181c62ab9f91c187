pub mod redis_store;

pub use redis_store::RedisStore;

use hubspot::{EphemeralStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{StoreBackend, StoreSettings};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Prefixo das chaves no Redis compartilhado
pub const REDIS_KEY_PREFIX: &str = "hubspot:";

/// Store construído conforme a configuração
pub struct StoreHandle {
    pub store: Arc<dyn EphemeralStore>,
    pub backend: StoreBackend,
    /// Presente apenas no backend em memória
    pub memory: Option<MemoryStore>,
    /// Presente apenas no backend Redis
    pub redis: Option<RedisStore>,
}

pub fn build_store(settings: &StoreSettings) -> AppResult<StoreHandle> {
    match settings.backend {
        StoreBackend::Memory => {
            log_warning("⚠️ Store em memória: state e credenciais não sobrevivem a restart nem são compartilhados entre instâncias");
            let memory = MemoryStore::new();
            Ok(StoreHandle {
                store: Arc::new(memory.clone()),
                backend: StoreBackend::Memory,
                memory: Some(memory),
                redis: None,
            })
        }
        StoreBackend::Redis => {
            let url = settings
                .redis_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| AppError::ConfigError("REDIS_URL não configurado".to_string()))?;

            let store = RedisStore::new(url, REDIS_KEY_PREFIX)?;
            log_info("✅ Store Redis configurado");
            Ok(StoreHandle {
                store: Arc::new(store.clone()),
                backend: StoreBackend::Redis,
                memory: None,
                redis: Some(store),
            })
        }
    }
}

/// Remove periodicamente as chaves expiradas do store em memória
pub fn spawn_purge_task(store: MemoryStore, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                tracing::debug!("🧹 {} chaves expiradas removidas do store em memória", removed);
            }
        }
    })
}
