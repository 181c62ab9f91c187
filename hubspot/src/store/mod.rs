//! Store efêmero chave/valor com expiração por chave
//!
//! Guarda o state anti-CSRF e, por poucos minutos, as credenciais trocadas.
//! O backend real (Redis, memória) fica atrás de [`EphemeralStore`].

pub mod memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

pub use memory::MemoryStore;

#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Grava `value` sob `key`, expirando após `ttl`
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Lê o valor; chaves expiradas contam como ausentes
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Chave do state OAuth de um par (org, user)
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("state:{}:{}", org_id, user_id)
}

/// Chave das credenciais de um par (org, user)
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("credentials:{}:{}", org_id, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_scoped_by_org_then_user() {
        assert_eq!(state_key("org1", "user1"), "state:org1:user1");
        assert_eq!(credentials_key("org1", "user1"), "credentials:org1:user1");
        assert_ne!(state_key("a", "b"), state_key("b", "a"));
    }
}
