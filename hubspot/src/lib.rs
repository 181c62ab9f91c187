//! # HubSpot Rust Crate
//!
//! Integração com a HubSpot: fluxo OAuth2 (authorization code) e leitura de
//! contatos normalizados em [`IntegrationItem`].
//!
//! ## Fluxo
//!
//! 1. [`HubSpotOAuth::authorize`] guarda o state e devolve a URL de consentimento
//! 2. [`HubSpotOAuth::handle_callback`] valida o state e troca o code por tokens
//! 3. [`HubSpotOAuth::get_credentials`] entrega os tokens uma única vez
//! 4. [`ContactsClient::fetch_items`] pagina os contatos
//!
//! ## Exemplo
//!
//! ```no_run
//! use std::sync::Arc;
//! use hubspot::{ContactsClient, HubSpotConfig, HubSpotOAuth, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HubSpotConfig::new("client-id", "client-secret", "http://localhost:8000/callback");
//!     let oauth = HubSpotOAuth::new(config.clone(), Arc::new(MemoryStore::new()))?;
//!
//!     let url = oauth.authorize("user-1", "org-1").await?;
//!     println!("Abra no navegador: {}", url);
//!
//!     // ... depois do callback
//!     let credentials = oauth.get_credentials("user-1", "org-1").await?;
//!     let items = ContactsClient::new(&config)?.fetch_items(&credentials).await?;
//!     println!("{} contatos", items.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod items;
pub mod store;

pub use auth::{CallbackParams, HubSpotOAuth, OAuthState, TokenPayload};
pub use client::{ContactsClient, PaginationFailurePolicy};
pub use config::HubSpotConfig;
pub use error::{HubSpotError, Result};
pub use items::{create_integration_item, IntegrationItem};
pub use store::{EphemeralStore, MemoryStore};
