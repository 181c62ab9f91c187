// Biblioteca do middleware de integração HubSpot
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod handlers;
pub mod services;
pub mod utils;

use hubspot::{ContactsClient, EphemeralStore, HubSpotOAuth};
use std::sync::Arc;

use config::{Settings, StoreBackend};
use utils::{AppError, AppResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub oauth: HubSpotOAuth,
    pub contacts: ContactsClient,
    pub store_backend: StoreBackend,
}

impl AppState {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn EphemeralStore>,
        store_backend: StoreBackend,
    ) -> AppResult<Self> {
        settings
            .hubspot
            .validate()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        let oauth = HubSpotOAuth::new(settings.hubspot.clone(), store)?;
        let contacts = ContactsClient::new(&settings.hubspot)?
            .with_policy(settings.sync.pagination_policy());

        Ok(Self {
            oauth,
            contacts,
            store_backend,
        })
    }
}
