//! Configuração OAuth2 e endpoints da HubSpot
//!
//! Client ID e secret são recebidos explicitamente na construção; o crate não
//! lê variáveis de ambiente.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{HubSpotError, Result};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_SCOPE: &str = "crm.objects.contacts.read";

/// TTL padrão de state e credenciais no store efêmero
pub const DEFAULT_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotConfig {
    /// Client ID do app HubSpot
    pub client_id: String,

    /// Client Secret do app HubSpot
    pub client_secret: String,

    /// URL de callback registrada no app
    pub redirect_uri: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_ttl_secs")]
    pub state_ttl_secs: u64,

    #[serde(default = "default_ttl_secs")]
    pub credentials_ttl_secs: u64,
}

fn default_scopes() -> Vec<String> {
    vec![DEFAULT_SCOPE.to_string()]
}

fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl HubSpotConfig {
    /// Cria configuração com os endpoints públicos da HubSpot
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: default_scopes(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            state_ttl_secs: DEFAULT_TTL_SECS,
            credentials_ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    /// Aponta os endpoints OAuth e de API para outra base (mock servers nos testes)
    pub fn with_base_urls(mut self, oauth_base: &str, api_base: &str) -> Self {
        let oauth_base = oauth_base.trim_end_matches('/');
        self.authorize_url = format!("{}/oauth/authorize", oauth_base);
        self.token_url = format!("{}/oauth/v1/token", oauth_base);
        self.api_base_url = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Valida se os campos obrigatórios estão presentes e as URLs são parseáveis
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(HubSpotError::config("HUBSPOT_CLIENT_ID não configurado"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(HubSpotError::config("HUBSPOT_CLIENT_SECRET não configurado"));
        }

        for (name, value) in [
            ("redirect_uri", &self.redirect_uri),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("api_base_url", &self.api_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| HubSpotError::config(format!("{} inválida ({}): {}", name, value, e)))?;
        }

        Ok(())
    }

    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    pub fn credentials_ttl(&self) -> Duration {
        Duration::from_secs(self.credentials_ttl_secs)
    }

    /// Gera a URL de autorização com o state já codificado
    pub fn authorization_url(&self, encoded_state: &str) -> Result<String> {
        let scope = self.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", encoded_state),
            ],
        )
        .map_err(|e| HubSpotError::config(format!("URL de autorização inválida: {}", e)))?;

        Ok(url.into())
    }

    /// Endpoint de listagem de contatos (CRM v3)
    pub fn contacts_url(&self) -> String {
        format!("{}/crm/v3/objects/contacts", self.api_base_url)
    }
}
