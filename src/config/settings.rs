use config::{Config, ConfigError, Environment, File};
use hubspot::{HubSpotConfig, PaginationFailurePolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub hubspot: HubSpotConfig,
    pub store: StoreSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origens liberadas no CORS (frontend que abre o popup)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    /// Intervalo de limpeza das chaves expiradas no backend em memória
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncSettings {
    /// Falha depois da primeira página devolve o que já foi carregado
    #[serde(default = "default_true")]
    pub partial_results_on_page_failure: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            partial_results_on_page_failure: true,
        }
    }
}

impl SyncSettings {
    pub fn pagination_policy(&self) -> PaginationFailurePolicy {
        if self.partial_results_on_page_failure {
            PaginationFailurePolicy::PartialResultsOnPageFailure
        } else {
            PaginationFailurePolicy::FailOnPageFailure
        }
    }
}

fn default_purge_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("hubspot.client_id", "")?
            .set_default("hubspot.client_secret", "")?
            .set_default(
                "hubspot.redirect_uri",
                "http://localhost:8000/integrations/hubspot/oauth2callback",
            )?
            .set_default("store.backend", "memory")?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas
        for (var, key) in [
            ("HUBSPOT_CLIENT_ID", "hubspot.client_id"),
            ("HUBSPOT_CLIENT_SECRET", "hubspot.client_secret"),
            ("HUBSPOT_REDIRECT_URI", "hubspot.redirect_uri"),
            ("REDIS_URL", "store.redis_url"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder = builder.add_source(Environment::with_prefix("HUBSPOT_MIDDLEWARE").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Porta efetiva: `PORT` (Cloud Run) tem precedência sobre o arquivo
    pub fn effective_port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(self.server.port)
    }
}
