//! Tipos de erro para o crate hubspot

use thiserror::Error;

/// Erros do fluxo OAuth2 e do cliente de contatos da HubSpot
#[derive(Debug, Error)]
pub enum HubSpotError {
    /// O provedor devolveu `error` no redirect do callback
    #[error("HubSpot authorization error: {0}")]
    ProviderError(String),

    /// State ausente, expirado, malformado ou com nonce divergente.
    /// Todas as falhas de validação usam a mesma mensagem.
    #[error("State does not match.")]
    StateMismatch,

    /// Nenhuma credencial armazenada para o par (org, user)
    #[error("No credentials found.")]
    NoCredentials,

    #[error("No access token found in credentials.")]
    MissingAccessToken,

    /// HTTP 401 na primeira página
    #[error("Invalid access token. Please reconnect to HubSpot.")]
    InvalidToken,

    /// HTTP 403 na primeira página
    #[error("Insufficient permissions. Please check your HubSpot app scopes.")]
    InsufficientScope,

    /// Qualquer outro status não-2xx ou falha de transporte
    #[error("HubSpot API error: {0}")]
    ProviderApiError(String),

    /// Store efêmero indisponível
    #[error("Ephemeral store error: {0}")]
    Store(String),

    /// Credenciais recebidas não são um JSON válido
    #[error("Invalid credentials payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubSpotError {
    pub fn provider_api(msg: impl Into<String>) -> Self {
        Self::ProviderApiError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Identificador estável do tipo de erro, exposto para quem consome a API
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderError(_) => "provider_error",
            Self::StateMismatch => "state_mismatch",
            Self::NoCredentials => "no_credentials",
            Self::MissingAccessToken => "missing_access_token",
            Self::InvalidToken => "invalid_token",
            Self::InsufficientScope => "insufficient_scope",
            Self::ProviderApiError(_) => "provider_api_error",
            Self::Store(_) => "store_unavailable",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Config(_) => "config_error",
        }
    }
}

impl From<reqwest::Error> for HubSpotError {
    fn from(err: reqwest::Error) -> Self {
        Self::ProviderApiError(format!("Error fetching HubSpot data: {}", err))
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, HubSpotError>;
