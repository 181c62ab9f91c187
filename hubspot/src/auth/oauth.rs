use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::callback::{CallbackParams, CallbackPhase, CLOSE_WINDOW_PAGE};
use super::state::OAuthState;
use super::token::TokenPayload;
use crate::config::HubSpotConfig;
use crate::error::{HubSpotError, Result};
use crate::store::{credentials_key, state_key, EphemeralStore};

/// Fluxo OAuth2 (authorization code) da HubSpot
///
/// Não guarda estado próprio: state e credenciais vivem no [`EphemeralStore`].
#[derive(Clone)]
pub struct HubSpotOAuth {
    config: HubSpotConfig,
    store: Arc<dyn EphemeralStore>,
    http_client: Client,
}

impl HubSpotOAuth {
    pub fn new(config: HubSpotConfig, store: Arc<dyn EphemeralStore>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HubSpotError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_http_client(config, store, http_client))
    }

    pub fn with_http_client(
        config: HubSpotConfig,
        store: Arc<dyn EphemeralStore>,
        http_client: Client,
    ) -> Self {
        Self {
            config,
            store,
            http_client,
        }
    }

    pub fn config(&self) -> &HubSpotConfig {
        &self.config
    }

    /// Gera o state, guarda no store e devolve a URL de autorização
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> Result<String> {
        let state = OAuthState::new(user_id, org_id);
        let auth_url = self.config.authorization_url(&state.encode()?)?;

        self.store
            .put(&state_key(org_id, user_id), &state.to_json()?, self.config.state_ttl())
            .await?;

        info!("🚀 [OAuth2] Autorização iniciada (org: {}, user: {})", org_id, user_id);
        Ok(auth_url)
    }

    /// Valida o state, troca o code por tokens e guarda as credenciais.
    ///
    /// Retorna o HTML que fecha o popup.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<String> {
        debug!(phase = CallbackPhase::AwaitingRedirect.as_str(), "📥 [OAuth2] Callback recebido");

        let result = self.process_callback(params).await;

        match &result {
            Ok(_) => debug!(phase = CallbackPhase::Done.as_str(), "✅ [OAuth2] Callback concluído"),
            Err(e) => warn!(
                phase = CallbackPhase::Failed.as_str(),
                kind = e.kind(),
                "❌ [OAuth2] Callback rejeitado: {}",
                e
            ),
        }

        result
    }

    async fn process_callback(&self, params: &CallbackParams) -> Result<String> {
        if let Some(message) = params.provider_error() {
            return Err(HubSpotError::ProviderError(message));
        }

        let received = OAuthState::decode(params.state.as_deref().unwrap_or_default())?;
        let key = state_key(&received.org_id, &received.user_id);
        self.validate_state(&key, &received).await?;
        debug!(phase = CallbackPhase::StateValidated.as_str(), "🔐 [OAuth2] State validado");

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| HubSpotError::ProviderError("missing authorization code".to_string()))?;

        // Troca do code e remoção do state são independentes
        let (token_result, delete_result) =
            tokio::join!(self.exchange_code_for_token(code), self.store.delete(&key));
        let token = token_result?;
        // O code já foi consumido no provedor; o state expira pelo próprio TTL
        if let Err(e) = delete_result {
            warn!("⚠️ [OAuth2] Falha ao remover state {}: {}", key, e);
        }
        debug!(phase = CallbackPhase::TokenExchanged.as_str(), "🔄 [OAuth2] Code trocado por token");

        self.store
            .put(
                &credentials_key(&received.org_id, &received.user_id),
                &token.to_json_string()?,
                self.config.credentials_ttl(),
            )
            .await?;

        info!(
            "✅ [OAuth2] Credenciais armazenadas (org: {}, user: {})",
            received.org_id, received.user_id
        );
        Ok(CLOSE_WINDOW_PAGE.to_string())
    }

    /// Ausência, JSON inválido e nonce divergente produzem o mesmo erro
    async fn validate_state(&self, key: &str, received: &OAuthState) -> Result<()> {
        let stored = self
            .store
            .get(key)
            .await?
            .and_then(|raw| serde_json::from_str::<OAuthState>(&raw).ok());

        match stored {
            Some(stored) if received.matches(&stored) => Ok(()),
            _ => Err(HubSpotError::StateMismatch),
        }
    }

    /// POST form-encoded no token endpoint com grant `authorization_code`
    async fn exchange_code_for_token(&self, code: &str) -> Result<TokenPayload> {
        info!("🔐 [OAuth2] Trocando authorization code por access token...");

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| HubSpotError::provider_api(format!("Falha ao conectar com HubSpot OAuth API: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HubSpotError::provider_api(format!("Falha ao ler resposta do token: {}", e)))?;

        if !status.is_success() {
            error!("❌ [OAuth2] Token exchange failed: {} - {}", status, body);
            return Err(HubSpotError::provider_api(format!(
                "OAuth token exchange failed [{}]: {}",
                status, body
            )));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| HubSpotError::provider_api(format!("Falha ao parsear resposta do token: {}", e)))?;

        Ok(TokenPayload::new(value))
    }

    /// Lê e apaga as credenciais do par (org, user); uso único
    pub async fn get_credentials(&self, user_id: &str, org_id: &str) -> Result<TokenPayload> {
        let key = credentials_key(org_id, user_id);

        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or(HubSpotError::NoCredentials)?;

        let payload = TokenPayload::from_json_str(&raw)?;
        self.store.delete(&key).await?;

        info!("🔑 [OAuth2] Credenciais entregues e removidas (org: {}, user: {})", org_id, user_id);
        Ok(payload)
    }
}

impl std::fmt::Debug for HubSpotOAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSpotOAuth")
            .field("client_id", &self.config.client_id)
            .field("redirect_uri", &self.config.redirect_uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_oauth(server_uri: &str, store: Arc<MemoryStore>) -> HubSpotOAuth {
        let config = HubSpotConfig::new(
            "test_client_id",
            "test_secret",
            "http://localhost:8000/integrations/hubspot/oauth2callback",
        )
        .with_base_urls(server_uri, server_uri);

        HubSpotOAuth::new(config, store).unwrap()
    }

    fn state_param(auth_url: &str) -> String {
        Url::parse(auth_url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    async fn mount_token_endpoint(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    /// Store cujo `delete` sempre falha
    struct FailingDeleteStore(MemoryStore);

    #[async_trait::async_trait]
    impl EphemeralStore for FailingDeleteStore {
        async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            self.0.put(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key).await
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(HubSpotError::store("DEL failed"))
        }
    }

    fn callback(state: &str) -> CallbackParams {
        CallbackParams {
            code: Some("auth-code".into()),
            state: Some(state.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_authorize_stores_state_it_encodes() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store.clone());

        let url = oauth.authorize("user1", "org1").await.unwrap();
        let encoded = OAuthState::decode(&state_param(&url)).unwrap();

        let stored = store.get("state:org1:user1").await.unwrap().unwrap();
        let stored: OAuthState = serde_json::from_str(&stored).unwrap();

        assert_eq!(encoded, stored);
        assert_eq!(stored.user_id, "user1");
        assert_eq!(stored.org_id, "org1");
        assert!(url.starts_with("http://127.0.0.1:1/oauth/authorize?client_id=test_client_id"));
    }

    #[tokio::test]
    async fn test_full_flow_single_use_credentials() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, json!({ "access_token": "tok1" })).await;

        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth(&server.uri(), store.clone());

        let url = oauth.authorize("user1", "org1").await.unwrap();
        let html = oauth.handle_callback(&callback(&state_param(&url))).await.unwrap();
        assert!(html.contains("window.close()"));

        // State consumido
        assert!(store.get("state:org1:user1").await.unwrap().is_none());

        let credentials = oauth.get_credentials("user1", "org1").await.unwrap();
        assert_eq!(credentials.as_value(), &json!({ "access_token": "tok1" }));

        let second = oauth.get_credentials("user1", "org1").await;
        assert!(matches!(second, Err(HubSpotError::NoCredentials)));
    }

    #[tokio::test]
    async fn test_state_delete_failure_keeps_exchanged_token() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, json!({ "access_token": "tok1" })).await;

        let memory = MemoryStore::new();
        let config = HubSpotConfig::new("test_client_id", "test_secret", "http://localhost/cb")
            .with_base_urls(&server.uri(), &server.uri());
        let oauth = HubSpotOAuth::new(config, Arc::new(FailingDeleteStore(memory.clone()))).unwrap();

        let url = oauth.authorize("user1", "org1").await.unwrap();
        let html = oauth.handle_callback(&callback(&state_param(&url))).await.unwrap();
        assert!(html.contains("window.close()"));

        let stored = memory.get("credentials:org1:user1").await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Value>(&stored).unwrap(), json!({ "access_token": "tok1" }));
    }

    #[tokio::test]
    async fn test_callback_with_wrong_nonce_is_state_mismatch() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store.clone());

        oauth.authorize("user1", "org1").await.unwrap();
        let forged = OAuthState::new("user1", "org1").encode().unwrap();

        let result = oauth.handle_callback(&callback(&forged)).await;
        assert!(matches!(result, Err(HubSpotError::StateMismatch)));
        // State original continua lá
        assert!(store.get("state:org1:user1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_callback_without_stored_state_is_state_mismatch() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store);

        let encoded = OAuthState::new("user1", "org1").encode().unwrap();
        let missing = oauth.handle_callback(&callback(&encoded)).await.unwrap_err();
        let garbage = oauth.handle_callback(&callback("not-base64!")).await.unwrap_err();
        let absent = oauth.handle_callback(&CallbackParams::default()).await.unwrap_err();

        // Mesma resposta para todas as falhas de validação
        for err in [&missing, &garbage, &absent] {
            assert!(matches!(err, HubSpotError::StateMismatch));
            assert_eq!(err.to_string(), missing.to_string());
        }
    }

    #[tokio::test]
    async fn test_callback_with_provider_error() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store);

        let params = CallbackParams {
            error: Some("access_denied".into()),
            error_description: Some("User cancelled".into()),
            ..Default::default()
        };

        match oauth.handle_callback(&params).await {
            Err(HubSpotError::ProviderError(msg)) => assert_eq!(msg, "User cancelled"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_callback_without_code() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store);

        let url = oauth.authorize("user1", "org1").await.unwrap();
        let params = CallbackParams {
            state: Some(state_param(&url)),
            ..Default::default()
        };

        assert!(matches!(
            oauth.handle_callback(&params).await,
            Err(HubSpotError::ProviderError(_))
        ));
    }

    #[tokio::test]
    async fn test_token_exchange_failure_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("BAD_AUTH_CODE"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth(&server.uri(), store.clone());

        let url = oauth.authorize("user1", "org1").await.unwrap();
        match oauth.handle_callback(&callback(&state_param(&url))).await {
            Err(HubSpotError::ProviderApiError(msg)) => assert!(msg.contains("BAD_AUTH_CODE")),
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            oauth.get_credentials("user1", "org1").await,
            Err(HubSpotError::NoCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_exchange_sends_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("client_id=test_client_id"))
            .and(body_string_contains("client_secret=test_secret"))
            .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok1",
                "refresh_token": "ref1",
                "expires_in": 1800
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth(&server.uri(), store);

        let url = oauth.authorize("u", "o").await.unwrap();
        oauth.handle_callback(&callback(&state_param(&url))).await.unwrap();

        let credentials = oauth.get_credentials("u", "o").await.unwrap();
        assert_eq!(credentials.access_token().unwrap(), "tok1");
        assert_eq!(credentials.as_value()["refresh_token"], "ref1");
    }

    #[tokio::test]
    async fn test_get_credentials_without_flow() {
        let store = Arc::new(MemoryStore::new());
        let oauth = test_oauth("http://127.0.0.1:1", store);

        assert!(matches!(
            oauth.get_credentials("nobody", "nowhere").await,
            Err(HubSpotError::NoCredentials)
        ));
    }
}
