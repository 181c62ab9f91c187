use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::TokenPayload;
use crate::config::HubSpotConfig;
use crate::error::{HubSpotError, Result};
use crate::items::{create_integration_item, IntegrationItem, CONTACT_ITEM_TYPE};

/// Tamanho de página pedido à API
pub const PAGE_LIMIT: u32 = 100;

/// Propriedades de contato solicitadas
pub const CONTACT_PROPERTIES: &str = "firstname,lastname,email,company,phone";

/// O que fazer quando uma página depois da primeira falha.
///
/// Falhas na primeira página são sempre erro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationFailurePolicy {
    /// Para e devolve o que já foi acumulado
    #[default]
    PartialResultsOnPageFailure,
    /// Propaga o erro como se fosse a primeira página
    FailOnPageFailure,
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    after: Option<String>,
}

impl ContactsPage {
    fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .and_then(|n| n.after.as_deref())
            .filter(|after| !after.is_empty())
    }
}

/// Busca paginada de contatos, normalizando cada registro
#[derive(Debug, Clone)]
pub struct ContactsClient {
    http_client: Client,
    contacts_url: String,
    policy: PaginationFailurePolicy,
}

impl ContactsClient {
    /// Timeouts: total 30s, connect 5s
    pub fn new(config: &HubSpotConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HubSpotError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_http_client(config, http_client))
    }

    pub fn with_http_client(config: &HubSpotConfig, http_client: Client) -> Self {
        Self {
            http_client,
            contacts_url: config.contacts_url(),
            policy: PaginationFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PaginationFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PaginationFailurePolicy {
        self.policy
    }

    /// Busca todos os contatos visíveis para o token.
    ///
    /// Erros da primeira página: 401 → `InvalidToken`, 403 → `InsufficientScope`,
    /// demais → `ProviderApiError` com o corpo da resposta.
    pub async fn fetch_items(&self, credentials: &TokenPayload) -> Result<Vec<IntegrationItem>> {
        let access_token = credentials.access_token()?;

        let first = self.fetch_page(access_token, None).await?;
        let mut items = map_contacts(&first.results);
        let mut cursor = first.next_cursor().map(str::to_string);
        let mut pages = 1usize;

        while let Some(after) = cursor.take() {
            match self.fetch_page(access_token, Some(&after)).await {
                Ok(page) => {
                    pages += 1;
                    items.extend(map_contacts(&page.results));
                    cursor = page.next_cursor().map(str::to_string);
                }
                Err(e) => match self.policy {
                    PaginationFailurePolicy::PartialResultsOnPageFailure => {
                        warn!(
                            after = after.as_str(),
                            kind = e.kind(),
                            "⚠️ [HubSpot] Falha na paginação, retornando {} contatos parciais: {}",
                            items.len(),
                            e
                        );
                        break;
                    }
                    PaginationFailurePolicy::FailOnPageFailure => return Err(e),
                },
            }
        }

        info!(count = items.len(), pages, "✅ [HubSpot] Contatos carregados");
        for (index, item) in items.iter().enumerate() {
            debug!(index = index + 1, id = item.id.as_str(), item_type = item.item_type.as_str(), "{}", item.name);
        }

        Ok(items)
    }

    async fn fetch_page(&self, access_token: &str, after: Option<&str>) -> Result<ContactsPage> {
        let limit = PAGE_LIMIT.to_string();
        let mut query = vec![("limit", limit.as_str()), ("properties", CONTACT_PROPERTIES)];
        if let Some(after) = after {
            query.push(("after", after));
        }

        debug!("GET {} (after: {:?})", self.contacts_url, after);

        let response = self
            .http_client
            .get(&self.contacts_url)
            .bearer_auth(access_token)
            .header("Content-Type", "application/json")
            .query(&query)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ContactsPage>().await?),
            StatusCode::UNAUTHORIZED => Err(HubSpotError::InvalidToken),
            StatusCode::FORBIDDEN => Err(HubSpotError::InsufficientScope),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!("❌ [HubSpot] GET contacts falhou: {} - {}", status, body);
                Err(HubSpotError::ProviderApiError(body))
            }
        }
    }
}

fn map_contacts(results: &[Value]) -> Vec<IntegrationItem> {
    results
        .iter()
        .map(|contact| create_integration_item(contact, CONTACT_ITEM_TYPE, None, None))
        .collect()
}
