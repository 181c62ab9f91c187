//! Endpoints da integração HubSpot consumidos pelo frontend
//!
//! Mesma superfície das demais integrações: authorize → popup → callback →
//! credentials → load.

use axum::{
    extract::{Query, State},
    response::{Html, Json},
    Form,
};
use hubspot::{CallbackParams, IntegrationItem, TokenPayload};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// Formulário com o par (user, org)
#[derive(Debug, Deserialize)]
pub struct IntegrationForm {
    pub user_id: String,
    pub org_id: String,
}

impl IntegrationForm {
    fn validate(&self) -> AppResult<()> {
        if self.user_id.trim().is_empty() || self.org_id.trim().is_empty() {
            log_validation_failure("user_id/org_id");
            return Err(AppError::ValidationError("user_id and org_id are required".to_string()));
        }
        Ok(())
    }
}

/// Formulário do load: credenciais já serializadas em JSON
#[derive(Debug, Deserialize)]
pub struct LoadForm {
    pub credentials: String,
}

fn log_validation_failure(field: &str) {
    log_warning(&format!("Validation error: {} ausente", field));
}

fn report(operation: &str, err: AppError) -> AppError {
    log_hubspot_error(operation, err.kind(), &err.to_string());
    err
}

/// POST /integrations/hubspot/authorize
///
/// Retorna a URL de autorização (JSON string) para o popup
pub async fn authorize_hubspot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IntegrationForm>,
) -> AppResult<Json<String>> {
    log_request_received("/integrations/hubspot/authorize", "POST");
    form.validate()?;

    let url = state
        .oauth
        .authorize(&form.user_id, &form.org_id)
        .await
        .map_err(|e| report("authorize", e.into()))?;

    Ok(Json(url))
}

/// GET /integrations/hubspot/oauth2callback
///
/// Redirect da HubSpot; responde com a página que fecha o popup
pub async fn oauth2callback_hubspot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Html<String>> {
    log_request_received("/integrations/hubspot/oauth2callback", "GET");

    let html = state
        .oauth
        .handle_callback(&params)
        .await
        .map_err(|e| report("oauth2callback", e.into()))?;

    Ok(Html(html))
}

/// POST /integrations/hubspot/credentials
///
/// Entrega (uma única vez) o payload de tokens
pub async fn get_hubspot_credentials(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IntegrationForm>,
) -> AppResult<Json<Value>> {
    log_request_received("/integrations/hubspot/credentials", "POST");
    form.validate()?;

    let credentials = state
        .oauth
        .get_credentials(&form.user_id, &form.org_id)
        .await
        .map_err(|e| report("credentials", e.into()))?;

    Ok(Json(credentials.into_value()))
}

/// POST /integrations/hubspot/load
///
/// Busca os contatos e devolve a lista de itens normalizados
pub async fn load_hubspot_data(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoadForm>,
) -> AppResult<Json<Vec<IntegrationItem>>> {
    let start_time = Instant::now();
    log_request_received("/integrations/hubspot/load", "POST");

    let credentials = TokenPayload::from_json_str(&form.credentials)
        .map_err(|e| report("load", e.into()))?;

    let items = state
        .contacts
        .fetch_items(&credentials)
        .await
        .map_err(|e| report("load", e.into()))?;

    log_items_loaded(items.len());
    log_request_processed(
        "/integrations/hubspot/load",
        200,
        start_time.elapsed().as_millis() as u64,
    );

    Ok(Json(items))
}
