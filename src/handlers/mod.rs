pub mod health;
pub mod hubspot;

pub use health::health_check;
pub use hubspot::{authorize_hubspot, get_hubspot_credentials, load_hubspot_data, oauth2callback_hubspot};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Rotas públicas do middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/integrations/hubspot/authorize", post(authorize_hubspot))
        .route("/integrations/hubspot/oauth2callback", get(oauth2callback_hubspot))
        .route("/integrations/hubspot/credentials", post(get_hubspot_credentials))
        .route("/integrations/hubspot/load", post(load_hubspot_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
