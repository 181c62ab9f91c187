/// Main Application: middleware de integração HubSpot
///
/// Fluxo:
/// - Frontend chama /authorize e abre a URL num popup
/// - HubSpot redireciona para /oauth2callback, que troca o code por tokens
/// - Frontend busca os tokens em /credentials (uso único) e carrega contatos via /load

use axum::http::HeaderValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use hubspot_integration_middleware::{config, handlers, services, utils, AppState};

use config::{ServerSettings, Settings};
use utils::{logging::*, AppError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if dotenv_loaded {
        log_info("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new()
        .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let store = services::build_store(&settings.store)?;
    if let Some(memory) = store.memory.clone() {
        services::spawn_purge_task(memory, Duration::from_secs(settings.store.purge_interval_secs.max(1)));
    }
    if let Some(redis) = store.redis.as_ref() {
        match redis.health_check().await {
            Ok(()) => log_info("✅ Redis respondeu ao PING"),
            Err(e) => log_warning(&format!("⚠️ Redis indisponível no startup: {}", e)),
        }
    }

    let app_state = Arc::new(AppState::new(&settings, store.store, store.backend)?);
    log_info(&format!("🔐 OAuth2 HubSpot configurado (redirect: {})", settings.hubspot.redirect_uri));

    let app = handlers::router(app_state).layer(cors_layer(&settings.server));

    let port = settings.effective_port();
    let listener = TcpListener::bind(format!("{}:{}", settings.server.host, port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// CORS para o frontend; sem origens configuradas libera qualquer origem
fn cors_layer(server: &ServerSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                log_warning(&format!("⚠️ Origem CORS inválida ignorada: {}", origin));
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        log_warning("⚠️ Nenhuma origem CORS configurada - liberando todas");
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("failed to install signal handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
