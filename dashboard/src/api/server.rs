use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::config::DashboardConfig;
use crate::manager::DashboardManager;

/// CORS for the given origins, or any origin when the list is empty
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    log::info!("CORS configured for origins: {}", origins.join(","));
    let origin_list = origins
        .iter()
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", s, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origin_list)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn create_router(manager: Arc<DashboardManager>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        // Dashboard view
        .route("/api/dashboard", get(handlers::get_dashboard_handler))
        .route("/api/refresh", post(handlers::refresh_handler))
        // Session
        .route("/api/session/connect", post(handlers::connect_handler))
        .route("/api/session/disconnect", post(handlers::disconnect_handler))
        // Payments
        .route(
            "/api/transactions",
            post(handlers::send_transaction_handler),
        )
        // Smart contracts
        .route(
            "/api/smart-contract/deploy",
            post(handlers::deploy_contract_handler),
        )
        .route(
            "/api/smart-contract/interact",
            post(handlers::interact_contract_handler),
        )
        // Out-of-band approvals
        .route("/api/approvals", get(handlers::list_approvals_handler))
        .route(
            "/api/approvals/:id/approve",
            post(handlers::approve_handler),
        )
        .route(
            "/api/approvals/:id/reject",
            post(handlers::reject_handler),
        )
        .layer(cors)
        .with_state(manager)
}

pub async fn start_server(config: DashboardConfig) -> anyhow::Result<()> {
    let manager = Arc::new(DashboardManager::from_config(&config)?);
    let cors = cors_layer(&config.allowed_origins)?;

    // Restore the session in the background so the listener comes up at once
    let startup = manager.clone();
    tokio::spawn(async move {
        match startup.dashboard.start().await {
            Some(address) => log::info!("Session restored for {}", address),
            None => log::info!("No wallet connected yet"),
        }
    });

    let app = create_router(manager, cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    log::info!("Server listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
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
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
