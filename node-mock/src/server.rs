/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::ledger::Ledger;

pub fn create_router(ledger: Arc<Ledger>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/genesis", get(get_genesis))

        // algod v2
        .route("/v2/transactions/params", get(get_transaction_params))
        .route("/v2/transactions", post(send_raw_transaction))
        .route("/v2/transactions/pending/:txid", get(get_pending_transaction_info))
        .route("/v2/teal/compile", post(compile_teal))
        .route("/v2/applications/:id", get(get_application))
        .route("/v2/accounts/:address", get(get_account))
        .route(
            "/v2/accounts/:address/transactions/pending",
            get(get_pending_transactions),
        )

        // Indexer
        .route("/graphql", post(graphql))

        // Mock helper endpoints
        .route("/mock/fund", post(fund_account))
        .route("/mock/confirm", post(confirm_round))

        // Shared state
        .with_state(ledger)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Confirm pending transactions every `interval`, like a running network
pub fn spawn_confirmer(ledger: Arc<Ledger>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = ledger.confirm() {
                log::error!("Automatic confirmation stopped: {}", e);
                break;
            }
        }
    })
}

pub async fn run_server(ledger: Arc<Ledger>, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(ledger);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Algorand mock node listening on http://{}", addr);
    log::info!("💰 Funding endpoint: POST /mock/fund");
    log::info!("🔨 Round confirmation endpoint: POST /mock/confirm");

    axum::serve(listener, app).await?;

    Ok(())
}
