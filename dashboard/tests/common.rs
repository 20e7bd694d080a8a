/// Common test utilities for dashboard API integration tests
///
/// Spins up the mock node and the dashboard server on ephemeral ports,
/// with the address store in a temporary directory.

use algo_dashboard::{AutoApprove, LocalWallet};
use dashboard::api::server::{cors_layer, create_router};
use dashboard::{DashboardConfig, DashboardManager};
use node_mock::Ledger;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SEED: [u8; 32] = [7u8; 32];

/// Running mock node plus dashboard server
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub ledger: Arc<Ledger>,
    pub node_url: String,
    pub api_url: String,
    pub manager: Arc<DashboardManager>,
    pub wallet_address: String,
    pub http: reqwest::Client,
}

async fn serve(router: axum::Router) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok(addr)
}

impl TestEnvironment {
    pub async fn new() -> anyhow::Result<Self> {
        env_logger::builder().is_test(true).try_init().ok();

        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let ledger = Arc::new(Ledger::new("mocknet-v1.0", None));
        let node_addr = serve(node_mock::create_router(ledger.clone())).await?;
        let node_url = format!("http://{}", node_addr);

        let mut vars = HashMap::new();
        vars.insert("ALGOD_URL", node_url.clone());
        vars.insert("BITQUERY_URL", format!("{}/graphql", node_url));
        vars.insert("WALLET_SEED", hex::encode(SEED));
        vars.insert("DATA_DIR", temp_dir.path().display().to_string());
        vars.insert("CONFIRMATION_POLL_MS", "20".to_string());
        let config = DashboardConfig::from_lookup(|key| vars.get(key).cloned())?;

        let manager = Arc::new(DashboardManager::from_config(&config)?);
        let api_addr = serve(create_router(manager.clone(), cors_layer(&[])?)).await?;

        let wallet_address = LocalWallet::from_seed(SEED, Arc::new(AutoApprove))
            .address()
            .to_string();

        Ok(Self {
            temp_dir,
            ledger,
            node_url,
            api_url: format!("http://{}", api_addr),
            manager,
            wallet_address,
            http: reqwest::Client::new(),
        })
    }

    /// Confirm pending transactions in the background, like a live network
    pub fn auto_confirm(&self) -> tokio::task::JoinHandle<()> {
        node_mock::spawn_confirmer(self.ledger.clone(), Duration::from_millis(25))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub async fn get_json(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        Ok(self.http.get(self.url(path)).send().await?.json().await?)
    }

    /// Poll the approval queue until a request shows up
    pub async fn next_approval(&self) -> anyhow::Result<serde_json::Value> {
        for _ in 0..200 {
            let pending = self.get_json("/api/approvals").await?;
            if let Some(first) = pending.as_array().and_then(|list| list.first()) {
                return Ok(first.clone());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!("no approval request arrived")
    }

    pub async fn decide(&self, id: &str, approve: bool) -> anyhow::Result<reqwest::StatusCode> {
        let action = if approve { "approve" } else { "reject" };
        let response = self
            .http
            .post(self.url(&format!("/api/approvals/{}/{}", id, action)))
            .send()
            .await?;
        Ok(response.status())
    }

    /// Connect through the API, approving the pairing request
    pub async fn connect(&self) -> anyhow::Result<String> {
        let http = self.http.clone();
        let url = self.url("/api/session/connect");
        let request = tokio::spawn(async move { http.post(url).send().await });

        let approval = self.next_approval().await?;
        let id = approval["id"].as_str().unwrap_or_default().to_string();
        self.decide(&id, true).await?;

        let body: serde_json::Value = request.await??.json().await?;
        Ok(body["address"].as_str().unwrap_or_default().to_string())
    }
}
