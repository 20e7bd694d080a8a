use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::*;
use super::NodeApi;
use crate::error::DashboardError;

const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Connection settings for an algod node
#[derive(Clone, Debug)]
pub struct AlgodConfig {
    pub url: String,
    /// Empty for public endpoints such as algonode
    pub token: Option<String>,
}

impl Default for AlgodConfig {
    fn default() -> Self {
        Self {
            url: "https://testnet-api.algonode.cloud".to_string(),
            token: None,
        }
    }
}

pub struct AlgodClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl AlgodClient {
    pub fn new(config: &AlgodConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.header(API_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        log::debug!("GET {}{}", self.base_url, path);
        let response = self.request(reqwest::Method::GET, path).send().await?;
        decode_response(response).await
    }
}

/// Turn a node response into `T`, or a `NodeRejected` carrying the node's message
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DashboardError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<NodeErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        return Err(DashboardError::NodeRejected {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| DashboardError::invalid_response(e.to_string()))
}

#[async_trait]
impl NodeApi for AlgodClient {
    async fn account_information(
        &self,
        address: &str,
    ) -> Result<AccountInformation, DashboardError> {
        self.get_json(&format!("/v2/accounts/{}", address)).await
    }

    async fn pending_transactions_by_address(
        &self,
        address: &str,
    ) -> Result<PendingTransactions, DashboardError> {
        self.get_json(&format!(
            "/v2/accounts/{}/transactions/pending?format=json",
            address
        ))
        .await
    }

    async fn transaction_params(&self) -> Result<SuggestedParams, DashboardError> {
        let raw: TransactionParamsResponse = self.get_json("/v2/transactions/params").await?;
        SuggestedParams::try_from(raw)
    }

    async fn send_raw_transaction(&self, signed: Vec<u8>) -> Result<String, DashboardError> {
        log::debug!("Submitting {} signed bytes to {}", signed.len(), self.base_url);
        let response = self
            .request(reqwest::Method::POST, "/v2/transactions")
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed)
            .send()
            .await?;
        let sent: SendTransactionResponse = decode_response(response).await?;
        Ok(sent.tx_id)
    }

    async fn genesis(&self) -> Result<serde_json::Value, DashboardError> {
        self.get_json("/genesis").await
    }

    async fn compile_teal(&self, source: &str) -> Result<CompiledProgram, DashboardError> {
        log::debug!("Compiling {} bytes of TEAL on {}", source.len(), self.base_url);
        let response = self
            .request(reqwest::Method::POST, "/v2/teal/compile")
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(source.to_string())
            .send()
            .await?;
        let compiled: CompileResponse = decode_response(response).await?;
        CompiledProgram::try_from(compiled)
    }

    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, DashboardError> {
        self.get_json(&format!("/v2/transactions/pending/{}?format=json", tx_id))
            .await
    }

    async fn application_information(
        &self,
        app_id: u64,
    ) -> Result<ApplicationInformation, DashboardError> {
        self.get_json(&format!("/v2/applications/{}", app_id)).await
    }
}
