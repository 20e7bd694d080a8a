use async_trait::async_trait;
use serde_json::json;

use super::types::*;
use super::HistoryApi;
use crate::error::DashboardError;

/// Transactions sent by an address inside a date window, newest first
pub const HISTORY_QUERY: &str = r#"
query ($network: AlgorandNetwork!, $address: String!, $limit: Int!, $offset: Int!,
       $from: ISO8601DateTime, $till: ISO8601DateTime) {
  algorand(network: $network) {
    transactions(
      options: {desc: "block.timestamp.time", limit: $limit, offset: $offset}
      date: {since: $from, till: $till}
      txSender: {is: $address}
    ) {
      block {
        timestamp { time(format: "%Y-%m-%d %H:%M:%S") }
        height
      }
      hash
      type
      fee
      fee_usd: fee(in: USD)
      currency { tokenId symbol }
    }
  }
}
"#;

/// Transfers in or out of an address inside a date window
pub const TRANSFERS_QUERY: &str = r#"
query ($network: AlgorandNetwork!, $address: String!, $from: ISO8601DateTime,
       $till: ISO8601DateTime, $limit: Int!, $offset: Int!) {
  algorand(network: $network) {
    transfers(
      date: {since: $from, till: $till}
      amount: {gt: 0}
      any: [{receiver: {is: $address}}, {sender: {is: $address}}]
      options: {limit: $limit, offset: $offset, desc: ["count_in", "count_out"], asc: "currency.symbol"}
    ) {
      sum_in: amount(calculate: sum, receiver: {is: $address})
      sum_out: amount(calculate: sum, sender: {is: $address})
      count_in: count(receiver: {is: $address})
      count_out: count(sender: {is: $address})
      currency { tokenId symbol }
      receiver { address }
      sender { address }
      amount
      date { date }
    }
  }
}
"#;

#[derive(Clone, Debug)]
pub struct IndexerConfig {
    pub url: String,
    /// Bearer credential for the indexing service
    pub api_key: String,
    /// Network identifier understood by the indexer, e.g. `algorand_testnet`
    pub network: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            url: "https://graphql.bitquery.io".to_string(),
            api_key: String::new(),
            network: "algorand_testnet".to_string(),
        }
    }
}

pub struct BitqueryClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl BitqueryClient {
    pub fn new(config: &IndexerConfig) -> Self {
        if config.api_key.is_empty() {
            log::warn!("No indexer API key configured, history queries will likely be refused");
        }
        Self {
            http: reqwest::Client::new(),
            endpoint: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn post(
        &self,
        graphql: &str,
        query: &HistoryQuery,
    ) -> Result<GraphQlResponse, DashboardError> {
        log::debug!(
            "Indexer query for {} (limit {}, {} .. {})",
            query.address,
            query.limit,
            query.from,
            query.till
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "query": graphql, "variables": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::QueryFailed(format!(
                "indexer returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DashboardError::invalid_response(e.to_string()))
    }
}

/// The `algorand` object of a response, treating `errors` as failure
fn algorand_data(response: GraphQlResponse) -> Result<AlgorandData, DashboardError> {
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(DashboardError::QueryFailed(messages.join("; ")));
    }

    response
        .data
        .and_then(|d| d.algorand)
        .ok_or_else(|| DashboardError::QueryFailed("Algorand data not found".to_string()))
}

pub fn records_from_response(
    response: GraphQlResponse,
) -> Result<Vec<TransactionRecord>, DashboardError> {
    let transactions = algorand_data(response)?
        .transactions
        .ok_or_else(|| DashboardError::QueryFailed("Transactions data not found".to_string()))?;

    Ok(transactions.into_iter().map(TransactionRecord::from).collect())
}

pub fn transfers_from_response(
    response: GraphQlResponse,
) -> Result<Vec<TransferRecord>, DashboardError> {
    let transfers = algorand_data(response)?
        .transfers
        .ok_or_else(|| DashboardError::QueryFailed("Transfers data not found".to_string()))?;

    Ok(transfers.into_iter().map(TransferRecord::from).collect())
}

#[async_trait]
impl HistoryApi for BitqueryClient {
    async fn transactions(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<TransactionRecord>, DashboardError> {
        records_from_response(self.post(HISTORY_QUERY, query).await?)
    }

    async fn transfers(&self, query: &HistoryQuery) -> Result<Vec<TransferRecord>, DashboardError> {
        transfers_from_response(self.post(TRANSFERS_QUERY, query).await?)
    }
}
