/// algod and indexer response types
///
/// These match the shapes the real services return so clients can consume
/// them transparently.

use serde::{Deserialize, Serialize};

/// GET /v2/accounts/{address}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountResponse {
    pub address: String,
    pub amount: u64,
    pub min_balance: u64,
    pub round: u64,
    pub assets: Vec<AssetHoldingResponse>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetHoldingResponse {
    pub asset_id: u64,
    pub amount: u64,
    pub is_frozen: bool,
}

/// GET /v2/accounts/{address}/transactions/pending
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingResponse {
    pub top_transactions: Vec<PendingEntry>,
    pub total_transactions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingEntry {
    pub sig: String,
    pub txn: PendingTxnJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTxnJson {
    pub amt: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apid: Option<u64>,
    pub fee: u64,
    pub fv: u64,
    pub lv: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcv: Option<String>,
    pub snd: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// GET /v2/transactions/pending/{txid}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingInfoResponse {
    /// Zero while the transaction is still in the pool
    pub confirmed_round: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_index: Option<u64>,
    pub pool_error: String,
    pub txn: PendingEntry,
}

/// POST /v2/teal/compile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResponse {
    pub hash: String,
    /// base64
    pub result: String,
}

/// GET /v2/applications/{application-id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: u64,
    pub params: ApplicationParamsResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationParamsResponse {
    pub creator: String,
    /// base64
    pub approval_program: String,
    /// base64
    pub clear_state_program: String,
    pub global_state: Vec<TealKeyValueJson>,
    pub global_state_schema: StateSchemaJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StateSchemaJson {
    pub num_byte_slice: u64,
    pub num_uint: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TealKeyValueJson {
    /// base64
    pub key: String,
    pub value: TealValueJson,
}

/// `type` 1 carries `bytes` (base64), `type` 2 carries `uint`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TealValueJson {
    #[serde(rename = "type")]
    pub kind: u8,
    pub bytes: String,
    pub uint: u64,
}

/// GET /v2/transactions/params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamsResponse {
    pub consensus_version: String,
    pub fee: u64,
    /// base64
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

/// POST /v2/transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Bitquery-shaped transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedTransaction {
    pub block: IndexedBlock,
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fee: f64,
    pub fee_usd: Option<f64>,
    pub currency: IndexedCurrency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedBlock {
    pub timestamp: IndexedTimestamp,
    pub height: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedTimestamp {
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedCurrency {
    #[serde(rename = "tokenId")]
    pub token_id: u64,
    pub symbol: String,
}

/// Bitquery-shaped transfer row, one per transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedTransfer {
    pub sum_in: f64,
    pub sum_out: f64,
    pub count_in: u64,
    pub count_out: u64,
    pub currency: IndexedCurrency,
    pub receiver: IndexedAddress,
    pub sender: IndexedAddress,
    pub amount: f64,
    pub date: IndexedDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedAddress {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDate {
    pub date: String,
}

/// GraphQL request body
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlRequest {
    #[serde(default)]
    pub query: String,
    pub variables: HistoryVariables,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryVariables {
    #[serde(default)]
    pub network: String,
    pub address: String,
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub till: Option<String>,
}

/// Error body in algod's format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
