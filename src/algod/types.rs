// algod v2 response types

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// GET /v2/accounts/{address}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInformation {
    #[serde(default)]
    pub address: String,
    pub amount: u64,
    #[serde(default)]
    pub min_balance: u64,
    #[serde(default)]
    pub round: u64,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetHolding {
    pub asset_id: u64,
    pub amount: u64,
    #[serde(default)]
    pub is_frozen: bool,
}

/// GET /v2/accounts/{address}/transactions/pending?format=json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactions {
    #[serde(default)]
    pub top_transactions: Vec<PendingTransaction>,
    #[serde(default)]
    pub total_transactions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    #[serde(default)]
    pub sig: Option<String>,
    pub txn: PendingTxnFields,
}

/// Raw transaction fields as the node reports them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTxnFields {
    #[serde(default)]
    pub amt: u64,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub fv: u64,
    #[serde(default)]
    pub lv: u64,
    #[serde(default)]
    pub rcv: Option<String>,
    #[serde(default)]
    pub snd: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// GET /v2/transactions/params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParamsResponse {
    #[serde(default)]
    pub consensus_version: String,
    pub fee: u64,
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

/// Decoded parameters used to build a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    /// Fee per byte in microalgos
    pub fee: u64,
    pub min_fee: u64,
    pub last_round: u64,
    pub genesis_id: String,
    pub genesis_hash: Vec<u8>,
}

impl TryFrom<TransactionParamsResponse> for SuggestedParams {
    type Error = DashboardError;

    fn try_from(raw: TransactionParamsResponse) -> Result<Self, Self::Error> {
        let genesis_hash = BASE64
            .decode(raw.genesis_hash.as_bytes())
            .map_err(|e| DashboardError::invalid_response(format!("genesis-hash: {}", e)))?;
        Ok(Self {
            fee: raw.fee,
            min_fee: raw.min_fee,
            last_round: raw.last_round,
            genesis_id: raw.genesis_id,
            genesis_hash,
        })
    }
}

/// POST /v2/transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// POST /v2/teal/compile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResponse {
    pub hash: String,
    /// Base64 program bytes
    pub result: String,
}

/// Program bytes ready to go into an application transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    /// Address-form hash of the program
    pub hash: String,
    pub bytes: Vec<u8>,
}

impl TryFrom<CompileResponse> for CompiledProgram {
    type Error = DashboardError;

    fn try_from(raw: CompileResponse) -> Result<Self, Self::Error> {
        let bytes = BASE64
            .decode(raw.result.as_bytes())
            .map_err(|e| DashboardError::invalid_response(format!("compiled program: {}", e)))?;
        Ok(Self {
            hash: raw.hash,
            bytes,
        })
    }
}

/// GET /v2/transactions/pending/{txid}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionInfo {
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    /// Id of the application this transaction created
    #[serde(default)]
    pub application_index: Option<u64>,
    /// Non-empty when the pool dropped the transaction
    #[serde(default)]
    pub pool_error: String,
}

impl PendingTransactionInfo {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.is_some_and(|round| round > 0)
    }
}

/// GET /v2/applications/{application-id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationInformation {
    pub id: u64,
    pub params: ApplicationParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationParams {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub global_state: Vec<TealKeyValue>,
}

/// Value type tag: 1 for bytes, 2 for uint
pub const TEAL_BYTES: u8 = 1;
pub const TEAL_UINT: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TealKeyValue {
    /// Base64 key
    pub key: String,
    pub value: TealValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TealValue {
    #[serde(rename = "type")]
    pub kind: u8,
    /// Base64 bytes, set when `kind` is [`TEAL_BYTES`]
    #[serde(default)]
    pub bytes: String,
    #[serde(default)]
    pub uint: u64,
}

impl ApplicationInformation {
    /// First global-state entry holding bytes, still base64-encoded
    pub fn first_stored_bytes(&self) -> Option<&str> {
        self.params
            .global_state
            .iter()
            .find(|kv| kv.value.kind == TEAL_BYTES)
            .map(|kv| kv.value.bytes.as_str())
    }
}

/// Error body returned by algod on non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct NodeErrorBody {
    pub message: String,
}
