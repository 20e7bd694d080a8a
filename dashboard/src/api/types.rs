use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ConnectResponse {
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DisconnectResponse {
    pub status: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SendTransactionResponse {
    pub tx_id: String,
    pub notice: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApprovalDecisionResponse {
    pub id: String,
    pub approved: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub app_id: u64,
    pub tx_id: String,
}

/// Store answers with a confirmation, read with the stored value
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InteractResponse {
    Stored {
        message: String,
        #[serde(rename = "txId")]
        tx_id: String,
    },
    Read {
        stored_value: String,
        text: Option<String>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub notice: String,
}
