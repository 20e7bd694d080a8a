/// Axum HTTP handlers for the algod and GraphQL indexer endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError};
use crate::types::*;

/// Shared application state
pub type AppState = Arc<Ledger>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Poisoned => ApiError::Internal(err.to_string()),
            LedgerError::UnknownApplication(_) | LedgerError::UnknownTransaction(_) => {
                ApiError::NotFound(err.to_string())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// GET /genesis
pub async fn get_genesis(State(ledger): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(ledger.genesis()?))
}

/// GET /v2/transactions/params
pub async fn get_transaction_params(
    State(ledger): State<AppState>,
) -> Result<Json<ParamsResponse>, ApiError> {
    Ok(Json(ledger.params()?))
}

/// GET /v2/accounts/{address}
pub async fn get_account(
    State(ledger): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    Ok(Json(ledger.account(&address)?))
}

/// GET /v2/accounts/{address}/transactions/pending
/// Only the JSON format is served
pub async fn get_pending_transactions(
    State(ledger): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PendingResponse>, ApiError> {
    Ok(Json(ledger.pending_for(&address)?))
}

/// POST /v2/transactions
/// Body is a msgpack-encoded signed transaction
pub async fn send_raw_transaction(
    State(ledger): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let tx_id = ledger.submit(&body).map_err(|e| {
        log::warn!("Rejected transaction: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(SubmitResponse { tx_id }))
}

/// GET /v2/transactions/pending/{txid}
pub async fn get_pending_transaction_info(
    State(ledger): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<Json<PendingInfoResponse>, ApiError> {
    Ok(Json(ledger.pending_info(&tx_id)?))
}

/// POST /v2/teal/compile
/// Body is the TEAL source
pub async fn compile_teal(
    State(ledger): State<AppState>,
    source: String,
) -> Result<Json<CompileResponse>, ApiError> {
    Ok(Json(ledger.compile(&source)?))
}

/// GET /v2/applications/{application-id}
pub async fn get_application(
    State(ledger): State<AppState>,
    Path(app_id): Path<u64>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    Ok(Json(ledger.application(app_id)?))
}

/// POST /graphql
/// Answers the Algorand transactions and transfers queries in Bitquery's shape
pub async fn graphql(
    State(ledger): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GraphQlRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if !ledger.authorized(bearer) {
        return Err(ApiError::Unauthorized);
    }

    let algorand = if req.query.contains("transfers(") {
        serde_json::json!({ "transfers": ledger.transfers(&req.variables)? })
    } else {
        serde_json::json!({ "transactions": ledger.history(&req.variables)? })
    };
    Ok(Json(serde_json::json!({ "data": { "algorand": algorand } })))
}

// ============================================================================
// MOCK HELPER ENDPOINTS (not part of the algod API)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub address: String,
    pub microalgos: u64,
    #[serde(default)]
    pub assets: Vec<AssetHoldingResponse>,
}

#[derive(Debug, Serialize)]
pub struct FundResponse {
    pub address: String,
    pub amount: u64,
}

/// POST /mock/fund
pub async fn fund_account(
    State(ledger): State<AppState>,
    Json(req): Json<FundRequest>,
) -> Result<Json<FundResponse>, ApiError> {
    let amount = ledger.fund(&req.address, req.microalgos)?;
    for asset in &req.assets {
        ledger.add_asset(&req.address, asset.asset_id, asset.amount, asset.is_frozen)?;
    }
    Ok(Json(FundResponse {
        address: req.address,
        amount,
    }))
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub confirmed: usize,
    pub round: u64,
}

/// POST /mock/confirm
/// Applies every pending transaction in a new round
pub async fn confirm_round(State(ledger): State<AppState>) -> Result<Json<ConfirmResponse>, ApiError> {
    let confirmed = ledger.confirm()?;
    let round = ledger.round()?;
    Ok(Json(ConfirmResponse { confirmed, round }))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
