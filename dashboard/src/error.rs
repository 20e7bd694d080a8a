use algo_dashboard::error::CONNECT_FAILED_NOTICE;
use algo_dashboard::{ContractError, DashboardError, PairingError, SubmitError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::types::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Wallet connection failed: {0}")]
    Connect(#[from] PairingError),

    #[error("Transaction failed: {0}")]
    Submit(#[from] SubmitError),

    #[error("Contract call failed: {0}")]
    Contract(#[from] ContractError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("Approval request not found: {0}")]
    ApprovalNotFound(String),
}

impl ApiError {
    /// Message the view shows the user for this failure
    pub fn notice(&self) -> String {
        match self {
            ApiError::Connect(_) => CONNECT_FAILED_NOTICE.to_string(),
            ApiError::Submit(err) => err.notice(),
            ApiError::Contract(err) => err.notice(),
            ApiError::Dashboard(_) => "Something went wrong. Check the console for more details.".to_string(),
            ApiError::ApprovalNotFound(_) => "This request is no longer pending.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Connect(PairingError::Rejected | PairingError::Cancelled) => StatusCode::FORBIDDEN,
            ApiError::Connect(_) => StatusCode::BAD_GATEWAY,
            ApiError::Submit(SubmitError::Cancelled) => StatusCode::CONFLICT,
            ApiError::Submit(SubmitError::NotConnected) => StatusCode::CONFLICT,
            ApiError::Submit(SubmitError::InvalidDraft(_)) => StatusCode::BAD_REQUEST,
            ApiError::Submit(_) => StatusCode::BAD_GATEWAY,
            ApiError::Contract(ContractError::InvalidRequest(_) | ContractError::Compile(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Contract(ContractError::Submit(SubmitError::InvalidDraft(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Contract(ContractError::Submit(
                SubmitError::Cancelled | SubmitError::NotConnected,
            )) => StatusCode::CONFLICT,
            ApiError::Contract(ContractError::NoStoredValue(_)) => StatusCode::NOT_FOUND,
            ApiError::Contract(_) => StatusCode::BAD_GATEWAY,
            ApiError::Dashboard(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ApprovalNotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            notice: self.notice(),
        });

        (status, body).into_response()
    }
}
