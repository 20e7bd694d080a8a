use algo_dashboard::{
    success_notice, DashboardState, DeployRequest, DraftPayment, InteractOutcome, InteractRequest,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::types::*;
use crate::approvals::PendingApproval;
use crate::error::ApiError;
use crate::manager::DashboardManager;

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn get_dashboard_handler(
    State(manager): State<Arc<DashboardManager>>,
) -> Json<DashboardState> {
    Json(manager.dashboard.state().await)
}

/// Suspends until the pairing request is answered
pub async fn connect_handler(
    State(manager): State<Arc<DashboardManager>>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let address = manager.dashboard.connect().await?;
    Ok(Json(ConnectResponse { address }))
}

pub async fn disconnect_handler(
    State(manager): State<Arc<DashboardManager>>,
) -> Result<Json<DisconnectResponse>, ApiError> {
    manager.dashboard.disconnect().await?;
    Ok(Json(DisconnectResponse {
        status: "disconnected".to_string(),
    }))
}

pub async fn refresh_handler(
    State(manager): State<Arc<DashboardManager>>,
) -> Json<DashboardState> {
    manager.dashboard.refresh().await;
    Json(manager.dashboard.state().await)
}

/// Suspends until the signature request is answered
pub async fn send_transaction_handler(
    State(manager): State<Arc<DashboardManager>>,
    Json(draft): Json<DraftPayment>,
) -> Result<Json<SendTransactionResponse>, ApiError> {
    let tx_id = manager.dashboard.send(&draft).await?;
    Ok(Json(SendTransactionResponse {
        notice: success_notice(&tx_id),
        tx_id,
    }))
}

/// Compiles and deploys the posted TEAL, waiting for confirmation
pub async fn deploy_contract_handler(
    State(manager): State<Arc<DashboardManager>>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, ApiError> {
    let deployment = manager.dashboard.deploy_contract(&request.code).await?;
    Ok(Json(DeployResponse {
        app_id: deployment.app_id,
        tx_id: deployment.tx_id,
    }))
}

pub async fn interact_contract_handler(
    State(manager): State<Arc<DashboardManager>>,
    Json(request): Json<InteractRequest>,
) -> Result<Json<InteractResponse>, ApiError> {
    let response = match manager.dashboard.interact_contract(&request).await? {
        InteractOutcome::Store { tx_id } => InteractResponse::Stored {
            message: "Value stored successfully".to_string(),
            tx_id,
        },
        InteractOutcome::Read(value) => InteractResponse::Read {
            stored_value: value.stored_value,
            text: value.text,
        },
    };
    Ok(Json(response))
}

pub async fn list_approvals_handler(
    State(manager): State<Arc<DashboardManager>>,
) -> Json<Vec<PendingApproval>> {
    Json(manager.approvals.list())
}

pub async fn approve_handler(
    State(manager): State<Arc<DashboardManager>>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalDecisionResponse>, ApiError> {
    decide(&manager, id, true)
}

pub async fn reject_handler(
    State(manager): State<Arc<DashboardManager>>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalDecisionResponse>, ApiError> {
    decide(&manager, id, false)
}

fn decide(
    manager: &DashboardManager,
    id: String,
    approved: bool,
) -> Result<Json<ApprovalDecisionResponse>, ApiError> {
    if !manager.approvals.resolve(&id, approved) {
        return Err(ApiError::ApprovalNotFound(id));
    }
    Ok(Json(ApprovalDecisionResponse { id, approved }))
}
