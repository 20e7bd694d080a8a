/// Out-of-band approval queue
///
/// Each connect or sign request from the local wallet is parked here until
/// the user answers it through the API. The wallet call stays suspended
/// in the meantime, as it would while a phone shows the prompt.

use algo_dashboard::{ApprovalRequest, Approver};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;
use uuid::Uuid;

/// A request waiting for the user, as listed by the API
#[derive(Debug, Clone, Serialize)]
pub struct PendingApproval {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub request: ApprovalRequest,
}

struct Parked {
    approval: PendingApproval,
    reply: oneshot::Sender<bool>,
}

#[derive(Default)]
pub struct PendingApprovals {
    parked: Mutex<HashMap<String, Parked>>,
}

impl PendingApprovals {
    pub fn new() -> Self {
        Self::default()
    }

    fn parked(&self) -> MutexGuard<'_, HashMap<String, Parked>> {
        self.parked.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waiting requests, oldest first
    pub fn list(&self) -> Vec<PendingApproval> {
        let mut parked = self.parked();
        parked.retain(|_, p| !p.reply.is_closed());
        let mut pending: Vec<_> = parked.values().map(|p| p.approval.clone()).collect();
        pending.sort_by_key(|p| p.created_at);
        pending
    }

    /// Answer a parked request; `false` when no such request is waiting
    pub fn resolve(&self, id: &str, approved: bool) -> bool {
        let Some(parked) = self.parked().remove(id) else {
            return false;
        };
        if parked.reply.is_closed() {
            log::warn!("Request {} was abandoned before it was answered", id);
            return false;
        }
        log::info!(
            "Request {} {}",
            id,
            if approved { "approved" } else { "rejected" }
        );
        // The requester may have gone away; its answer no longer matters.
        let _ = parked.reply.send(approved);
        true
    }

    fn park(&self, request: ApprovalRequest) -> (String, oneshot::Receiver<bool>) {
        let (reply, answer) = oneshot::channel();
        let id = Uuid::new_v4().to_string();
        let approval = PendingApproval {
            id: id.clone(),
            created_at: Utc::now(),
            request,
        };
        self.parked().insert(id.clone(), Parked { approval, reply });
        (id, answer)
    }

    fn forget(&self, id: &str) {
        if self.parked().remove(id).is_some() {
            log::info!("Request {} withdrawn", id);
        }
    }
}

/// Removes a parked request when its requester stops waiting
struct Withdraw<'a> {
    approvals: &'a PendingApprovals,
    id: String,
}

impl Drop for Withdraw<'_> {
    fn drop(&mut self) {
        self.approvals.forget(&self.id);
    }
}

#[async_trait]
impl Approver for PendingApprovals {
    async fn approve(&self, request: ApprovalRequest) -> bool {
        let (id, answer) = self.park(request);
        log::info!("Waiting for approval of request {}", id);
        let _withdraw = Withdraw {
            approvals: self,
            id,
        };
        answer.await.unwrap_or(false)
    }
}
