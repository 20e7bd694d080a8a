/// Dashboard Manager - server-side owner of the dashboard and its wallet
///
/// Built once at startup from [`DashboardConfig`]; handlers share it
/// through an `Arc`.

use algo_dashboard::{
    AlgodClient, Approver, AutoApprove, BitqueryClient, Collaborators, Dashboard,
    FileAddressStore, LocalWallet,
};
use anyhow::{Context, Result};
use std::sync::Arc;

use crate::approvals::PendingApprovals;
use crate::config::DashboardConfig;

/// Marker of an accepted pairing, next to the persisted address
pub const WALLET_SESSION_FILE: &str = "wallet_session.txt";

pub struct DashboardManager {
    pub dashboard: Dashboard,
    pub approvals: Arc<PendingApprovals>,
}

impl DashboardManager {
    pub fn new(dashboard: Dashboard, approvals: Arc<PendingApprovals>) -> Self {
        Self {
            dashboard,
            approvals,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let approvals = Arc::new(PendingApprovals::new());
        let approver: Arc<dyn Approver> = if config.auto_approve {
            Arc::new(AutoApprove)
        } else {
            approvals.clone()
        };

        let wallet = LocalWallet::from_seed_hex(&config.wallet_seed, approver)
            .context("Invalid WALLET_SEED")?
            .with_session_file(config.data_dir.join(WALLET_SESSION_FILE));
        log::info!("🔑 Local wallet address: {}", wallet.address());

        let collaborators = Collaborators {
            node: Arc::new(AlgodClient::new(&config.algod)),
            indexer: Arc::new(BitqueryClient::new(&config.indexer)),
            pairing: Arc::new(wallet),
            store: Arc::new(FileAddressStore::new_with_base_dir(config.data_dir.clone())),
        };

        let dashboard = Dashboard::new(
            collaborators,
            config.indexer.network.clone(),
            config.history_window.clone(),
        )
        .with_confirmation_policy(config.confirmation);

        Ok(Self::new(dashboard, approvals))
    }
}
