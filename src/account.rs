//! Account Data Fetcher
//!
//! Balance and assets, pending transactions and the node's genesis document
//! come from independent node calls. A failure in one is logged and leaves
//! the previous value in place; the others still land.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::algod::{AccountInformation, NodeApi, PendingTransactions};
use crate::state::{apply_for, AssetBalance, DashboardState, PendingRecord};
use crate::units::microalgos_to_algos;

/// Display balance and asset list from the node's account document
pub fn snapshot_from(info: &AccountInformation) -> (Decimal, Vec<AssetBalance>) {
    let assets = info
        .assets
        .iter()
        .map(|asset| AssetBalance {
            id: asset.asset_id,
            amount: asset.amount,
            is_frozen: asset.is_frozen,
        })
        .collect();
    (microalgos_to_algos(info.amount), assets)
}

pub fn pending_from(pending: PendingTransactions) -> Vec<PendingRecord> {
    pending
        .top_transactions
        .into_iter()
        .map(|p| PendingRecord {
            sender: p.txn.snd,
            receiver: p.txn.rcv,
            amount: microalgos_to_algos(p.txn.amt),
            fee: p.txn.fee,
            kind: p.txn.kind,
        })
        .collect()
}

pub struct AccountFetcher {
    node: Arc<dyn NodeApi>,
}

impl AccountFetcher {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    pub async fn fetch_balance_and_assets(
        &self,
        address: &str,
    ) -> Option<(Decimal, Vec<AssetBalance>)> {
        match self.node.account_information(address).await {
            Ok(info) => Some(snapshot_from(&info)),
            Err(e) => {
                log::error!("Failed to fetch account data for {}: {}", address, e);
                None
            }
        }
    }

    pub async fn fetch_pending(&self, address: &str) -> Option<Vec<PendingRecord>> {
        match self.node.pending_transactions_by_address(address).await {
            Ok(pending) => Some(pending_from(pending)),
            Err(e) => {
                log::error!("Failed to fetch pending transactions for {}: {}", address, e);
                None
            }
        }
    }

    pub async fn fetch_genesis(&self) -> Option<serde_json::Value> {
        match self.node.genesis().await {
            Ok(genesis) => Some(genesis),
            Err(e) => {
                log::error!("Failed to fetch genesis data: {}", e);
                None
            }
        }
    }

    /// Run all node calls concurrently, applying each result as it arrives
    ///
    /// Never fails: partial data is an accepted outcome.
    pub async fn refresh(&self, address: &str, state: &RwLock<DashboardState>) {
        let account = async {
            if let Some((balance, assets)) = self.fetch_balance_and_assets(address).await {
                apply_for(state, address, |s| {
                    s.balance = Some(balance);
                    s.assets = assets;
                })
                .await;
            }
        };

        let pending = async {
            if let Some(pending) = self.fetch_pending(address).await {
                apply_for(state, address, |s| s.pending = pending).await;
            }
        };

        let genesis = async {
            if let Some(genesis) = self.fetch_genesis().await {
                state.write().await.genesis = Some(genesis);
            }
        };

        tokio::join!(account, pending, genesis);
    }
}
