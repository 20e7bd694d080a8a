//! Dashboard state rendered by the view
//!
//! Each fetcher writes only its own fields, and only while the address it
//! fetched for is still the connected one. There is no joint update.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::indexer::{TransactionRecord, TransferRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetBalance {
    pub id: u64,
    pub amount: u64,
    pub is_frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRecord {
    pub sender: String,
    pub receiver: Option<String>,
    /// ALGO
    pub amount: Decimal,
    pub fee: u64,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub address: Option<String>,
    /// ALGO; `None` until the first successful fetch
    pub balance: Option<Decimal>,
    pub assets: Vec<AssetBalance>,
    pub pending: Vec<PendingRecord>,
    pub history: Vec<TransactionRecord>,
    pub transfers: Vec<TransferRecord>,
    pub genesis: Option<serde_json::Value>,
}

impl DashboardState {
    /// Switch to another account (or none), dropping data of the previous one
    pub fn reset_for(&mut self, address: Option<String>) {
        let genesis = self.genesis.take();
        *self = Self {
            address,
            genesis,
            ..Self::default()
        };
    }
}

pub type SharedState = Arc<RwLock<DashboardState>>;

/// Apply `update` if `address` is still the connected account
pub async fn apply_for<F>(state: &RwLock<DashboardState>, address: &str, update: F) -> bool
where
    F: FnOnce(&mut DashboardState),
{
    let mut guard = state.write().await;
    if guard.address.as_deref() != Some(address) {
        log::debug!("Discarding result for {}, no longer connected", address);
        return false;
    }
    update(&mut guard);
    true
}
