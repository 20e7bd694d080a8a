//! History Fetcher
//!
//! Two indexer queries per refresh, run side by side: transactions sent by
//! the address and transfers in or out of it. Each is bounded to
//! [`HISTORY_PAGE_SIZE`] records inside the configured [`HistoryWindow`]
//! and lands in state on its own.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::indexer::{
    HistoryApi, HistoryQuery, HistoryWindow, TransactionRecord, TransferRecord, HISTORY_PAGE_SIZE,
};
use crate::state::{apply_for, DashboardState};

pub struct HistoryFetcher {
    api: Arc<dyn HistoryApi>,
    network: String,
    window: HistoryWindow,
}

impl HistoryFetcher {
    pub fn new(api: Arc<dyn HistoryApi>, network: impl Into<String>, window: HistoryWindow) -> Self {
        Self {
            api,
            network: network.into(),
            window,
        }
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    pub fn query_for(&self, address: &str, now: DateTime<Utc>) -> HistoryQuery {
        let (from, till) = self.window.resolve(now);
        HistoryQuery {
            network: self.network.clone(),
            address: address.to_string(),
            limit: HISTORY_PAGE_SIZE,
            offset: 0,
            from: from.to_rfc3339_opts(SecondsFormat::Millis, true),
            till: till.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Latest transactions for `address`, or `None` when the query failed
    pub async fn fetch(&self, address: &str) -> Option<Vec<TransactionRecord>> {
        let query = self.query_for(address, Utc::now());
        match self.api.transactions(&query).await {
            Ok(mut records) => {
                records.truncate(HISTORY_PAGE_SIZE as usize);
                log::debug!("Fetched {} history records for {}", records.len(), address);
                Some(records)
            }
            Err(e) => {
                log::error!("Failed to fetch transaction history for {}: {}", address, e);
                None
            }
        }
    }

    /// Latest transfers touching `address`, or `None` when the query failed
    pub async fn fetch_transfers(&self, address: &str) -> Option<Vec<TransferRecord>> {
        let query = self.query_for(address, Utc::now());
        match self.api.transfers(&query).await {
            Ok(mut transfers) => {
                transfers.truncate(HISTORY_PAGE_SIZE as usize);
                log::debug!("Fetched {} transfers for {}", transfers.len(), address);
                Some(transfers)
            }
            Err(e) => {
                log::error!("Failed to fetch transfers for {}: {}", address, e);
                None
            }
        }
    }

    /// Replace each list on success; keep it on failure
    pub async fn refresh(&self, address: &str, state: &RwLock<DashboardState>) {
        let transactions = async {
            if let Some(records) = self.fetch(address).await {
                apply_for(state, address, |s| s.history = records).await;
            }
        };

        let transfers = async {
            if let Some(transfers) = self.fetch_transfers(address).await {
                apply_for(state, address, |s| s.transfers = transfers).await;
            }
        };

        tokio::join!(transactions, transfers);
    }
}
