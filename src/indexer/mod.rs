//! Indexing-query capability
//!
//! Historical transactions come from a third-party GraphQL indexer
//! (Bitquery) rather than the node itself.

pub mod client;
pub mod types;
pub mod window;

pub use client::{BitqueryClient, IndexerConfig};
pub use types::*;
pub use window::HistoryWindow;

use async_trait::async_trait;

use crate::error::DashboardError;

#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Most recent transactions sent by `query.address`, newest first
    async fn transactions(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<TransactionRecord>, DashboardError>;

    /// Transfers where `query.address` is sender or receiver
    async fn transfers(&self, query: &HistoryQuery) -> Result<Vec<TransferRecord>, DashboardError>;
}
