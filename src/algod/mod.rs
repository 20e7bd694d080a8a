//! Node-query capability
//!
//! - [`NodeApi`]: the operations the dashboard needs from an algod node
//! - [`AlgodClient`]: implementation over the algod v2 REST API

pub mod client;
pub mod types;

pub use client::{AlgodClient, AlgodConfig};
pub use types::*;

use async_trait::async_trait;

use crate::error::DashboardError;

#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn account_information(&self, address: &str)
        -> Result<AccountInformation, DashboardError>;

    async fn pending_transactions_by_address(
        &self,
        address: &str,
    ) -> Result<PendingTransactions, DashboardError>;

    async fn transaction_params(&self) -> Result<SuggestedParams, DashboardError>;

    /// Submit signed transaction bytes, returning the transaction id
    async fn send_raw_transaction(&self, signed: Vec<u8>) -> Result<String, DashboardError>;

    async fn genesis(&self) -> Result<serde_json::Value, DashboardError>;

    /// Compile TEAL source on the node
    async fn compile_teal(&self, source: &str) -> Result<CompiledProgram, DashboardError>;

    /// Pool status of a submitted transaction, confirmed or not
    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, DashboardError>;

    async fn application_information(
        &self,
        app_id: u64,
    ) -> Result<ApplicationInformation, DashboardError>;
}
