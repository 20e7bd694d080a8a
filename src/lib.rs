//! Algo Dashboard: Algorand wallet dashboard core
//!
//! This crate connects a wallet through a pairing capability, reads account
//! data from an algod node and transaction history from a GraphQL indexer,
//! and submits simple payments signed by the paired wallet. It can also
//! deploy a small TEAL contract and store or read a value in it.
//!
//! # Architecture
//!
//! - **Session Manager**: connected address, persisted across restarts
//! - **Account / History Fetchers**: independent, failure-tolerant reads
//! - **Transaction Submitter**: validate, build, sign, submit
//! - **Contract Client**: compile, deploy, call and read applications
//! - **Dashboard**: orchestrates the above over shared view state
//!
//! # Example
//!
//! ```ignore
//! use algo_dashboard::*;
//!
//! let dashboard = Dashboard::new(
//!     Collaborators {
//!         node: Arc::new(AlgodClient::new(&AlgodConfig::default())),
//!         indexer: Arc::new(BitqueryClient::new(&indexer_config)),
//!         pairing: Arc::new(LocalWallet::from_seed_hex(&seed, Arc::new(AutoApprove))?),
//!         store: Arc::new(FileAddressStore::new()),
//!     },
//!     "algorand_testnet",
//!     HistoryWindow::default(),
//! );
//!
//! dashboard.start().await;
//! let tx_id = dashboard.send(&DraftPayment::new(recipient, "2.5")).await?;
//! ```

// Public modules
pub mod account;
pub mod address;
pub mod algod;
pub mod contract;
pub mod error;
pub mod history;
pub mod indexer;
pub mod manager;
pub mod pairing;
pub mod session;
pub mod state;
pub mod store;
pub mod submit;
pub mod transaction;
pub mod units;

// Re-exports for convenience
pub use account::AccountFetcher;
pub use address::{decode_address, encode_address, is_valid_address};
pub use algod::{AlgodClient, AlgodConfig, NodeApi, SuggestedParams};
pub use contract::{
    ConfirmationPolicy, ContractClient, DeployRequest, Deployment, InteractOutcome,
    InteractRequest, StoredValue,
};
pub use error::{ContractError, DashboardError, DraftError, PairingError, SubmitError};
pub use history::HistoryFetcher;
pub use indexer::{
    BitqueryClient, HistoryApi, HistoryQuery, HistoryWindow, IndexerConfig, TransactionRecord,
    TransferRecord, HISTORY_PAGE_SIZE,
};
pub use manager::{Collaborators, Dashboard};
pub use pairing::{ApprovalRequest, Approver, AutoApprove, LocalWallet, WalletPairing};
pub use session::SessionManager;
pub use state::{AssetBalance, DashboardState, PendingRecord, SharedState};
pub use store::{AddressStore, FileAddressStore, MemoryAddressStore};
pub use submit::{success_notice, DraftPayment, TransactionSubmitter};
pub use transaction::{
    build_app_call, build_app_create, build_payment, SignedTransaction, StateSchema, Transaction,
};
pub use units::{algos_to_microalgos, microalgos_to_algos, MICROALGOS_PER_ALGO};

// Common result type
pub type Result<T> = std::result::Result<T, DashboardError>;
