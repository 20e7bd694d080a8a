//! Wallet-pairing capability
//!
//! The dashboard never holds keys. It pairs with a wallet, learns which
//! accounts the wallet shares, and asks it to sign. Each call may suspend
//! until the user answers in the wallet itself.

pub mod local;

pub use local::{ApprovalRequest, Approver, AutoApprove, LocalWallet};

use async_trait::async_trait;

use crate::error::PairingError;
use crate::transaction::{SignedTransaction, Transaction};

#[async_trait]
pub trait WalletPairing: Send + Sync {
    /// Ask the wallet to pair; resolves once the user approves or rejects
    async fn connect(&self) -> Result<Vec<String>, PairingError>;

    /// Silently resume an existing session, empty when there is none
    async fn reconnect_session(&self) -> Result<Vec<String>, PairingError>;

    /// Request a signature; a user refusal is [`PairingError::Cancelled`]
    async fn sign_transaction(
        &self,
        txn: &Transaction,
    ) -> Result<SignedTransaction, PairingError>;

    /// Drop the session on the wallet side
    async fn disconnect(&self) -> Result<(), PairingError>;
}
