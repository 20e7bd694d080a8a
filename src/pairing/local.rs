//! Development wallet holding an Ed25519 key in process
//!
//! Every connect and every signature is routed through an [`Approver`], so
//! the approval step stays out-of-band exactly as with a mobile wallet.
//!
//! With a session file configured, pairing survives restarts: the file
//! holds the paired address and [`WalletPairing::reconnect_session`]
//! resumes from it, the way a mobile bridge resumes a stored session.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::WalletPairing;
use crate::address::encode_address;
use crate::error::PairingError;
use crate::transaction::{SignedTransaction, Transaction};

/// What the user is asked to approve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalRequest {
    Connect {
        address: String,
    },
    Sign {
        tx_id: String,
        txn_type: String,
        sender: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        receiver: Option<String>,
        amount_microalgos: u64,
        fee_microalgos: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        app_id: Option<u64>,
    },
}

#[async_trait]
pub trait Approver: Send + Sync {
    /// Resolves to `true` when the user approves
    async fn approve(&self, request: ApprovalRequest) -> bool;
}

/// Approves everything; for scripted use and tests
pub struct AutoApprove;

#[async_trait]
impl Approver for AutoApprove {
    async fn approve(&self, request: ApprovalRequest) -> bool {
        log::debug!("Auto-approving {:?}", request);
        true
    }
}

pub struct LocalWallet {
    signing_key: SigningKey,
    address: String,
    approver: Arc<dyn Approver>,
    paired: AtomicBool,
    session_file: Option<PathBuf>,
}

impl LocalWallet {
    pub fn from_seed(seed: [u8; 32], approver: Arc<dyn Approver>) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let address = encode_address(&signing_key.verifying_key().to_bytes());
        log::info!("Local wallet ready for {}", address);
        Self {
            signing_key,
            address,
            approver,
            paired: AtomicBool::new(false),
            session_file: None,
        }
    }

    /// Persist the pairing in `path` so a later process can resume it
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Build from a 64-character hex seed
    pub fn from_seed_hex(seed_hex: &str, approver: Arc<dyn Approver>) -> Result<Self, PairingError> {
        let bytes = hex::decode(seed_hex.trim())
            .map_err(|e| PairingError::Transport(format!("invalid wallet seed: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PairingError::Transport("wallet seed must be 32 bytes".to_string()))?;
        Ok(Self::from_seed(seed, approver))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }
}

fn read_session(path: &Path) -> std::io::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let address = contents.trim();
    Ok((!address.is_empty()).then(|| address.to_string()))
}

fn write_session(path: &Path, address: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, address)
}

fn address_of(key: &[u8]) -> String {
    <[u8; 32]>::try_from(key)
        .map(|k| encode_address(&k))
        .unwrap_or_default()
}

#[async_trait]
impl WalletPairing for LocalWallet {
    async fn connect(&self) -> Result<Vec<String>, PairingError> {
        let request = ApprovalRequest::Connect {
            address: self.address.clone(),
        };
        if !self.approver.approve(request).await {
            log::info!("Pairing rejected for {}", self.address);
            return Err(PairingError::Rejected);
        }
        self.paired.store(true, Ordering::SeqCst);
        if let Some(path) = &self.session_file {
            if let Err(e) = write_session(path, &self.address) {
                log::warn!("Failed to persist wallet session at {:?}: {}", path, e);
            }
        }
        Ok(vec![self.address.clone()])
    }

    async fn reconnect_session(&self) -> Result<Vec<String>, PairingError> {
        if self.is_paired() {
            return Ok(vec![self.address.clone()]);
        }
        let Some(path) = &self.session_file else {
            return Ok(Vec::new());
        };

        match read_session(path) {
            Ok(Some(address)) if address == self.address => {
                self.paired.store(true, Ordering::SeqCst);
                log::info!("Resumed wallet session for {}", self.address);
                Ok(vec![address])
            }
            Ok(Some(other)) => {
                log::warn!("Ignoring stored session for foreign address {}", other);
                Ok(Vec::new())
            }
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(PairingError::Transport(format!(
                "failed to read wallet session: {}",
                e
            ))),
        }
    }

    async fn sign_transaction(
        &self,
        txn: &Transaction,
    ) -> Result<SignedTransaction, PairingError> {
        if !self.is_paired() {
            return Err(PairingError::NotConnected);
        }

        let sender = address_of(&txn.sender);
        if sender != self.address {
            return Err(PairingError::UnknownSigner(sender));
        }

        let message = txn
            .bytes_to_sign()
            .map_err(|e| PairingError::Transport(e.to_string()))?;
        let tx_id = txn.id().map_err(|e| PairingError::Transport(e.to_string()))?;

        let request = ApprovalRequest::Sign {
            tx_id,
            txn_type: txn.kind.clone(),
            sender,
            receiver: txn.receiver_address(),
            amount_microalgos: txn.amount,
            fee_microalgos: txn.fee,
            app_id: (txn.app_id != 0).then_some(txn.app_id),
        };
        if !self.approver.approve(request).await {
            return Err(PairingError::Cancelled);
        }

        let signature = self.signing_key.sign(&message);
        Ok(SignedTransaction {
            signature: signature.to_bytes().to_vec(),
            transaction: txn.clone(),
        })
    }

    async fn disconnect(&self) -> Result<(), PairingError> {
        self.paired.store(false, Ordering::SeqCst);
        if let Some(path) = self.session_file.as_deref().filter(|p| p.exists()) {
            fs::remove_file(path).map_err(|e| {
                PairingError::Transport(format!("failed to drop wallet session: {}", e))
            })?;
        }
        log::info!("Local wallet session closed for {}", self.address);
        Ok(())
    }
}
