//! Session Manager
//!
//! Owns the connected account and keeps it in sync with persisted storage.
//! Restoration reads storage first (what the user sees immediately) and then
//! asks the wallet to resume its own session; connect and disconnect are
//! explicit user actions.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{DashboardError, PairingError};
use crate::pairing::WalletPairing;
use crate::store::AddressStore;

pub struct SessionManager {
    pairing: Arc<dyn WalletPairing>,
    store: Arc<dyn AddressStore>,
    current: RwLock<Option<String>>,
}

impl SessionManager {
    pub fn new(pairing: Arc<dyn WalletPairing>, store: Arc<dyn AddressStore>) -> Self {
        Self {
            pairing,
            store,
            current: RwLock::new(None),
        }
    }

    pub async fn current(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Adopt `address` as the active account and persist it
    ///
    /// Returns `false` when it already was the active account.
    async fn activate(&self, address: String) -> bool {
        let mut current = self.current.write().await;
        if current.as_deref() == Some(address.as_str()) {
            return false;
        }
        if let Err(e) = self.store.save(&address) {
            log::warn!("Failed to persist connected address: {}", e);
        }
        *current = Some(address);
        true
    }

    /// Load the persisted address, if any, as the current account
    pub async fn restore_persisted(&self) -> Option<String> {
        match self.store.load() {
            Ok(Some(address)) => {
                log::info!("Restored persisted address {}", address);
                let mut current = self.current.write().await;
                *current = Some(address.clone());
                Some(address)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read persisted address: {}", e);
                None
            }
        }
    }

    /// Best-effort silent resume through the wallet; failures are only logged
    pub async fn reconnect(&self) -> Option<String> {
        match self.pairing.reconnect_session().await {
            Ok(accounts) => {
                if let Some(address) = accounts.into_iter().next() {
                    if self.activate(address.clone()).await {
                        log::info!("Wallet session resumed for {}", address);
                    }
                }
            }
            Err(e) => log::error!("Failed to reconnect wallet session: {}", e),
        }
        self.current().await
    }

    /// Persisted storage first, then the wallet's own reconnection
    pub async fn restore(&self) -> Option<String> {
        self.restore_persisted().await;
        self.reconnect().await
    }

    /// Pair with the wallet; suspends until the user answers
    pub async fn connect(&self) -> Result<String, PairingError> {
        let accounts = self.pairing.connect().await.map_err(|e| {
            log::error!("Failed to connect wallet: {}", e);
            e
        })?;

        let address = accounts.into_iter().next().ok_or_else(|| {
            log::error!("Failed to connect wallet: no accounts found");
            PairingError::NoAccounts
        })?;

        self.activate(address.clone()).await;
        log::info!("Wallet connected: {}", address);
        Ok(address)
    }

    /// End the session and forget the persisted address
    pub async fn disconnect(&self) -> Result<(), DashboardError> {
        if let Err(e) = self.pairing.disconnect().await {
            log::warn!("Wallet reported an error while disconnecting: {}", e);
        }
        if let Some(address) = self.current.write().await.take() {
            log::info!("Disconnected {}", address);
        }
        self.store.clear()
    }
}
