//! Dashboard Manager - Orchestration Layer
//!
//! Resolves the session, fans out account and history fetches, and runs
//! payment submissions and contract calls. Collaborators are injected once
//! per instance.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::account::AccountFetcher;
use crate::algod::NodeApi;
use crate::contract::{
    ConfirmationPolicy, ContractClient, Deployment, InteractOutcome, InteractRequest,
};
use crate::error::{ContractError, DashboardError, PairingError, SubmitError};
use crate::history::HistoryFetcher;
use crate::indexer::{HistoryApi, HistoryWindow};
use crate::pairing::WalletPairing;
use crate::session::SessionManager;
use crate::state::{DashboardState, SharedState};
use crate::store::AddressStore;
use crate::submit::{DraftPayment, TransactionSubmitter};

/// External capabilities the dashboard is built from
#[derive(Clone)]
pub struct Collaborators {
    pub node: Arc<dyn NodeApi>,
    pub indexer: Arc<dyn HistoryApi>,
    pub pairing: Arc<dyn WalletPairing>,
    pub store: Arc<dyn AddressStore>,
}

pub struct Dashboard {
    session: SessionManager,
    account: AccountFetcher,
    history: HistoryFetcher,
    submitter: TransactionSubmitter,
    contracts: ContractClient,
    state: SharedState,
}

impl Dashboard {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new(
        collaborators: Collaborators,
        network: impl Into<String>,
        window: HistoryWindow,
    ) -> Self {
        let Collaborators {
            node,
            indexer,
            pairing,
            store,
        } = collaborators;

        Self {
            session: SessionManager::new(pairing.clone(), store),
            account: AccountFetcher::new(node.clone()),
            history: HistoryFetcher::new(indexer, network, window),
            submitter: TransactionSubmitter::new(node.clone(), pairing.clone()),
            contracts: ContractClient::new(node, pairing),
            state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    /// Override how long contract calls wait for confirmation
    pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.contracts = self.contracts.with_policy(policy);
        self
    }

    // ============================================================================
    // State
    // ============================================================================

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub fn shared_state(&self) -> SharedState {
        self.state.clone()
    }

    pub async fn address(&self) -> Option<String> {
        self.session.current().await
    }

    /// Point the view at `address`, dropping data of any other account
    async fn show(&self, address: Option<String>) {
        let mut state = self.state.write().await;
        if state.address != address {
            state.reset_for(address);
        }
    }

    // ============================================================================
    // Session
    // ============================================================================

    /// Restore the session and load data for it
    ///
    /// The persisted address is shown and refreshed right away while the
    /// wallet's own reconnection runs alongside; if the wallet resumes a
    /// different account that one wins.
    pub async fn start(&self) -> Option<String> {
        let persisted = self.session.restore_persisted().await;
        self.show(persisted.clone()).await;

        let first_paint = async {
            if let Some(address) = &persisted {
                self.refresh_address(address).await;
            }
        };

        let resume = async {
            let resumed = self.session.reconnect().await;
            if resumed != persisted {
                self.show(resumed.clone()).await;
                if let Some(address) = &resumed {
                    self.refresh_address(address).await;
                }
            }
        };

        tokio::join!(first_paint, resume);
        self.address().await
    }

    /// Pair a wallet; on success its first account becomes active
    pub async fn connect(&self) -> Result<String, PairingError> {
        let address = self.session.connect().await?;
        self.show(Some(address.clone())).await;
        self.refresh_address(&address).await;
        Ok(address)
    }

    pub async fn disconnect(&self) -> Result<(), DashboardError> {
        self.session.disconnect().await?;
        self.show(None).await;
        Ok(())
    }

    // ============================================================================
    // Data
    // ============================================================================

    /// Re-fetch everything for the connected account; no-op when absent
    pub async fn refresh(&self) {
        match self.address().await {
            Some(address) => self.refresh_address(&address).await,
            None => log::debug!("Refresh skipped, no wallet connected"),
        }
    }

    async fn refresh_address(&self, address: &str) {
        log::info!("Refreshing dashboard for {}", address);
        tokio::join!(
            self.account.refresh(address, &self.state),
            self.history.refresh(address, &self.state),
        );
    }

    // ============================================================================
    // Payments
    // ============================================================================

    pub async fn send(&self, draft: &DraftPayment) -> Result<String, SubmitError> {
        let sender = self.address().await;
        self.submitter.submit(sender.as_deref(), draft).await
    }

    // ============================================================================
    // Smart contracts
    // ============================================================================

    /// Compile and deploy `code` from the connected account
    pub async fn deploy_contract(&self, code: &str) -> Result<Deployment, ContractError> {
        let sender = self.address().await;
        let result = self.contracts.deploy(sender.as_deref(), code).await;
        match &result {
            Ok(deployment) => {
                log::info!("Application {} deployed", deployment.app_id);
                self.refresh().await;
            }
            Err(e) => log::error!("Failed to deploy contract: {}", e),
        }
        result
    }

    pub async fn interact_contract(
        &self,
        request: &InteractRequest,
    ) -> Result<InteractOutcome, ContractError> {
        let sender = self.address().await;
        let outcome = self.contracts.interact(sender.as_deref(), request).await?;
        if matches!(outcome, InteractOutcome::Store { .. }) {
            self.refresh().await;
        }
        Ok(outcome)
    }
}
