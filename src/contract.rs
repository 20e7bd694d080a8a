//! Smart-contract deployment and interaction
//!
//! A contract is TEAL source compiled on the node, deployed by an
//! application-create transaction signed through the paired wallet. Once
//! deployed it stores a value passed as the first argument of a NoOp call
//! and exposes it in global state.
//!
//! Both writes wait for the node to confirm the transaction before
//! returning.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::algod::{NodeApi, PendingTransactionInfo};
use crate::error::{ContractError, SubmitError};
use crate::pairing::WalletPairing;
use crate::submit::TransactionSubmitter;
use crate::transaction::{build_app_call, build_app_create, StateSchema};

/// Global storage a deployed contract reserves: one uint, one byte slice
pub const GLOBAL_SCHEMA: StateSchema = StateSchema {
    byte_slices: 1,
    uints: 1,
};

/// How long to wait for a submitted transaction to be confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_attempts: 20,
        }
    }
}

/// Body of a deploy request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployRequest {
    /// TEAL approval program source
    #[serde(default)]
    pub code: String,
}

/// Body of an interact request, as sent by the view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractRequest {
    #[serde(default)]
    pub app_id: u64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// An interact request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Store { app_id: u64, value: String },
    Read { app_id: u64 },
}

impl InteractRequest {
    pub fn validate(&self) -> Result<ContractCall, ContractError> {
        if self.app_id == 0 || self.action.trim().is_empty() {
            return Err(ContractError::InvalidRequest(
                "app ID or action missing".to_string(),
            ));
        }
        match self.action.trim() {
            "store" => match self.value.as_deref().filter(|v| !v.is_empty()) {
                Some(value) => Ok(ContractCall::Store {
                    app_id: self.app_id,
                    value: value.to_string(),
                }),
                None => Err(ContractError::InvalidRequest(
                    "value to store is missing".to_string(),
                )),
            },
            "read" => Ok(ContractCall::Read {
                app_id: self.app_id,
            }),
            other => Err(ContractError::InvalidRequest(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub app_id: u64,
    pub tx_id: String,
}

/// Value held in an application's global state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredValue {
    /// Base64 as reported by the node
    pub stored_value: String,
    /// The same bytes as UTF-8, when they are
    pub text: Option<String>,
}

impl StoredValue {
    fn from_base64(encoded: &str) -> Self {
        let text = BASE64
            .decode(encoded.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        Self {
            stored_value: encoded.to_string(),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InteractOutcome {
    Store { tx_id: String },
    Read(StoredValue),
}

pub struct ContractClient {
    node: Arc<dyn NodeApi>,
    submitter: TransactionSubmitter,
    policy: ConfirmationPolicy,
}

impl ContractClient {
    pub fn new(node: Arc<dyn NodeApi>, pairing: Arc<dyn WalletPairing>) -> Self {
        Self {
            submitter: TransactionSubmitter::new(node.clone(), pairing),
            node,
            policy: ConfirmationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compile `code` and create an application from it
    ///
    /// The same program serves as approval and clear-state program.
    pub async fn deploy(
        &self,
        sender: Option<&str>,
        code: &str,
    ) -> Result<Deployment, ContractError> {
        let sender = sender.ok_or(SubmitError::NotConnected)?;
        if code.trim().is_empty() {
            return Err(ContractError::InvalidRequest("no code provided".to_string()));
        }

        let program = self
            .node
            .compile_teal(code)
            .await
            .map_err(ContractError::Compile)?;
        log::info!(
            "Compiled program {} ({} bytes)",
            program.hash,
            program.bytes.len()
        );

        let params = self.submitter.suggested_params().await?;
        let txn = build_app_create(
            sender,
            program.bytes.clone(),
            program.bytes,
            GLOBAL_SCHEMA,
            StateSchema::default(),
            &params,
        )
        .map_err(SubmitError::Build)?;

        let tx_id = self.submitter.sign_and_send(&txn).await?;
        let confirmed = self.wait_for_confirmation(&tx_id).await?;
        let app_id = confirmed.application_index.ok_or_else(|| {
            ContractError::Confirmation(format!("{} created no application", tx_id))
        })?;

        log::info!("Deployed application {} in {}", app_id, tx_id);
        Ok(Deployment { app_id, tx_id })
    }

    /// Store `value` through a NoOp call, returning the confirmed tx id
    pub async fn store(
        &self,
        sender: Option<&str>,
        app_id: u64,
        value: &str,
    ) -> Result<String, ContractError> {
        let sender = sender.ok_or(SubmitError::NotConnected)?;
        let params = self.submitter.suggested_params().await?;
        let txn = build_app_call(sender, app_id, vec![value.as_bytes().to_vec()], &params)
            .map_err(SubmitError::Build)?;

        let tx_id = self.submitter.sign_and_send(&txn).await?;
        self.wait_for_confirmation(&tx_id).await?;
        log::info!("Stored value in application {} ({})", app_id, tx_id);
        Ok(tx_id)
    }

    /// First byte value in the application's global state
    pub async fn read(&self, app_id: u64) -> Result<StoredValue, ContractError> {
        let app = self
            .node
            .application_information(app_id)
            .await
            .map_err(ContractError::Query)?;
        app.first_stored_bytes()
            .map(StoredValue::from_base64)
            .ok_or(ContractError::NoStoredValue(app_id))
    }

    pub async fn interact(
        &self,
        sender: Option<&str>,
        request: &InteractRequest,
    ) -> Result<InteractOutcome, ContractError> {
        let result = match request.validate()? {
            ContractCall::Store { app_id, value } => self
                .store(sender, app_id, &value)
                .await
                .map(|tx_id| InteractOutcome::Store { tx_id }),
            ContractCall::Read { app_id } => self.read(app_id).await.map(InteractOutcome::Read),
        };
        if let Err(e) = &result {
            log::error!("Contract interaction failed: {}", e);
        }
        result
    }

    /// Poll the node until `tx_id` is confirmed or dropped from the pool
    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, ContractError> {
        for attempt in 1..=self.policy.max_attempts {
            let info = self
                .node
                .pending_transaction_information(tx_id)
                .await
                .map_err(|e| ContractError::Confirmation(e.to_string()))?;

            if info.is_confirmed() {
                log::debug!("{} confirmed after {} attempts", tx_id, attempt);
                return Ok(info);
            }
            if !info.pool_error.is_empty() {
                return Err(ContractError::Confirmation(info.pool_error));
            }
            tokio::time::sleep(self.policy.poll_interval).await;
        }

        Err(ContractError::Confirmation(format!(
            "{} not confirmed after {} attempts",
            tx_id, self.policy.max_attempts
        )))
    }
}
