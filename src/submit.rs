//! Transaction Submitter
//!
//! validate -> params -> build -> sign (suspends for the user) -> submit.
//! The sign-and-send tail is shared with application calls.
//! Nothing is retried; each failure ends the attempt with a tagged
//! [`SubmitError`].

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::address::decode_address;
use crate::algod::{NodeApi, SuggestedParams};
use crate::error::{DraftError, SubmitError};
use crate::pairing::WalletPairing;
use crate::transaction::{build_payment, Transaction};
use crate::units::algos_to_microalgos;

/// Payment as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPayment {
    pub recipient: String,
    /// ALGO, as typed
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// A draft that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub recipient: String,
    pub microalgos: u64,
}

impl DraftPayment {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedPayment, DraftError> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(DraftError::EmptyRecipient);
        }
        decode_address(recipient)?;
        let microalgos = algos_to_microalgos(&self.amount)?;
        Ok(ValidatedPayment {
            recipient: recipient.to_string(),
            microalgos,
        })
    }
}

pub fn success_notice(tx_id: &str) -> String {
    format!("Transaction successful with ID: {}", tx_id)
}

pub struct TransactionSubmitter {
    node: Arc<dyn NodeApi>,
    pairing: Arc<dyn WalletPairing>,
}

impl TransactionSubmitter {
    pub fn new(node: Arc<dyn NodeApi>, pairing: Arc<dyn WalletPairing>) -> Self {
        Self { node, pairing }
    }

    /// Send `draft` from `sender`, returning the node's transaction id
    pub async fn submit(
        &self,
        sender: Option<&str>,
        draft: &DraftPayment,
    ) -> Result<String, SubmitError> {
        let result = self.try_submit(sender, draft).await;
        match &result {
            Ok(tx_id) => log::info!("Transaction submitted: {}", tx_id),
            Err(SubmitError::Cancelled) => log::info!("Transaction cancelled by user"),
            Err(e) => log::error!("Failed to send transaction: {}", e),
        }
        result
    }

    async fn try_submit(
        &self,
        sender: Option<&str>,
        draft: &DraftPayment,
    ) -> Result<String, SubmitError> {
        let sender = sender.ok_or(SubmitError::NotConnected)?;
        let payment = draft.validate()?;

        let params = self.suggested_params().await?;

        let txn = build_payment(sender, &payment.recipient, payment.microalgos, &params)
            .map_err(SubmitError::Build)?;

        self.sign_and_send(&txn).await
    }

    pub async fn suggested_params(&self) -> Result<SuggestedParams, SubmitError> {
        self.node
            .transaction_params()
            .await
            .map_err(SubmitError::Params)
    }

    /// Have the paired wallet sign `txn`, then hand it to the node
    pub async fn sign_and_send(&self, txn: &Transaction) -> Result<String, SubmitError> {
        let signed = self.pairing.sign_transaction(txn).await?;
        let bytes = signed.to_bytes().map_err(SubmitError::Build)?;

        self.node
            .send_raw_transaction(bytes)
            .await
            .map_err(SubmitError::Submission)
    }
}
