//! Error types for dashboard operations
//!
//! Node and indexer failures, wallet pairing outcomes, draft validation
//! and the tagged outcome of a payment submission.

use std::error::Error as StdError;
use std::fmt;

/// Core error type for node, indexer and storage operations
#[derive(Clone, Debug)]
pub enum DashboardError {
    /// Transport-level failure reaching a remote service
    ConnectionFailed(String),

    /// The node answered with a non-success status
    NodeRejected { status: u16, message: String },

    /// Response body could not be interpreted
    InvalidResponse(String),

    /// GraphQL query returned errors or no data
    QueryFailed(String),

    /// Persisted storage could not be read or written
    Storage(String),

    /// Transaction could not be encoded
    SerializationError(String),

    /// Wallet pairing failed
    Pairing(PairingError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            Self::NodeRejected { status, message } => {
                write!(f, "Node rejected request ({}): {}", status, message)
            }
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::Pairing(err) => write!(f, "Wallet pairing failed: {}", err),
        }
    }
}

impl StdError for DashboardError {}

impl From<PairingError> for DashboardError {
    fn from(err: PairingError) -> Self {
        Self::Pairing(err)
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}

impl DashboardError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Outcome of a wallet pairing or signing request that did not succeed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairingError {
    /// The user declined the pairing request
    Rejected,

    /// The user cancelled a signature request
    Cancelled,

    /// Pairing succeeded but the wallet shared no accounts
    NoAccounts,

    /// No active session with the wallet
    NotConnected,

    /// The wallet cannot sign for the transaction's sender
    UnknownSigner(String),

    /// Anything else reported by the wallet transport
    Transport(String),
}

impl fmt::Display for PairingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "pairing request rejected"),
            Self::Cancelled => write!(f, "signature request cancelled"),
            Self::NoAccounts => write!(f, "no accounts found"),
            Self::NotConnected => write!(f, "wallet is not connected"),
            Self::UnknownSigner(address) => write!(f, "wallet cannot sign for {}", address),
            Self::Transport(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for PairingError {}

/// Reasons a draft payment is refused before anything is built
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftError {
    EmptyRecipient,
    InvalidAddress(String),
    InvalidAmount(String),
    NonPositiveAmount,
    TooManyDecimals,
    AmountOverflow,
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRecipient => write!(f, "recipient address is required"),
            Self::InvalidAddress(reason) => write!(f, "invalid address: {}", reason),
            Self::InvalidAmount(raw) => write!(f, "amount '{}' is not a number", raw),
            Self::NonPositiveAmount => write!(f, "amount must be greater than zero"),
            Self::TooManyDecimals => write!(f, "amount has more than 6 decimal places"),
            Self::AmountOverflow => write!(f, "amount is too large"),
        }
    }
}

impl StdError for DraftError {}

/// Terminal outcome of a failed payment submission
///
/// Every variant except [`SubmitError::Cancelled`] maps to the same generic
/// notice; the cancelled case is distinguished by variant, not by text.
#[derive(Clone, Debug)]
pub enum SubmitError {
    /// No wallet address is connected
    NotConnected,

    /// Draft failed validation, nothing was sent anywhere
    InvalidDraft(DraftError),

    /// Fetching suggested parameters failed
    Params(DashboardError),

    /// Building the payment failed
    Build(DashboardError),

    /// The user cancelled the signature request
    Cancelled,

    /// The wallet failed to sign
    Signing(PairingError),

    /// The node refused or never received the signed payload
    Submission(DashboardError),
}

pub const CANCELLED_NOTICE: &str = "Transaction was canceled.";
pub const FAILED_NOTICE: &str = "Failed to send transaction. Check the console for more details.";
pub const CONNECT_FAILED_NOTICE: &str = "Failed to connect wallet";

impl SubmitError {
    /// User-facing message for this failure
    pub fn notice(&self) -> String {
        match self {
            Self::Cancelled => CANCELLED_NOTICE.to_string(),
            Self::NotConnected => "Connect a wallet before sending a transaction.".to_string(),
            Self::InvalidDraft(err) => format!("Invalid payment: {}.", err),
            _ => FAILED_NOTICE.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no connected wallet address"),
            Self::InvalidDraft(err) => write!(f, "invalid draft: {}", err),
            Self::Params(err) => write!(f, "failed to fetch transaction params: {}", err),
            Self::Build(err) => write!(f, "failed to build transaction: {}", err),
            Self::Cancelled => write!(f, "signature request cancelled by user"),
            Self::Signing(err) => write!(f, "signing failed: {}", err),
            Self::Submission(err) => write!(f, "submission failed: {}", err),
        }
    }
}

impl StdError for SubmitError {}

impl From<DraftError> for SubmitError {
    fn from(err: DraftError) -> Self {
        Self::InvalidDraft(err)
    }
}

impl From<PairingError> for SubmitError {
    fn from(err: PairingError) -> Self {
        match err {
            PairingError::Cancelled => Self::Cancelled,
            other => Self::Signing(other),
        }
    }
}

/// Failure of a smart-contract deploy or interaction
#[derive(Clone, Debug)]
pub enum ContractError {
    /// Request was malformed, nothing was sent anywhere
    InvalidRequest(String),

    /// The node refused to compile the program
    Compile(DashboardError),

    /// Building, signing or submitting the application call failed
    Submit(SubmitError),

    /// The transaction was dropped or not confirmed in time
    Confirmation(String),

    /// Reading application state failed
    Query(DashboardError),

    /// The application holds no byte value in global state
    NoStoredValue(u64),
}

impl ContractError {
    pub fn notice(&self) -> String {
        match self {
            Self::InvalidRequest(reason) => format!("Invalid request: {}.", reason),
            Self::Submit(err) => err.notice(),
            Self::NoStoredValue(app_id) => format!("Application {} has no stored value.", app_id),
            _ => FAILED_NOTICE.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Submit(SubmitError::Cancelled))
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
            Self::Compile(err) => write!(f, "compilation failed: {}", err),
            Self::Submit(err) => write!(f, "{}", err),
            Self::Confirmation(msg) => write!(f, "confirmation failed: {}", msg),
            Self::Query(err) => write!(f, "failed to read application: {}", err),
            Self::NoStoredValue(app_id) => write!(f, "application {} has no stored value", app_id),
        }
    }
}

impl StdError for ContractError {}

impl From<SubmitError> for ContractError {
    fn from(err: SubmitError) -> Self {
        Self::Submit(err)
    }
}
