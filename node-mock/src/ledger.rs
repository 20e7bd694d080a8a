/// In-memory ledger behind the mock node
///
/// Holds balances, a pending pool, deployed applications and the indexed
/// history. Submitted transactions are verified like a node would
/// (signature, genesis hash, validity window, fee, balance) and stay
/// pending until `confirm`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use sha2::{Digest, Sha512_256};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::types::*;

pub const MIN_FEE: u64 = 1000;

/// Ids handed to new applications start after this one
const FIRST_APP_ID: u64 = 1000;

/// Global-state key the first NoOp argument is stored under
pub const STORED_VALUE_KEY: &[u8] = b"value";

const MICROALGOS_PER_ALGO: f64 = 1_000_000.0;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("malformed transaction: {0}")]
    Decode(String),

    #[error("unsupported transaction type {0}")]
    UnsupportedType(String),

    #[error("genesis hash mismatch")]
    WrongGenesis,

    #[error("txn dead: round {round} outside {first}-{last}")]
    OutOfWindow { round: u64, first: u64, last: u64 },

    #[error("fee {0} below minimum")]
    FeeTooLow(u64),

    #[error("At least one signature didn't pass verification")]
    BadSignature,

    #[error("overspend (account {address}, balance {balance}, needed {needed})")]
    Overspend {
        address: String,
        balance: u64,
        needed: u64,
    },

    #[error("application creation requires an approval program")]
    MissingProgram,

    #[error("application does not exist: {0}")]
    UnknownApplication(u64),

    #[error("txn does not exist: {0}")]
    UnknownTransaction(String),

    #[error("{0}")]
    Compile(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSchema {
    #[serde(rename = "nbs", default, skip_serializing_if = "is_zero")]
    pub byte_slices: u64,
    #[serde(rename = "nui", default, skip_serializing_if = "is_zero")]
    pub uints: u64,
}

/// Payment or application call in canonical msgpack layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireTxn {
    #[serde(rename = "amt", default, skip_serializing_if = "is_zero")]
    pub amount: u64,
    #[serde(rename = "apaa", default, skip_serializing_if = "Vec::is_empty")]
    pub app_args: Vec<ByteBuf>,
    #[serde(rename = "apan", default, skip_serializing_if = "is_zero")]
    pub on_complete: u64,
    #[serde(
        rename = "apap",
        with = "serde_bytes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub approval_program: Vec<u8>,
    #[serde(rename = "apgs", default, skip_serializing_if = "Option::is_none")]
    pub global_schema: Option<WireSchema>,
    #[serde(rename = "apid", default, skip_serializing_if = "is_zero")]
    pub app_id: u64,
    #[serde(rename = "apls", default, skip_serializing_if = "Option::is_none")]
    pub local_schema: Option<WireSchema>,
    #[serde(
        rename = "apsu",
        with = "serde_bytes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub clear_program: Vec<u8>,
    #[serde(rename = "fee", default, skip_serializing_if = "is_zero")]
    pub fee: u64,
    #[serde(rename = "fv", default, skip_serializing_if = "is_zero")]
    pub first_valid: u64,
    #[serde(rename = "gen", default, skip_serializing_if = "String::is_empty")]
    pub genesis_id: String,
    #[serde(rename = "gh", with = "serde_bytes", default)]
    pub genesis_hash: Vec<u8>,
    #[serde(rename = "lv", default, skip_serializing_if = "is_zero")]
    pub last_valid: u64,
    #[serde(
        rename = "note",
        with = "serde_bytes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub note: Vec<u8>,
    #[serde(
        rename = "rcv",
        with = "serde_bytes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub receiver: Vec<u8>,
    #[serde(rename = "snd", with = "serde_bytes", default)]
    pub sender: Vec<u8>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WireSignedTxn {
    #[serde(rename = "sig", with = "serde_bytes")]
    signature: Vec<u8>,
    #[serde(rename = "txn")]
    transaction: WireTxn,
}

/// Algorand address of a 32-byte public key
pub fn address_of(public_key: &[u8]) -> String {
    let digest = Sha512_256::digest(public_key);
    let mut bytes = public_key.to_vec();
    bytes.extend_from_slice(&digest[digest.len() - 4..]);
    BASE32_NOPAD.encode(&bytes)
}

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS` or a plain date
///
/// A plain date as the upper bound covers the whole day.
fn parse_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, LedgerError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidDate(value.to_string()))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| LedgerError::InvalidDate(value.to_string()))
}

/// Inclusive date window of a history query; open ends are unbounded
struct Window {
    from: Option<DateTime<Utc>>,
    till: Option<DateTime<Utc>>,
}

impl Window {
    fn of(vars: &HistoryVariables) -> Result<Self, LedgerError> {
        Ok(Self {
            from: vars.from.as_deref().map(|v| parse_bound(v, false)).transpose()?,
            till: vars.till.as_deref().map(|v| parse_bound(v, true)).transpose()?,
        })
    }

    fn contains(&self, time: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| time >= from) && self.till.map_or(true, |till| time <= till)
    }
}

#[derive(Debug, Clone)]
struct AccountEntry {
    amount: u64,
    assets: Vec<AssetHoldingResponse>,
}

impl AccountEntry {
    fn empty() -> Self {
        Self {
            amount: 0,
            assets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingTx {
    id: String,
    signature: Vec<u8>,
    sender: String,
    receiver: Option<String>,
    txn: WireTxn,
}

impl PendingTx {
    fn to_entry(&self) -> PendingEntry {
        PendingEntry {
            sig: BASE64.encode(&self.signature),
            txn: PendingTxnJson {
                amt: self.txn.amount,
                apid: (self.txn.app_id != 0).then_some(self.txn.app_id),
                fee: self.txn.fee,
                fv: self.txn.first_valid,
                lv: self.txn.last_valid,
                rcv: self.receiver.clone(),
                snd: self.sender.clone(),
                kind: self.txn.kind.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct ConfirmedTx {
    round: u64,
    application_index: Option<u64>,
    tx: PendingTx,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    id: String,
    sender: String,
    receiver: Option<String>,
    amount: u64,
    fee: u64,
    kind: String,
    height: u64,
    time: DateTime<Utc>,
}

impl HistoryEntry {
    fn to_indexed(&self) -> IndexedTransaction {
        IndexedTransaction {
            block: IndexedBlock {
                timestamp: IndexedTimestamp {
                    time: self.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                },
                height: self.height,
            },
            hash: self.id.clone(),
            kind: self.kind.clone(),
            fee: self.fee as f64 / MICROALGOS_PER_ALGO,
            fee_usd: None,
            currency: algo_currency(),
        }
    }

    /// Transfer row from the point of view of `address`
    fn to_transfer(&self, address: &str) -> IndexedTransfer {
        let amount = self.amount as f64 / MICROALGOS_PER_ALGO;
        let incoming = self.receiver.as_deref() == Some(address);
        let outgoing = self.sender == address;
        IndexedTransfer {
            sum_in: if incoming { amount } else { 0.0 },
            sum_out: if outgoing { amount } else { 0.0 },
            count_in: u64::from(incoming),
            count_out: u64::from(outgoing),
            currency: algo_currency(),
            receiver: IndexedAddress {
                address: self.receiver.clone().unwrap_or_default(),
            },
            sender: IndexedAddress {
                address: self.sender.clone(),
            },
            amount,
            date: IndexedDate {
                date: self.time.format("%Y-%m-%d").to_string(),
            },
        }
    }
}

fn algo_currency() -> IndexedCurrency {
    IndexedCurrency {
        token_id: 0,
        symbol: "ALGO".to_string(),
    }
}

#[derive(Debug, Clone)]
struct AppEntry {
    creator: String,
    approval_program: Vec<u8>,
    clear_program: Vec<u8>,
    global_schema: WireSchema,
    global_state: Vec<(Vec<u8>, Vec<u8>)>,
}

#[derive(Debug)]
struct LedgerState {
    round: u64,
    accounts: HashMap<String, AccountEntry>,
    pending: Vec<PendingTx>,
    confirmed: HashMap<String, ConfirmedTx>,
    applications: HashMap<u64, AppEntry>,
    last_app_id: u64,
    history: Vec<HistoryEntry>,
    last_history_limit: Option<u32>,
}

pub struct Ledger {
    genesis_id: String,
    genesis_hash: Vec<u8>,
    api_key: Option<String>,
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(genesis_id: &str, api_key: Option<String>) -> Self {
        let genesis_hash = Sha512_256::digest(genesis_id.as_bytes()).to_vec();
        Self {
            genesis_id: genesis_id.to_string(),
            genesis_hash,
            api_key,
            state: Mutex::new(LedgerState {
                round: 1,
                accounts: HashMap::new(),
                pending: Vec::new(),
                confirmed: HashMap::new(),
                applications: HashMap::new(),
                last_app_id: FIRST_APP_ID,
                history: Vec::new(),
                last_history_limit: None,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, LedgerError> {
        self.state.lock().map_err(|_| LedgerError::Poisoned)
    }

    pub fn genesis_id(&self) -> &str {
        &self.genesis_id
    }

    /// Indexer credential check; open when no key is configured
    pub fn authorized(&self, bearer: Option<&str>) -> bool {
        match &self.api_key {
            Some(key) => bearer == Some(key.as_str()),
            None => true,
        }
    }

    pub fn round(&self) -> Result<u64, LedgerError> {
        Ok(self.lock()?.round)
    }

    /// Limit of the most recent history query, for test inspection
    pub fn last_history_limit(&self) -> Result<Option<u32>, LedgerError> {
        Ok(self.lock()?.last_history_limit)
    }

    pub fn fund(&self, address: &str, microalgos: u64) -> Result<u64, LedgerError> {
        let mut state = self.lock()?;
        let entry = state
            .accounts
            .entry(address.to_string())
            .or_insert_with(AccountEntry::empty);
        entry.amount = entry.amount.saturating_add(microalgos);
        log::info!("Funded {} with {} microalgos", address, microalgos);
        Ok(entry.amount)
    }

    pub fn add_asset(
        &self,
        address: &str,
        asset_id: u64,
        amount: u64,
        is_frozen: bool,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock()?;
        let entry = state
            .accounts
            .entry(address.to_string())
            .or_insert_with(AccountEntry::empty);
        entry.assets.retain(|a| a.asset_id != asset_id);
        entry.assets.push(AssetHoldingResponse {
            asset_id,
            amount,
            is_frozen,
        });
        Ok(())
    }

    /// Unknown accounts report a zero balance, as algod does
    pub fn account(&self, address: &str) -> Result<AccountResponse, LedgerError> {
        let state = self.lock()?;
        let entry = state
            .accounts
            .get(address)
            .cloned()
            .unwrap_or_else(AccountEntry::empty);
        Ok(AccountResponse {
            address: address.to_string(),
            amount: entry.amount,
            min_balance: 100_000,
            round: state.round,
            assets: entry.assets,
            status: "Offline".to_string(),
        })
    }

    pub fn pending_for(&self, address: &str) -> Result<PendingResponse, LedgerError> {
        let state = self.lock()?;
        let top_transactions: Vec<PendingEntry> = state
            .pending
            .iter()
            .filter(|p| p.sender == address || p.receiver.as_deref() == Some(address))
            .map(PendingTx::to_entry)
            .collect();
        Ok(PendingResponse {
            total_transactions: top_transactions.len() as u64,
            top_transactions,
        })
    }

    /// Pool or confirmation status of one transaction
    pub fn pending_info(&self, tx_id: &str) -> Result<PendingInfoResponse, LedgerError> {
        let state = self.lock()?;
        if let Some(pending) = state.pending.iter().find(|p| p.id == tx_id) {
            return Ok(PendingInfoResponse {
                confirmed_round: 0,
                application_index: None,
                pool_error: String::new(),
                txn: pending.to_entry(),
            });
        }
        let confirmed = state
            .confirmed
            .get(tx_id)
            .ok_or_else(|| LedgerError::UnknownTransaction(tx_id.to_string()))?;
        Ok(PendingInfoResponse {
            confirmed_round: confirmed.round,
            application_index: confirmed.application_index,
            pool_error: String::new(),
            txn: confirmed.tx.to_entry(),
        })
    }

    pub fn params(&self) -> Result<ParamsResponse, LedgerError> {
        Ok(ParamsResponse {
            consensus_version: "mock".to_string(),
            fee: 0,
            genesis_hash: BASE64.encode(&self.genesis_hash),
            genesis_id: self.genesis_id.clone(),
            last_round: self.lock()?.round,
            min_fee: MIN_FEE,
        })
    }

    pub fn genesis(&self) -> Result<serde_json::Value, LedgerError> {
        let state = self.lock()?;
        let alloc: Vec<_> = state
            .accounts
            .iter()
            .map(|(addr, entry)| serde_json::json!({"addr": addr, "state": {"algo": entry.amount}}))
            .collect();
        Ok(serde_json::json!({
            "id": self.genesis_id,
            "network": "mocknet",
            "proto": "mock",
            "alloc": alloc,
        }))
    }

    /// Stand-in for the TEAL assembler
    ///
    /// Accepts any source that opens with a `#pragma version` line. The
    /// program is the version byte followed by the source text; its hash
    /// is the address form of `SHA-512/256("Program" || program)`.
    pub fn compile(&self, source: &str) -> Result<CompileResponse, LedgerError> {
        let first = source.lines().next().unwrap_or_default().trim();
        let version: u8 = first
            .strip_prefix("#pragma version")
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| {
                LedgerError::Compile("1: expected #pragma version as the first line".to_string())
            })?;

        let mut program = vec![version];
        program.extend_from_slice(source.as_bytes());

        let mut hashed = b"Program".to_vec();
        hashed.extend_from_slice(&program);
        Ok(CompileResponse {
            hash: address_of(&Sha512_256::digest(&hashed)),
            result: BASE64.encode(&program),
        })
    }

    pub fn application(&self, app_id: u64) -> Result<ApplicationResponse, LedgerError> {
        let state = self.lock()?;
        let app = state
            .applications
            .get(&app_id)
            .ok_or(LedgerError::UnknownApplication(app_id))?;
        Ok(ApplicationResponse {
            id: app_id,
            params: ApplicationParamsResponse {
                creator: app.creator.clone(),
                approval_program: BASE64.encode(&app.approval_program),
                clear_state_program: BASE64.encode(&app.clear_program),
                global_state: app
                    .global_state
                    .iter()
                    .map(|(key, value)| TealKeyValueJson {
                        key: BASE64.encode(key),
                        value: TealValueJson {
                            kind: 1,
                            bytes: BASE64.encode(value),
                            uint: 0,
                        },
                    })
                    .collect(),
                global_state_schema: StateSchemaJson {
                    num_byte_slice: app.global_schema.byte_slices,
                    num_uint: app.global_schema.uints,
                },
            },
        })
    }

    /// Verify a signed transaction and place it in the pending pool
    pub fn submit(&self, raw: &[u8]) -> Result<String, LedgerError> {
        let signed: WireSignedTxn =
            rmp_serde::from_slice(raw).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let txn = signed.transaction;

        match txn.kind.as_str() {
            "pay" => {}
            "appl" if txn.app_id == 0 && txn.approval_program.is_empty() => {
                return Err(LedgerError::MissingProgram)
            }
            "appl" => {}
            other => return Err(LedgerError::UnsupportedType(other.to_string())),
        }
        if txn.genesis_hash != self.genesis_hash {
            return Err(LedgerError::WrongGenesis);
        }
        if txn.fee < MIN_FEE {
            return Err(LedgerError::FeeTooLow(txn.fee));
        }

        let sender_key: [u8; 32] = txn
            .sender
            .as_slice()
            .try_into()
            .map_err(|_| LedgerError::Decode("sender must be 32 bytes".to_string()))?;
        let encoded =
            rmp_serde::to_vec_named(&txn).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let mut message = b"TX".to_vec();
        message.extend_from_slice(&encoded);

        let key = VerifyingKey::from_bytes(&sender_key).map_err(|_| LedgerError::BadSignature)?;
        let signature =
            Signature::from_slice(&signed.signature).map_err(|_| LedgerError::BadSignature)?;
        key.verify(&message, &signature)
            .map_err(|_| LedgerError::BadSignature)?;

        let id = BASE32_NOPAD.encode(&Sha512_256::digest(&message));
        let sender = address_of(&txn.sender);
        let receiver = (txn.receiver.len() == 32).then(|| address_of(&txn.receiver));

        let mut state = self.lock()?;
        if state.round < txn.first_valid || state.round > txn.last_valid {
            return Err(LedgerError::OutOfWindow {
                round: state.round,
                first: txn.first_valid,
                last: txn.last_valid,
            });
        }
        if txn.app_id != 0 && !state.applications.contains_key(&txn.app_id) {
            return Err(LedgerError::UnknownApplication(txn.app_id));
        }

        let committed = state
            .pending
            .iter()
            .filter(|p| p.sender == sender)
            .fold(0u64, |sum, p| {
                sum.saturating_add(p.txn.amount).saturating_add(p.txn.fee)
            });
        let balance = state.accounts.get(&sender).map(|a| a.amount).unwrap_or(0);
        let needed = committed
            .saturating_add(txn.amount)
            .saturating_add(txn.fee);
        if balance < needed {
            return Err(LedgerError::Overspend {
                address: sender,
                balance,
                needed,
            });
        }

        log::info!(
            "Accepted {} {} from {} ({} microalgos)",
            txn.kind,
            id,
            sender,
            txn.amount
        );
        state.pending.push(PendingTx {
            id: id.clone(),
            signature: signed.signature,
            sender,
            receiver,
            txn,
        });
        Ok(id)
    }

    /// Apply every pending transaction in a new round stamped now
    pub fn confirm(&self) -> Result<usize, LedgerError> {
        self.confirm_at(Utc::now())
    }

    /// Apply every pending transaction in a new round stamped `time`;
    /// returns how many
    pub fn confirm_at(&self, time: DateTime<Utc>) -> Result<usize, LedgerError> {
        let mut state = self.lock()?;
        let pending = std::mem::take(&mut state.pending);
        let height = state.round;

        for p in &pending {
            if let Some(sender) = state.accounts.get_mut(&p.sender) {
                sender.amount = sender
                    .amount
                    .saturating_sub(p.txn.amount.saturating_add(p.txn.fee));
            }
            if let Some(receiver) = &p.receiver {
                let entry = state
                    .accounts
                    .entry(receiver.clone())
                    .or_insert_with(AccountEntry::empty);
                entry.amount = entry.amount.saturating_add(p.txn.amount);
            }

            let application_index = if p.txn.kind == "appl" {
                apply_application_call(&mut state, p)
            } else {
                None
            };

            state.confirmed.insert(
                p.id.clone(),
                ConfirmedTx {
                    round: height,
                    application_index,
                    tx: p.clone(),
                },
            );
            state.history.push(HistoryEntry {
                id: p.id.clone(),
                sender: p.sender.clone(),
                receiver: p.receiver.clone(),
                amount: p.txn.amount,
                fee: p.txn.fee,
                kind: p.txn.kind.clone(),
                height,
                time,
            });
        }

        state.round += 1;
        log::info!("Round {} confirmed {} transactions", height, pending.len());
        Ok(pending.len())
    }

    /// Transactions sent by the queried address inside its window, newest first
    pub fn history(&self, vars: &HistoryVariables) -> Result<Vec<IndexedTransaction>, LedgerError> {
        let window = Window::of(vars)?;
        let mut state = self.lock()?;
        state.last_history_limit = Some(vars.limit);
        Ok(state
            .history
            .iter()
            .rev()
            .filter(|h| h.sender == vars.address && window.contains(h.time))
            .skip(vars.offset as usize)
            .take(vars.limit as usize)
            .map(HistoryEntry::to_indexed)
            .collect())
    }

    /// Non-zero transfers in or out of the queried address inside its
    /// window, newest first
    pub fn transfers(&self, vars: &HistoryVariables) -> Result<Vec<IndexedTransfer>, LedgerError> {
        let window = Window::of(vars)?;
        let mut state = self.lock()?;
        state.last_history_limit = Some(vars.limit);
        Ok(state
            .history
            .iter()
            .rev()
            .filter(|h| h.amount > 0 && window.contains(h.time))
            .filter(|h| h.sender == vars.address || h.receiver.as_deref() == Some(vars.address.as_str()))
            .skip(vars.offset as usize)
            .take(vars.limit as usize)
            .map(|h| h.to_transfer(&vars.address))
            .collect())
    }
}

/// Create the application or store the first NoOp argument; returns the
/// id of a newly created application
fn apply_application_call(state: &mut LedgerState, p: &PendingTx) -> Option<u64> {
    if p.txn.app_id == 0 {
        state.last_app_id += 1;
        let app_id = state.last_app_id;
        state.applications.insert(
            app_id,
            AppEntry {
                creator: p.sender.clone(),
                approval_program: p.txn.approval_program.clone(),
                clear_program: p.txn.clear_program.clone(),
                global_schema: p.txn.global_schema.clone().unwrap_or_default(),
                global_state: Vec::new(),
            },
        );
        log::info!("Created application {} for {}", app_id, p.sender);
        return Some(app_id);
    }

    let value = p.txn.app_args.first()?;
    if let Some(app) = state.applications.get_mut(&p.txn.app_id) {
        app.global_state.retain(|(key, _)| key != STORED_VALUE_KEY);
        app.global_state
            .push((STORED_VALUE_KEY.to_vec(), value.to_vec()));
        log::info!("Application {} stored {} bytes", p.txn.app_id, value.len());
    }
    None
}
