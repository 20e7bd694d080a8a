//! Transaction construction and canonical encoding
//!
//! Algorand nodes accept transactions as canonical MessagePack: map keys in
//! lexicographic order, zero values omitted and byte strings as `bin`.
//! Field declaration order below is the key order on the wire.
//!
//! Two transaction types are built here: payments (`pay`) and application
//! calls (`appl`), the latter both for creating a contract and for calling
//! an existing one.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use sha2::{Digest, Sha512_256};

use crate::address::decode_address;
use crate::algod::SuggestedParams;
use crate::error::DashboardError;

/// Rounds a transaction stays valid after the node's last round
pub const VALIDITY_WINDOW: u64 = 1000;

/// Bytes a detached Ed25519 signature adds to the encoded transaction
const SIGNATURE_OVERHEAD: u64 = 75;

/// Domain separator prepended before hashing or signing
const TX_PREFIX: &[u8] = b"TX";

pub const PAYMENT_TYPE: &str = "pay";
pub const APPLICATION_TYPE: &str = "appl";

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Storage an application reserves, in byte-slice and integer slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSchema {
    #[serde(rename = "nbs", default, skip_serializing_if = "is_zero")]
    pub byte_slices: u64,
    #[serde(rename = "nui", default, skip_serializing_if = "is_zero")]
    pub uints: u64,
}

impl StateSchema {
    pub fn new(uints: u64, byte_slices: u64) -> Self {
        Self { byte_slices, uints }
    }

    pub fn is_empty(&self) -> bool {
        self.byte_slices == 0 && self.uints == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "amt", default, skip_serializing_if = "is_zero")]
    pub amount: u64,
    /// Application arguments
    #[serde(rename = "apaa", default, skip_serializing_if = "Vec::is_empty")]
    pub app_args: Vec<ByteBuf>,
    /// On-completion action; 0 is NoOp
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
    pub global_schema: Option<StateSchema>,
    /// Application id; 0 creates a new application
    #[serde(rename = "apid", default, skip_serializing_if = "is_zero")]
    pub app_id: u64,
    #[serde(rename = "apls", default, skip_serializing_if = "Option::is_none")]
    pub local_schema: Option<StateSchema>,
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

impl Transaction {
    /// Canonical MessagePack encoding of the transaction body
    pub fn encode(&self) -> Result<Vec<u8>, DashboardError> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| DashboardError::SerializationError(e.to_string()))
    }

    /// The exact bytes a wallet signs: `"TX" || encode()`
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>, DashboardError> {
        let encoded = self.encode()?;
        let mut bytes = Vec::with_capacity(TX_PREFIX.len() + encoded.len());
        bytes.extend_from_slice(TX_PREFIX);
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    /// Transaction id as reported by the node after submission
    pub fn id(&self) -> Result<String, DashboardError> {
        let digest = Sha512_256::digest(self.bytes_to_sign()?);
        Ok(BASE32_NOPAD.encode(&digest))
    }

    pub fn sender_address(&self) -> Result<String, DashboardError> {
        let key: [u8; 32] = self.sender.as_slice().try_into().map_err(|_| {
            DashboardError::SerializationError("sender is not a 32-byte key".to_string())
        })?;
        Ok(crate::address::encode_address(&key))
    }

    /// Receiver address for payments, `None` for other types
    pub fn receiver_address(&self) -> Option<String> {
        let key: [u8; 32] = self.receiver.as_slice().try_into().ok()?;
        Some(crate::address::encode_address(&key))
    }

    pub fn is_application_call(&self) -> bool {
        self.kind == APPLICATION_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(rename = "sig", with = "serde_bytes")]
    pub signature: Vec<u8>,
    #[serde(rename = "txn")]
    pub transaction: Transaction,
}

impl SignedTransaction {
    /// Raw bytes accepted by the node's submission endpoint
    pub fn to_bytes(&self) -> Result<Vec<u8>, DashboardError> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| DashboardError::SerializationError(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DashboardError> {
        rmp_serde::from_slice(bytes).map_err(|e| DashboardError::SerializationError(e.to_string()))
    }
}

/// Fields every transaction takes from the node's suggested params
fn with_params(
    sender: &str,
    kind: &str,
    params: &SuggestedParams,
) -> Result<Transaction, DashboardError> {
    let sender_key = decode_address(sender)
        .map_err(|e| DashboardError::SerializationError(format!("sender: {}", e)))?;
    let last_valid = params.last_round.checked_add(VALIDITY_WINDOW).ok_or_else(|| {
        DashboardError::SerializationError(format!(
            "last valid round overflows after round {}",
            params.last_round
        ))
    })?;

    Ok(Transaction {
        fee: params.min_fee,
        first_valid: params.last_round,
        genesis_id: params.genesis_id.clone(),
        genesis_hash: params.genesis_hash.clone(),
        last_valid,
        sender: sender_key.to_vec(),
        kind: kind.to_string(),
        ..Transaction::default()
    })
}

/// Per-byte fee over the signed size, never below the minimum
fn apply_fee(txn: &mut Transaction, params: &SuggestedParams) -> Result<(), DashboardError> {
    let estimated_size = (txn.encode()?.len() as u64).saturating_add(SIGNATURE_OVERHEAD);
    let fee = params.fee.checked_mul(estimated_size).ok_or_else(|| {
        DashboardError::SerializationError(format!(
            "fee of {} per byte overflows for {} bytes",
            params.fee, estimated_size
        ))
    })?;
    txn.fee = fee.max(params.min_fee);
    Ok(())
}

/// Build a payment from `sender` to `receiver` using node-suggested params
///
/// Both addresses must already be validated; a malformed one here is
/// reported as a build failure.
pub fn build_payment(
    sender: &str,
    receiver: &str,
    microalgos: u64,
    params: &SuggestedParams,
) -> Result<Transaction, DashboardError> {
    let receiver_key = decode_address(receiver)
        .map_err(|e| DashboardError::SerializationError(format!("receiver: {}", e)))?;

    let mut txn = with_params(sender, PAYMENT_TYPE, params)?;
    txn.amount = microalgos;
    txn.receiver = receiver_key.to_vec();
    apply_fee(&mut txn, params)?;

    log::debug!(
        "Built payment {} -> {} for {} microalgos (fee {}, rounds {}..{})",
        sender,
        receiver,
        microalgos,
        txn.fee,
        txn.first_valid,
        txn.last_valid
    );

    Ok(txn)
}

/// Build an application-create call with NoOp completion
///
/// Empty schemas are left off the wire entirely.
pub fn build_app_create(
    sender: &str,
    approval_program: Vec<u8>,
    clear_program: Vec<u8>,
    global_schema: StateSchema,
    local_schema: StateSchema,
    params: &SuggestedParams,
) -> Result<Transaction, DashboardError> {
    let mut txn = with_params(sender, APPLICATION_TYPE, params)?;
    txn.approval_program = approval_program;
    txn.clear_program = clear_program;
    txn.global_schema = Some(global_schema).filter(|s| !s.is_empty());
    txn.local_schema = Some(local_schema).filter(|s| !s.is_empty());
    apply_fee(&mut txn, params)?;

    log::debug!(
        "Built application create from {} ({} byte program, fee {})",
        sender,
        txn.approval_program.len(),
        txn.fee
    );

    Ok(txn)
}

/// Build a NoOp call of application `app_id` carrying `args`
pub fn build_app_call(
    sender: &str,
    app_id: u64,
    args: Vec<Vec<u8>>,
    params: &SuggestedParams,
) -> Result<Transaction, DashboardError> {
    if app_id == 0 {
        return Err(DashboardError::SerializationError(
            "application id must be non-zero".to_string(),
        ));
    }

    let mut txn = with_params(sender, APPLICATION_TYPE, params)?;
    txn.app_id = app_id;
    txn.app_args = args.into_iter().map(ByteBuf::from).collect();
    apply_fee(&mut txn, params)?;

    log::debug!(
        "Built call of application {} from {} with {} args",
        app_id,
        sender,
        txn.app_args.len()
    );

    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::encode_address;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 0,
            min_fee: 1000,
            last_round: 5000,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: vec![9u8; 32],
        }
    }

    #[test]
    fn test_build_payment_uses_params() {
        let sender = encode_address(&[1u8; 32]);
        let receiver = encode_address(&[2u8; 32]);
        let txn = build_payment(&sender, &receiver, 2_500_000, &params()).unwrap();

        assert_eq!(txn.amount, 2_500_000);
        assert_eq!(txn.fee, 1000);
        assert_eq!(txn.first_valid, 5000);
        assert_eq!(txn.last_valid, 6000);
        assert_eq!(txn.kind, "pay");
        assert_eq!(txn.sender_address().unwrap(), sender);
    }

    #[test]
    fn test_fee_per_byte_above_minimum() {
        let mut p = params();
        p.fee = 100;
        let txn = build_payment(
            &encode_address(&[1u8; 32]),
            &encode_address(&[2u8; 32]),
            1,
            &p,
        )
        .unwrap();
        assert!(txn.fee > p.min_fee);
    }

    #[test]
    fn test_encoding_is_canonical_map() {
        let txn = build_payment(
            &encode_address(&[1u8; 32]),
            &encode_address(&[2u8; 32]),
            7,
            &params(),
        )
        .unwrap();
        let encoded = txn.encode().unwrap();

        // fixmap with 9 entries (note omitted), first key "amt"
        assert_eq!(encoded[0], 0x89);
        assert_eq!(&encoded[1..5], &[0xa3, b'a', b'm', b't']);

        let signed = SignedTransaction {
            signature: vec![0u8; 64],
            transaction: txn.clone(),
        };
        let decoded = SignedTransaction::from_bytes(&signed.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.transaction, txn);
    }

    #[test]
    fn test_id_is_base32_digest() {
        let txn = build_payment(
            &encode_address(&[1u8; 32]),
            &encode_address(&[2u8; 32]),
            7,
            &params(),
        )
        .unwrap();
        let id = txn.id().unwrap();
        assert_eq!(id.len(), 52);
        assert_eq!(id, txn.id().unwrap());
    }

    #[test]
    fn test_rejects_malformed_receiver() {
        let result = build_payment(&encode_address(&[1u8; 32]), "nope", 1, &params());
        assert!(matches!(result, Err(DashboardError::SerializationError(_))));
    }

    #[test]
    fn test_hostile_params_do_not_overflow() {
        let sender = encode_address(&[1u8; 32]);
        let receiver = encode_address(&[2u8; 32]);

        let mut late = params();
        late.last_round = u64::MAX - 10;
        assert!(matches!(
            build_payment(&sender, &receiver, 1, &late),
            Err(DashboardError::SerializationError(_))
        ));

        let mut greedy = params();
        greedy.fee = u64::MAX / 2;
        assert!(matches!(
            build_payment(&sender, &receiver, 1, &greedy),
            Err(DashboardError::SerializationError(_))
        ));
    }

    #[test]
    fn test_app_create_encoding() {
        let sender = encode_address(&[1u8; 32]);
        let txn = build_app_create(
            &sender,
            vec![0x06, 0x81, 0x01],
            vec![0x06, 0x81, 0x01],
            StateSchema::new(1, 1),
            StateSchema::default(),
            &params(),
        )
        .unwrap();

        assert_eq!(txn.kind, "appl");
        assert_eq!(txn.app_id, 0);
        assert!(txn.local_schema.is_none());
        assert_eq!(txn.receiver_address(), None);

        // amt omitted; apap is the first key
        let encoded = txn.encode().unwrap();
        assert_eq!(&encoded[1..6], &[0xa4, b'a', b'p', b'a', b'p']);

        let signed = SignedTransaction {
            signature: vec![0u8; 64],
            transaction: txn.clone(),
        };
        let decoded = SignedTransaction::from_bytes(&signed.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.transaction, txn);
    }

    #[test]
    fn test_app_call_carries_args() {
        let sender = encode_address(&[1u8; 32]);
        let txn = build_app_call(&sender, 1001, vec![b"hello".to_vec()], &params()).unwrap();
        assert_eq!(txn.app_id, 1001);
        assert_eq!(txn.on_complete, 0);
        assert_eq!(txn.app_args[0].as_ref(), b"hello");
        assert!(txn.is_application_call());

        assert!(build_app_call(&sender, 0, vec![], &params()).is_err());
    }
}
