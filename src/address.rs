//! Algorand address encoding
//!
//! An address is the RFC 4648 base32 (unpadded) encoding of the 32-byte
//! Ed25519 public key followed by the last four bytes of its SHA-512/256
//! digest, 58 characters in total.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};

use crate::error::DraftError;

pub const PUBLIC_KEY_LEN: usize = 32;
pub const ADDRESS_LEN: usize = 58;
const CHECKSUM_LEN: usize = 4;

fn checksum(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Encode a public key as an address string
pub fn encode_address(public_key: &[u8; PUBLIC_KEY_LEN]) -> String {
    let mut bytes = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
    bytes.extend_from_slice(public_key);
    bytes.extend_from_slice(&checksum(public_key));
    BASE32_NOPAD.encode(&bytes)
}

/// Decode and verify an address string, returning the public key
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LEN], DraftError> {
    if address.len() != ADDRESS_LEN {
        return Err(DraftError::InvalidAddress(format!(
            "expected {} characters, got {}",
            ADDRESS_LEN,
            address.len()
        )));
    }

    let bytes = BASE32_NOPAD
        .decode(address.as_bytes())
        .map_err(|e| DraftError::InvalidAddress(format!("not base32: {}", e)))?;
    if bytes.len() != PUBLIC_KEY_LEN + CHECKSUM_LEN {
        return Err(DraftError::InvalidAddress("wrong decoded length".to_string()));
    }

    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&bytes[..PUBLIC_KEY_LEN]);
    if bytes[PUBLIC_KEY_LEN..] != checksum(&public_key) {
        return Err(DraftError::InvalidAddress("checksum mismatch".to_string()));
    }

    Ok(public_key)
}

/// Cheap check used before any network work
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}
