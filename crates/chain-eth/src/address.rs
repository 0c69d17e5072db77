use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::error::EthError;

/// Derives an Ethereum address from an uncompressed secp256k1 public key
/// (65 bytes, starting with 0x04).
///
/// The derivation takes the Keccak-256 hash of the 64-byte public key (without
/// the 0x04 prefix) and uses the last 20 bytes as the address.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8; 65]) -> Result<Address, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Derives the Ethereum address controlled by a secp256k1 private key.
pub fn address_from_private_key(private_key: &[u8; 32]) -> Result<Address, EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let uncompressed = signing_key.verifying_key().to_encoded_point(false);
    let mut key_65 = [0u8; 65];
    key_65.copy_from_slice(uncompressed.as_bytes());

    pubkey_to_address(&key_65)
}
