use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::error::EthError;

/// Gas pricing for an EIP-1559 transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
}

/// An unsigned EIP-1559 (type 2) Ethereum transaction.
#[derive(Debug, Clone)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: Address,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata (empty for plain value transfers).
    pub data: Vec<u8>,
}

/// A signed EIP-1559 Ethereum transaction ready for broadcast.
pub struct SignedEthTransaction {
    /// Signed transaction bytes (including the 0x02 type prefix).
    pub raw_tx: Vec<u8>,
    pub tx_hash: B256,
}

/// Builds an unsigned EIP-1559 contract call or value transfer.
pub fn build_call(
    chain_id: u64,
    nonce: u64,
    to: Address,
    value: U256,
    data: Vec<u8>,
    fees: FeeParams,
) -> Result<EthTransaction, EthError> {
    if fees.max_priority_fee_per_gas > fees.max_fee_per_gas {
        return Err(EthError::EncodingError(format!(
            "priority fee {} exceeds max fee {}",
            fees.max_priority_fee_per_gas, fees.max_fee_per_gas
        )));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        max_fee_per_gas: fees.max_fee_per_gas,
        gas_limit: fees.gas_limit,
        to,
        value,
        data,
    })
}

/// Signs an EIP-1559 transaction with the given secp256k1 private key.
///
/// The signing process:
/// 1. RLP-encode the unsigned transaction fields.
/// 2. Prepend the type byte (0x02) to get the signing payload.
/// 3. Keccak-256 hash the payload.
/// 4. Sign the hash with the private key using k256.
/// 5. Build the signed transaction with v (y_parity), r, s appended.
/// 6. Return the raw bytes and transaction hash.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    let unsigned_payload = encode_unsigned_tx(tx);
    let msg_hash = Keccak256::digest(&unsigned_payload);

    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(msg_hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature.r().to_bytes());
    s_bytes.copy_from_slice(&signature.s().to_bytes());

    let signed_fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to.into_array()),
        value: RlpU256(tx.value.to_be_bytes::<32>()),
        data: RlpBytes(tx.data.clone()),
        access_list: Vec::new(),
        signature_y_parity: recovery_id.is_y_odd() as u8,
        signature_r: RlpU256(r_bytes),
        signature_s: RlpU256(s_bytes),
    };

    let mut rlp_buf = Vec::new();
    signed_fields.encode(&mut rlp_buf);

    let mut raw_tx = Vec::with_capacity(1 + rlp_buf.len());
    raw_tx.push(0x02);
    raw_tx.extend_from_slice(&rlp_buf);

    let tx_hash = B256::from_slice(&Keccak256::digest(&raw_tx));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

/// Encodes the unsigned EIP-1559 transaction as `0x02 || rlp(fields)`.
///
/// The RLP-encoded fields are:
/// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to,
///   value, data, access_list]`
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Vec<u8> {
    let unsigned_fields = UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to.into_array()),
        value: RlpU256(tx.value.to_be_bytes::<32>()),
        data: RlpBytes(tx.data.clone()),
        access_list: Vec::new(),
    };

    let mut rlp_buf = Vec::new();
    unsigned_fields.encode(&mut rlp_buf);

    let mut payload = Vec::with_capacity(1 + rlp_buf.len());
    payload.push(0x02);
    payload.extend_from_slice(&rlp_buf);
    payload
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// An EIP-2930 access list entry (always empty here).
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: RlpAddress,
    storage_keys: Vec<RlpBytes>,
}

/// Arbitrary bytes encoded as a single RLP string.
#[derive(Debug, Clone)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// A 20-byte address encoded as an RLP string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// A 256-bit integer encoded as minimal big-endian bytes with leading zeros
/// stripped (standard RLP integer encoding).
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Well-known test private key (DO NOT use on mainnet).
    const TEST_PRIVKEY: [u8; 32] = {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    };

    const FEES: FeeParams = FeeParams {
        max_priority_fee_per_gas: 1_000_000_000,
        max_fee_per_gas: 50_000_000_000,
        gas_limit: 21_000,
    };

    fn bank() -> Address {
        "0x5FC8d32690cc91D4c39d9d3abcBD16989F875707".parse().unwrap()
    }

    fn one_ether() -> U256 {
        U256::from(1_000_000_000_000_000_000u64)
    }

    #[test]
    fn build_call_keeps_fields() {
        let tx = build_call(31337, 3, bank(), one_ether(), Vec::new(), FEES).unwrap();

        assert_eq!(tx.chain_id, 31337);
        assert_eq!(tx.nonce, 3);
        assert_eq!(tx.gas_limit, 21_000);
        assert_eq!(tx.value, one_ether());
        assert!(tx.data.is_empty());
    }

    #[test]
    fn build_call_rejects_inverted_fees() {
        let fees = FeeParams {
            max_priority_fee_per_gas: 10,
            max_fee_per_gas: 1,
            gas_limit: 21_000,
        };
        assert!(build_call(1, 0, bank(), U256::ZERO, Vec::new(), fees).is_err());
    }

    #[test]
    fn encode_unsigned_tx_starts_with_type_byte() {
        let tx = build_call(1, 0, bank(), U256::ZERO, Vec::new(), FEES).unwrap();
        let encoded = encode_unsigned_tx(&tx);

        assert_eq!(encoded[0], 0x02, "EIP-1559 type byte must be 0x02");
        assert!(encoded.len() > 1);
    }

    #[test]
    fn sign_transaction_produces_valid_output() {
        let tx = build_call(1, 0, bank(), one_ether(), Vec::new(), FEES).unwrap();
        let signed = sign_transaction(&tx, &TEST_PRIVKEY).unwrap();

        assert_eq!(signed.raw_tx[0], 0x02);
        assert_ne!(signed.tx_hash, B256::ZERO);
    }

    #[test]
    fn sign_transaction_is_deterministic() {
        let tx = build_call(1, 0, bank(), U256::ZERO, vec![1, 2, 3], FEES).unwrap();

        let signed1 = sign_transaction(&tx, &TEST_PRIVKEY).unwrap();
        let signed2 = sign_transaction(&tx, &TEST_PRIVKEY).unwrap();

        assert_eq!(signed1.raw_tx, signed2.raw_tx);
        assert_eq!(signed1.tx_hash, signed2.tx_hash);
    }

    #[test]
    fn sign_transaction_different_nonces_differ() {
        let tx1 = build_call(1, 0, bank(), U256::ZERO, Vec::new(), FEES).unwrap();
        let tx2 = build_call(1, 1, bank(), U256::ZERO, Vec::new(), FEES).unwrap();

        let signed1 = sign_transaction(&tx1, &TEST_PRIVKEY).unwrap();
        let signed2 = sign_transaction(&tx2, &TEST_PRIVKEY).unwrap();

        assert_ne!(signed1.tx_hash, signed2.tx_hash);
    }

    #[test]
    fn sign_transaction_invalid_private_key() {
        let tx = build_call(1, 0, bank(), U256::ZERO, Vec::new(), FEES).unwrap();
        assert!(sign_transaction(&tx, &[0u8; 32]).is_err());
    }

    #[test]
    fn rlp_u256_zero_encodes_as_empty() {
        let mut buf = Vec::new();
        RlpU256([0u8; 32]).encode(&mut buf);

        // RLP encoding of empty bytes is 0x80.
        assert_eq!(buf, vec![0x80]);
    }

    #[test]
    fn rlp_u256_small_value_encodes_correctly() {
        let mut buf = Vec::new();
        RlpU256(U256::from(42u64).to_be_bytes::<32>()).encode(&mut buf);

        // 42 < 0x80, so RLP encodes it as a single byte.
        assert_eq!(buf, vec![42]);
    }

    #[test]
    fn rlp_address_encodes_20_bytes() {
        let mut buf = Vec::new();
        RlpAddress([0xde; 20]).encode(&mut buf);

        // 0x80 + 20 = 0x94 prefix, then the 20 bytes.
        assert_eq!(buf.len(), 21);
        assert_eq!(buf[0], 0x94);
        assert_eq!(&buf[1..], &[0xde; 20]);
    }
}
