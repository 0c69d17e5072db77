//! EVM encoding support for the token bank client.
//!
//! This crate provides:
//! - Minimal ABI encoding/decoding and function selectors
//! - `bytes32` short-string symbol encoding
//! - Decimal <-> smallest-unit amount conversion
//! - ERC-20 `approve` and bank ledger calldata
//! - EIP-1559 transaction building and signing
//! - Address derivation from secp256k1 keys
//! - EVM network definitions

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod ledger;
pub mod symbol;
pub mod transaction;
pub mod units;
