//! Independent signature verification.
//!
//! The wallet is an untrusted black box on the far side of an RPC channel:
//! a compromised or buggy provider can return a signature that does not
//! correspond to the account that requested it. Every signature coming back
//! from the wallet is therefore recovered locally and compared against the
//! claimed signer before anything downstream treats it as proof of
//! authorization.

use crate::error::ClientError;
use alloy_dyn_abi::TypedData;
use alloy_primitives::{eip191_hash_message, Address, Signature, B256};

/// Result of verifying a personal-message signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Whether the recovered signer matches the claimed address.
    pub valid: bool,
    pub recovered: Address,
}

/// Result of verifying an EIP-712 typed-data signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDataVerification {
    pub valid: bool,
    pub recovered: Address,
    /// The locally computed EIP-712 signing hash of the payload.
    pub message_hash: B256,
}

/// Verifies that `signature` over the EIP-191 personal-message digest of
/// `message` originates from `claimed`.
///
/// `claimed` must be a checksummed address; a malformed or wrongly
/// checksummed input is a precondition violation
/// ([`ClientError::InvalidAddress`]), not a negative verification.
pub fn verify_personal_signature(
    message: impl AsRef<[u8]>,
    claimed: &str,
    signature: &[u8],
) -> Result<Verification, ClientError> {
    let claimed = parse_checksummed(claimed)?;
    let signature = Signature::try_from(signature)?;
    let recovered = recover_personal(message.as_ref(), &signature)?;
    Ok(Verification { valid: recovered == claimed, recovered })
}

/// Verifies that `signature` over the EIP-712 signing hash of `payload`
/// originates from `claimed`. The hash is computed locally and returned so
/// callers never have to trust a wallet-supplied hash.
pub fn verify_typed_data_signature(
    payload: &TypedData,
    claimed: &str,
    signature: &[u8],
) -> Result<TypedDataVerification, ClientError> {
    let claimed = parse_checksummed(claimed)?;
    let signature = Signature::try_from(signature)?;
    let (recovered, message_hash) = recover_typed_data(payload, &signature)?;
    Ok(TypedDataVerification { valid: recovered == claimed, recovered, message_hash })
}

/// EIP-191 digest of a personal message.
pub fn personal_message_hash(message: impl AsRef<[u8]>) -> B256 {
    eip191_hash_message(message)
}

pub(crate) fn parse_checksummed(address: &str) -> Result<Address, ClientError> {
    Address::parse_checksummed(address, None)
        .map_err(|_| ClientError::InvalidAddress(address.to_string()))
}

pub(crate) fn recover_personal(
    message: &[u8],
    signature: &Signature,
) -> Result<Address, ClientError> {
    Ok(signature.recover_address_from_msg(message)?)
}

pub(crate) fn recover_typed_data(
    payload: &TypedData,
    signature: &Signature,
) -> Result<(Address, B256), ClientError> {
    let message_hash = payload.eip712_signing_hash()?;
    let recovered = signature.recover_address_from_prehash(&message_hash)?;
    Ok((recovered, message_hash))
}
