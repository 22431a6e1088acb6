//! Off-chain signing operations.
//!
//! Signing goes through the provider's raw JSON-RPC channel
//! (`personal_sign`, `eth_signTypedData_v4`) because injected providers do
//! not expose typed bindings for these methods. The returned signature is
//! never trusted as-is: the signer is recovered locally and compared
//! against the requesting account, and the message hash embedded in the
//! envelope is recomputed locally as well.

use crate::{
    error::{ClientError, Stage},
    verify,
};
use alloy_dyn_abi::TypedData;
use alloy_primitives::{eip191_hash_message, hex, Address, Signature, B256, U256};
use serde_json::json;
use std::str::FromStr;
use w3_provider::{ProviderError, WalletProvider};

/// A verified signature envelope.
///
/// `message_hash` is computed locally from the signed input (EIP-191 digest
/// for personal messages, EIP-712 signing hash for typed data) and is the
/// binding contract consumers rely on instead of trusting the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedMessage {
    /// The account the signature was requested for and verified against.
    pub from: Address,
    pub signature: Signature,
    pub message_hash: B256,
}

impl SignedMessage {
    /// The `r` component of the signature.
    pub fn r(&self) -> U256 {
        self.signature.r()
    }

    /// The `s` component of the signature.
    pub fn s(&self) -> U256 {
        self.signature.s()
    }

    /// The recovery id in 'Electrum' notation (27 or 28).
    pub fn v(&self) -> u64 {
        27 + self.signature.v() as u64
    }

    /// The 65-byte `r || s || v` encoding.
    pub fn as_bytes(&self) -> [u8; 65] {
        self.signature.as_bytes()
    }
}

pub(crate) async fn sign_personal(
    provider: &dyn WalletProvider,
    from: Address,
    message: &str,
) -> Result<SignedMessage, ClientError> {
    let data = hex::encode_prefixed(message.as_bytes());
    let response = provider
        .raw_request("personal_sign", json!([data, from]), from)
        .await
        .map_err(|e| ClientError::rpc(Stage::Signing, e))?;
    let signature = parse_signature(&response)?;

    let recovered = verify::recover_personal(message.as_bytes(), &signature)?;
    if recovered != from {
        return Err(ClientError::SignatureMismatch { claimed: from, recovered });
    }
    Ok(SignedMessage { from, signature, message_hash: eip191_hash_message(message) })
}

pub(crate) async fn sign_typed_data(
    provider: &dyn WalletProvider,
    from: Address,
    payload: &TypedData,
) -> Result<SignedMessage, ClientError> {
    // Hash before the wallet round trip; an unhashable payload is a caller
    // error, not a provider error.
    let message_hash = payload.eip712_signing_hash()?;

    let response = provider
        .raw_request("eth_signTypedData_v4", json!([from, payload]), from)
        .await
        .map_err(|e| ClientError::rpc(Stage::Signing, e))?;
    let signature = parse_signature(&response)?;

    let recovered = signature.recover_address_from_prehash(&message_hash)?;
    if recovered != from {
        return Err(ClientError::SignatureMismatch { claimed: from, recovered });
    }
    Ok(SignedMessage { from, signature, message_hash })
}

fn parse_signature(response: &serde_json::Value) -> Result<Signature, ClientError> {
    let hex_signature = response.as_str().ok_or_else(|| {
        ClientError::rpc(
            Stage::Signing,
            ProviderError::invalid_response("expected a hex signature string"),
        )
    })?;
    Ok(Signature::from_str(hex_signature)?)
}
