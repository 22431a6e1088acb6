//! Abstraction over an injected Ethereum wallet provider.
//!
//! A [`WalletProvider`] is the object a host environment (a browser
//! extension, an embedded wallet, a test harness) hands to the client: it
//! exposes the account list, the network id, fee estimation, transaction
//! submission and a raw JSON-RPC escape hatch for signing methods that have
//! no typed binding ([EIP-1193](https://eips.ethereum.org/EIPS/eip-1193)
//! style). The provider is treated as an untrusted collaborator: everything
//! it returns is re-verified by the client crate.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod error;
mod types;

pub use error::ProviderError;
pub use types::{TransactionReceipt, TxProgress};

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Re-exported pending-call type. A call is described with the standard
/// Ethereum RPC transaction request object.
pub use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};

/// An injected wallet provider.
///
/// All methods are fallible round trips to the wallet's RPC channel. The
/// trait is object safe so a connection can hold it as
/// `Arc<dyn WalletProvider>`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Returns the integer chain id of the network the wallet is on.
    async fn network_id(&self) -> Result<u64, ProviderError>;

    /// Returns the accounts the wallet currently exposes. An empty list
    /// means no account is unlocked.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Returns the current gas price in wei.
    async fn gas_price(&self) -> Result<u128, ProviderError>;

    /// Estimates the gas cost of `call`. The request carries the sender in
    /// its `from` field; a failed estimate implies the call would revert.
    async fn estimate_gas(&self, call: &TransactionRequest) -> Result<u64, ProviderError>;

    /// Returns the balance of `address` in wei.
    async fn balance(&self, address: Address) -> Result<U256, ProviderError>;

    /// Executes a read-only contract call and returns the raw return data.
    async fn call(&self, call: &TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Submits a transaction. The request must carry `from`, `gas_price`
    /// and `gas`. Progress is reported as a stream of [`TxProgress`]
    /// events: a hash, then a receipt, then zero or more confirmations, or
    /// a terminal failure.
    async fn send_transaction(
        &self,
        call: TransactionRequest,
    ) -> Result<BoxStream<'static, TxProgress>, ProviderError>;

    /// Performs a raw JSON-RPC request for methods without a typed binding
    /// (`personal_sign`, `eth_signTypedData_v4`). `from` identifies the
    /// account the request acts on behalf of.
    async fn raw_request(
        &self,
        method: &str,
        params: serde_json::Value,
        from: Address,
    ) -> Result<serde_json::Value, ProviderError>;
}
