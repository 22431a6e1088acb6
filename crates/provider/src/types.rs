use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// A mined-transaction receipt as reported by an injected provider.
///
/// Injected providers speak plain JSON; this is the subset of the receipt
/// the client forwards to its lifecycle handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    /// Block the transaction was included in, if already mined.
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// `true` if the transaction succeeded.
    pub status: bool,
}

/// Progress events emitted while a submitted transaction moves through the
/// network: hash, then receipt, then confirmations. `Failed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TxProgress {
    /// The transaction was accepted by the node and assigned a hash.
    Hash { hash: TxHash },
    /// The transaction was mined.
    Receipt { receipt: TransactionReceipt },
    /// `number` further blocks have been mined on top of the inclusion
    /// block.
    Confirmation { number: u64, receipt: TransactionReceipt },
    /// Submission failed after the transaction left the client.
    Failed { message: String },
}
