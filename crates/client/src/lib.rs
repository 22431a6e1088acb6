//! Browser wallet client.
//!
//! Connects a host application to an injected Ethereum wallet provider and
//! keeps the observed account and network current by polling, since
//! injected providers push no change events. On top of the connection it
//! offers verified message signing (EIP-191 and EIP-712), independent
//! signature verification, native and ERC-20 balance queries, and
//! gas-preflighted transaction submission.
//!
//! The provider abstraction lives in [`w3_provider`]; this crate never
//! trusts it: signatures are recovered and compared locally, and
//! transactions are only submitted once the sender provably affords
//! worst-case gas.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod client;
mod config;
mod connection;
mod error;
mod networks;
mod sign;
mod transact;
mod units;
mod verify;

pub use client::{BalanceUnit, WalletClient};
pub use config::{
    ConnectionConfig, ConnectionHandlers, ConnectionOptions, DEFAULT_ALLOWED_NETWORKS,
    DEFAULT_POLL_INTERVAL,
};
pub use connection::{Account, ConnectionPhase, PollOutcome, WalletConnection};
pub use error::{ClientError, Stage};
pub use networks::{
    explorer_url, network_consensus, network_data, network_name, Consensus, ExplorerKind,
    NetworkData,
};
pub use sign::SignedMessage;
pub use transact::TxHandlers;
pub use units::{from_decimal, to_decimal};
pub use verify::{
    personal_message_hash, verify_personal_signature, verify_typed_data_signature,
    TypedDataVerification, Verification,
};

pub use alloy_dyn_abi::TypedData;
pub use w3_provider::{
    ProviderError, TransactionInput, TransactionReceipt, TransactionRequest, TxProgress,
    WalletProvider,
};
