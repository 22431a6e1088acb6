use crate::connection::ConnectionPhase;
use alloy_primitives::Address;
use w3_provider::ProviderError;

/// The provider round trip an RPC failure happened in.
///
/// The [`label`](Self::label) is the human-readable stage description the
/// transaction error handler receives alongside the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NetworkId,
    Accounts,
    GasPrice,
    GasEstimate,
    Balance,
    Call,
    Signing,
    Submit,
}

impl Stage {
    /// Human-readable description of the failed stage.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NetworkId => "could not fetch the network id",
            Self::Accounts => "could not fetch the account list",
            Self::GasPrice => "could not fetch the gas price",
            Self::GasEstimate => "the transaction would fail",
            Self::Balance => "could not fetch the sending address balance",
            Self::Call => "the contract call failed",
            Self::Signing => "the signing request failed",
            Self::Submit => "unable to send the transaction",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors surfaced by wallet-client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid configuration, or `initialize` was called twice without an
    /// intervening reset. Always synchronous.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was attempted before the connection reached `Ready`,
    /// or after it entered `Errored`.
    #[error("{}", .phase.not_ready_reason())]
    NotReady { phase: ConnectionPhase },

    /// The operation needs an account but the wallet exposes none; a
    /// password unlock is likely required.
    #[error("no account is currently exposed by the wallet")]
    NoAccount,

    /// A poll observed a network id outside the configured allow-list.
    #[error("network id {0} is not in the configured allow-list")]
    UnsupportedNetwork(u64),

    /// No static metadata exists for this network id.
    #[error("network id {0} has no known metadata")]
    UnknownNetwork(u64),

    /// A provider RPC call failed, tagged with the stage it failed in.
    #[error("{}: {source}", .stage.label())]
    ProviderRpc {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    /// The wallet returned a signature that does not originate from the
    /// address it claims to sign for.
    #[error("signature did not originate from {claimed} (recovered signer: {recovered})")]
    SignatureMismatch { claimed: Address, recovered: Address },

    /// The claimed address fails the EIP-55 checksum check. This is a
    /// precondition violation, not a verification result.
    #[error("`{0}` is not a valid checksummed address")]
    InvalidAddress(String),

    /// The signature bytes could not be parsed or used for recovery.
    #[error("malformed signature: {0}")]
    InvalidSignature(#[from] alloy_primitives::SignatureError),

    /// The typed-data payload could not be hashed.
    #[error("invalid typed data payload: {0}")]
    TypedData(#[from] alloy_dyn_abi::Error),

    /// The sender cannot cover worst-case gas for the transaction.
    #[error("insufficient balance: ensure the sender holds at least {required_eth} ETH")]
    InsufficientFunds { required_eth: String },

    /// A decimal amount string could not be converted to base units.
    #[error("invalid decimal amount: {0}")]
    InvalidDecimal(String),
}

impl ClientError {
    pub(crate) fn rpc(stage: Stage, source: ProviderError) -> Self {
        Self::ProviderRpc { stage, source }
    }

    /// Stage label used when funnelling a failure into a transaction error
    /// handler.
    pub fn stage_label(&self) -> &'static str {
        match self {
            Self::ProviderRpc { stage, .. } => stage.label(),
            Self::InsufficientFunds { .. } => "insufficient balance",
            Self::NotReady { .. } | Self::NoAccount => "the wallet connection is not ready",
            Self::UnsupportedNetwork(_) => "unsupported network",
            _ => "unexpected error",
        }
    }
}
