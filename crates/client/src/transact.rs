//! Gas-safe transaction preflight and submission.
//!
//! Before a transaction leaves the client the sender must be able to afford
//! worst-case gas: the current gas price, a gas estimate for the call and
//! the sender's balance are fetched concurrently, the estimate gets a 10%
//! safety margin, and the margin-adjusted fee is compared against the
//! balance in 256-bit arithmetic. Only then is the call handed to the
//! wallet for submission.

use crate::{
    error::{ClientError, Stage},
    units,
};
use alloy_primitives::{Address, TxHash, U256};
use futures::StreamExt;
use std::fmt;
use tracing::{debug, info};
use w3_provider::{
    ProviderError, TransactionReceipt, TransactionRequest, TxProgress, WalletProvider,
};

/// The chain's native-token decimal scale, for human-readable fee amounts.
const ETHER_DECIMALS: u8 = 18;

/// Validated submission parameters, consumed by exactly one submission.
/// Gas price and balance are point-in-time values and are never cached
/// across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preflight {
    /// Gas price in wei.
    pub gas_price: u128,
    /// Margin-adjusted gas limit.
    pub gas_limit: u64,
}

/// Applies the 10% safety margin: `ceil(estimate * 1.1)` in integer
/// arithmetic, saturating so a hostile estimate cannot overflow.
pub(crate) fn safe_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.div_ceil(10))
}

pub(crate) async fn preflight(
    provider: &dyn WalletProvider,
    call: &TransactionRequest,
    from: Address,
) -> Result<Preflight, ClientError> {
    let mut estimated = call.clone();
    estimated.from = Some(from);

    let (gas_price, estimate, balance) = tokio::join!(
        provider.gas_price(),
        provider.estimate_gas(&estimated),
        provider.balance(from),
    );
    let gas_price = gas_price.map_err(|e| ClientError::rpc(Stage::GasPrice, e))?;
    let estimate = estimate.map_err(|e| ClientError::rpc(Stage::GasEstimate, e))?;
    let balance = balance.map_err(|e| ClientError::rpc(Stage::Balance, e))?;

    let gas_limit = safe_gas_limit(estimate);
    let required = U256::from(gas_price) * U256::from(gas_limit);
    if balance < required {
        return Err(ClientError::InsufficientFunds {
            required_eth: units::to_decimal(required, ETHER_DECIMALS),
        });
    }
    Ok(Preflight { gas_price, gas_limit })
}

type HashHandler = Box<dyn Fn(TxHash) + Send + Sync>;
type ReceiptHandler = Box<dyn Fn(&TransactionReceipt) + Send + Sync>;
type ConfirmationHandler = Box<dyn Fn(u64, &TransactionReceipt) + Send + Sync>;
type TxErrorHandler = Box<dyn Fn(&ClientError, &str) + Send + Sync>;

/// Handlers for the transaction lifecycle.
///
/// The error handler is the only required one; every preflight or
/// submission failure is delivered to it together with a human-readable
/// stage label. The lifecycle handlers default to `tracing` output.
pub struct TxHandlers {
    transaction_hash: Option<HashHandler>,
    receipt: Option<ReceiptHandler>,
    confirmation: Option<ConfirmationHandler>,
    error: TxErrorHandler,
}

impl TxHandlers {
    pub fn new(error: impl Fn(&ClientError, &str) + Send + Sync + 'static) -> Self {
        Self { transaction_hash: None, receipt: None, confirmation: None, error: Box::new(error) }
    }

    pub fn on_transaction_hash(mut self, handler: impl Fn(TxHash) + Send + Sync + 'static) -> Self {
        self.transaction_hash = Some(Box::new(handler));
        self
    }

    pub fn on_receipt(
        mut self,
        handler: impl Fn(&TransactionReceipt) + Send + Sync + 'static,
    ) -> Self {
        self.receipt = Some(Box::new(handler));
        self
    }

    pub fn on_confirmation(
        mut self,
        handler: impl Fn(u64, &TransactionReceipt) + Send + Sync + 'static,
    ) -> Self {
        self.confirmation = Some(Box::new(handler));
        self
    }

    pub(crate) fn handle_error(&self, err: &ClientError) {
        (self.error)(err, err.stage_label());
    }

    fn handle_transaction_hash(&self, hash: TxHash) {
        match &self.transaction_hash {
            Some(handler) => handler(hash),
            None => info!(%hash, "transaction submitted"),
        }
    }

    fn handle_receipt(&self, receipt: &TransactionReceipt) {
        match &self.receipt {
            Some(handler) => handler(receipt),
            None => info!(hash = %receipt.transaction_hash, status = receipt.status, "transaction mined"),
        }
    }

    fn handle_confirmation(&self, number: u64, receipt: &TransactionReceipt) {
        match &self.confirmation {
            Some(handler) => handler(number, receipt),
            None => debug!(number, hash = %receipt.transaction_hash, "transaction confirmed"),
        }
    }
}

impl fmt::Debug for TxHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxHandlers")
            .field("transaction_hash", &self.transaction_hash.is_some())
            .field("receipt", &self.receipt.is_some())
            .field("confirmation", &self.confirmation.is_some())
            .finish()
    }
}

/// Preflights `call` for `from`, submits it with the validated gas
/// parameters stamped in, and forwards every progress event to its
/// handler. Errors are returned to the caller; the facade additionally
/// funnels them to the error handler.
pub(crate) async fn send(
    provider: &dyn WalletProvider,
    mut call: TransactionRequest,
    from: Address,
    handlers: &TxHandlers,
) -> Result<(), ClientError> {
    let preflight = preflight(provider, &call, from).await?;

    call.from = Some(from);
    call.gas_price = Some(preflight.gas_price);
    call.gas = Some(preflight.gas_limit);

    let mut progress = provider
        .send_transaction(call)
        .await
        .map_err(|e| ClientError::rpc(Stage::Submit, e))?;

    while let Some(event) = progress.next().await {
        match event {
            TxProgress::Hash { hash } => handlers.handle_transaction_hash(hash),
            TxProgress::Receipt { receipt } => handlers.handle_receipt(&receipt),
            TxProgress::Confirmation { number, receipt } => {
                handlers.handle_confirmation(number, &receipt)
            }
            TxProgress::Failed { message } => {
                return Err(ClientError::rpc(Stage::Submit, ProviderError::rpc(message)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_margin_rounds_up() {
        assert_eq!(safe_gas_limit(100_000), 110_000);
        assert_eq!(safe_gas_limit(21_000), 23_100);
        // ceil(1 * 1.1) = 2, ceil(15 * 1.1) = 17
        assert_eq!(safe_gas_limit(1), 2);
        assert_eq!(safe_gas_limit(15), 17);
        assert_eq!(safe_gas_limit(0), 0);
    }

    #[test]
    fn safety_margin_saturates_on_hostile_estimates() {
        assert_eq!(safe_gas_limit(u64::MAX), u64::MAX);
        assert_eq!(safe_gas_limit(u64::MAX - 1), u64::MAX);
    }
}
