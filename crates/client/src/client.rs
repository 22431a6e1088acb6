//! The wallet client facade.
//!
//! [`WalletClient`] bundles the connection state machine with the signing,
//! balance and transaction operations so host applications hold a single
//! handle. Every operation that talks to the chain requires the connection
//! to be `Ready`; operations that act on behalf of an account additionally
//! require the wallet to expose one.

use crate::{
    connection::{Account, ConnectionPhase, PollOutcome, WalletConnection},
    error::{ClientError, Stage},
    networks::{self, ExplorerKind, NetworkData},
    sign::{self, SignedMessage},
    transact::{self, TxHandlers},
    units, ConnectionConfig,
};
use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, TxKind, U256};
use alloy_sol_types::{sol, SolCall};
use std::sync::Arc;
use w3_provider::{ProviderError, TransactionInput, TransactionRequest, WalletProvider};

sol! {
    function balanceOf(address owner) external view returns (uint256);
    function decimals() external view returns (uint8);
}

/// Unit a native balance is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceUnit {
    /// Base units, as an integer string.
    Wei,
    /// Scaled by 10^18, as a decimal string.
    #[default]
    Ether,
}

/// A browser wallet client.
///
/// Cheap to clone; all clones share the same connection.
#[derive(Debug, Clone, Default)]
pub struct WalletClient {
    connection: WalletConnection,
}

impl WalletClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the underlying connection and starts polling. See
    /// [`WalletConnection::initialize`].
    pub fn initialize(
        &self,
        provider: Option<Arc<dyn WalletProvider>>,
        config: ConnectionConfig,
    ) -> Result<(), ClientError> {
        self.connection.initialize(provider, config)
    }

    /// Stops polling and clears all connection state.
    pub fn reset(&self) {
        self.connection.reset();
    }

    /// Runs one poll cycle outside the timer.
    pub async fn poll_now(&self) -> PollOutcome {
        self.connection.poll_now().await
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.connection.phase()
    }

    pub fn is_ready(&self) -> bool {
        self.connection.is_ready()
    }

    /// The currently observed account.
    pub fn account(&self) -> Result<Account, ClientError> {
        self.connection.account()
    }

    /// The currently observed network id.
    pub fn network_id(&self) -> Result<u64, ClientError> {
        self.connection.network_id()
    }

    /// Static metadata for the currently observed network.
    pub fn network_data(&self) -> Result<&'static NetworkData, ClientError> {
        networks::network_data(self.connection.network_id()?)
    }

    /// Etherscan link for `data` on the currently observed network.
    pub fn explorer_url(&self, kind: ExplorerKind, data: &str) -> Result<String, ClientError> {
        networks::explorer_url(self.connection.network_id()?, kind, data)
    }

    /// Native balance of `account`, defaulting to the wallet's current
    /// account.
    pub async fn balance(
        &self,
        account: Option<Address>,
        unit: BalanceUnit,
    ) -> Result<String, ClientError> {
        let provider = self.connection.provider()?;
        let account = match account {
            Some(account) => account,
            None => self.require_account()?,
        };
        let wei = provider
            .balance(account)
            .await
            .map_err(|e| ClientError::rpc(Stage::Balance, e))?;
        Ok(match unit {
            BalanceUnit::Wei => wei.to_string(),
            BalanceUnit::Ether => units::to_decimal(wei, 18),
        })
    }

    /// ERC-20 balance of `account` on the `token` contract, rendered using
    /// the token's own decimal scale. Balance and scale are fetched
    /// concurrently.
    pub async fn token_balance(
        &self,
        token: Address,
        account: Option<Address>,
    ) -> Result<String, ClientError> {
        let provider = self.connection.provider()?;
        let account = match account {
            Some(account) => account,
            None => self.require_account()?,
        };

        let balance_call = erc20_call(token, balanceOfCall { owner: account }.abi_encode());
        let decimals_call = erc20_call(token, decimalsCall {}.abi_encode());
        let (balance, decimals) =
            tokio::join!(provider.call(&balance_call), provider.call(&decimals_call));

        let balance: U256 = decode_return::<balanceOfCall>(
            &balance.map_err(|e| ClientError::rpc(Stage::Call, e))?,
        )?;
        let decimals: u8 = decode_return::<decimalsCall>(
            &decimals.map_err(|e| ClientError::rpc(Stage::Call, e))?,
        )?;
        Ok(units::to_decimal(balance, decimals))
    }

    /// Asks the wallet to sign `message` with the current account and
    /// verifies the returned signature. See [`sign::SignedMessage`].
    pub async fn sign_personal_message(&self, message: &str) -> Result<SignedMessage, ClientError> {
        let provider = self.connection.provider()?;
        let from = self.require_account()?;
        sign::sign_personal(provider.as_ref(), from, message).await
    }

    /// Asks the wallet to sign an EIP-712 payload with the current account
    /// and verifies the returned signature against the locally computed
    /// signing hash.
    pub async fn sign_typed_data(&self, payload: &TypedData) -> Result<SignedMessage, ClientError> {
        let provider = self.connection.provider()?;
        let from = self.require_account()?;
        sign::sign_typed_data(provider.as_ref(), from, payload).await
    }

    /// Preflights and submits `call` from the current account.
    ///
    /// Failures are delivered to the error handler in `handlers` with a
    /// stage label and also returned, so callers can use either style.
    pub async fn send_transaction(
        &self,
        call: TransactionRequest,
        handlers: &TxHandlers,
    ) -> Result<(), ClientError> {
        let staged = async {
            let provider = self.connection.provider()?;
            let from = self.require_account()?;
            transact::send(provider.as_ref(), call, from, handlers).await
        };
        match staged.await {
            Ok(()) => Ok(()),
            Err(err) => {
                handlers.handle_error(&err);
                Err(err)
            }
        }
    }

    fn require_account(&self) -> Result<Address, ClientError> {
        match self.connection.account()? {
            Account::Address(address) => Ok(address),
            Account::Unknown | Account::None => Err(ClientError::NoAccount),
        }
    }
}

fn erc20_call(token: Address, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(token)),
        input: TransactionInput::new(data.into()),
        ..Default::default()
    }
}

fn decode_return<C: SolCall>(data: &[u8]) -> Result<C::Return, ClientError> {
    C::abi_decode_returns(data)
        .map_err(|e| ClientError::rpc(Stage::Call, ProviderError::invalid_response(e.to_string())))
}
