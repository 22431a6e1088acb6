//! The wallet connection state machine.
//!
//! A [`WalletConnection`] owns the lifecycle of exactly one provider
//! connection: it discovers the provider, polls it for account and network
//! changes, and notifies the configured handlers once per observed change.
//! All other operations read the connection through Ready-gated accessors;
//! the poll cycle is the only writer.
//!
//! The machine is deliberately fail-fast: a single unsupported-network or
//! provider-RPC failure cancels polling, resets the observed fields to
//! unknown and parks the machine in [`ConnectionPhase::Errored`] until it
//! is explicitly reset and re-initialized. Stale account or network data is
//! never left visible.

use crate::{config::ConnectionConfig, error::ClientError, error::Stage};
use alloy_primitives::Address;
use parking_lot::Mutex;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use w3_provider::WalletProvider;

/// Lifecycle phase of a wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// `initialize` has not run, or ran without detecting a provider.
    Uninitialized,
    /// A provider was detected; the first poll has not completed yet.
    Polling,
    /// At least one poll completed; account and network id are known.
    Ready,
    /// Polling failed. Terminal until `reset` + `initialize`.
    Errored,
}

impl ConnectionPhase {
    pub(crate) fn not_ready_reason(&self) -> &'static str {
        match self {
            Self::Errored => "the wallet connection failed; reset and re-initialize it",
            _ => "the wallet connection is not ready; wait for the ready handler",
        }
    }
}

/// The account a connection currently observes.
///
/// `Unknown` (nothing observed yet) is distinct from `None` (the provider
/// answered with an empty account list, e.g. a locked wallet), and both are
/// distinct from any real address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Account {
    #[default]
    Unknown,
    None,
    Address(Address),
}

impl Account {
    /// The address, if a real account is exposed.
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }

    fn from_list(accounts: &[Address]) -> Self {
        match accounts.first() {
            Some(address) => Self::Address(*address),
            None => Self::None,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::None => f.write_str("none"),
            Self::Address(address) => f.write_str(&address.to_checksum(None)),
        }
    }
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The cycle ran and committed its observations.
    Completed,
    /// The cycle was suppressed: another cycle is in flight, the minimum
    /// interval has not elapsed, or the connection is not polling.
    Skipped,
    /// The cycle failed; the machine transitioned to `Errored` and the
    /// error handler was invoked.
    Failed,
}

/// Everything the connection owns, behind one lock. Single writer (the
/// poll cycle, `initialize` and `reset`); accessors only read.
struct ConnectionState {
    phase: ConnectionPhase,
    account: Account,
    network_id: Option<u64>,
    /// Start instant of the last *completed* cycle; the re-entrancy guard
    /// compares against this.
    last_poll_started: Option<Instant>,
    /// Set while a cycle is between its guard check and its commit.
    in_flight: bool,
    initialize_called: bool,
    provider: Option<Arc<dyn WalletProvider>>,
    config: Option<Arc<ConnectionConfig>>,
    poll_task: Option<JoinHandle<()>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Uninitialized,
            account: Account::Unknown,
            network_id: None,
            last_poll_started: None,
            in_flight: false,
            initialize_called: false,
            provider: None,
            config: None,
            poll_task: None,
        }
    }
}

struct ConnectionInner {
    state: Mutex<ConnectionState>,
}

/// A live connection to an injected wallet provider.
///
/// Cheap to clone; all clones share the same state machine.
#[derive(Clone)]
pub struct WalletConnection {
    inner: Arc<ConnectionInner>,
}

impl Default for WalletConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WalletConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WalletConnection")
            .field("phase", &state.phase)
            .field("account", &state.account)
            .field("network_id", &state.network_id)
            .finish()
    }
}

impl WalletConnection {
    pub fn new() -> Self {
        Self { inner: Arc::new(ConnectionInner { state: Mutex::new(ConnectionState::default()) }) }
    }

    /// Initializes the connection.
    ///
    /// If `provider` is `None` (no injected provider was detected), the
    /// `no_provider` handler fires and the machine stays `Uninitialized`.
    /// Otherwise polling starts immediately at the configured interval.
    ///
    /// Fails synchronously with a configuration error when called a second
    /// time without an intervening [`reset`](Self::reset). Must be called
    /// from within a tokio runtime.
    pub fn initialize(
        &self,
        provider: Option<Arc<dyn WalletProvider>>,
        config: ConnectionConfig,
    ) -> Result<(), ClientError> {
        let config = Arc::new(config);
        let mut state = self.inner.state.lock();
        if state.initialize_called {
            return Err(ClientError::Configuration(
                "initialize may only be called once per connection; call reset() first".into(),
            ));
        }
        state.initialize_called = true;
        state.config = Some(config.clone());

        let Some(provider) = provider else {
            drop(state);
            config.handlers.on_no_provider();
            return Ok(());
        };

        state.provider = Some(provider);
        state.phase = ConnectionPhase::Polling;

        let inner = self.inner.clone();
        let interval = config.poll_interval;
        state.poll_task = Some(tokio::spawn(poll_loop(inner, interval)));
        Ok(())
    }

    /// Aborts polling and clears every field atomically, allowing a fresh
    /// `initialize`. A cycle that was in flight when the reset happened
    /// drops its result instead of committing into the cleared state.
    pub fn reset(&self) {
        let task = {
            let mut state = self.inner.state.lock();
            let task = state.poll_task.take();
            *state = ConnectionState::default();
            task
        };
        if let Some(task) = task {
            task.abort();
        }
        debug!("wallet connection reset");
    }

    /// Runs one poll cycle now, subject to the same guards as the timer:
    /// overlapping or too-early cycles are no-ops. Failures go to the error
    /// handler, never to the caller.
    pub async fn poll_now(&self) -> PollOutcome {
        run_cycle(&self.inner).await
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ConnectionPhase {
        self.inner.state.lock().phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == ConnectionPhase::Ready
    }

    /// The currently observed account. Fails unless the connection is
    /// `Ready`.
    pub fn account(&self) -> Result<Account, ClientError> {
        let state = self.inner.state.lock();
        match state.phase {
            ConnectionPhase::Ready => Ok(state.account),
            phase => Err(ClientError::NotReady { phase }),
        }
    }

    /// The currently observed network id. Fails unless the connection is
    /// `Ready`.
    pub fn network_id(&self) -> Result<u64, ClientError> {
        let state = self.inner.state.lock();
        match state.phase {
            ConnectionPhase::Ready => {
                state.network_id.ok_or(ClientError::NotReady { phase: state.phase })
            }
            phase => Err(ClientError::NotReady { phase }),
        }
    }

    /// Handle to the wrapped provider. Fails unless the connection is
    /// `Ready`.
    pub fn provider(&self) -> Result<Arc<dyn WalletProvider>, ClientError> {
        let state = self.inner.state.lock();
        match state.phase {
            ConnectionPhase::Ready => {
                state.provider.clone().ok_or(ClientError::NotReady { phase: state.phase })
            }
            phase => Err(ClientError::NotReady { phase }),
        }
    }
}

/// The recurring poll driver. One task per live connection; ends when a
/// cycle fails or the task is aborted by `reset`.
async fn poll_loop(inner: Arc<ConnectionInner>, interval: Duration) {
    loop {
        if run_cycle(&inner).await == PollOutcome::Failed {
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Runs one guarded poll cycle. See the module docs for the state policy.
async fn run_cycle(inner: &Arc<ConnectionInner>) -> PollOutcome {
    // Guard and snapshot under the lock; never hold it across an await.
    let (provider, config, old_network, old_account, first, started) = {
        let mut state = inner.state.lock();
        match state.phase {
            ConnectionPhase::Polling | ConnectionPhase::Ready => {}
            _ => return PollOutcome::Skipped,
        }
        if state.in_flight {
            return PollOutcome::Skipped;
        }
        let (Some(provider), Some(config)) = (state.provider.clone(), state.config.clone()) else {
            return PollOutcome::Skipped;
        };
        if let Some(last) = state.last_poll_started {
            if last.elapsed() < config.poll_interval {
                trace!("poll suppressed: interval not elapsed");
                return PollOutcome::Skipped;
            }
        }
        state.in_flight = true;
        let first = state.phase == ConnectionPhase::Polling;
        (provider, config, state.network_id, state.account, first, Instant::now())
    };

    let observed = observe(provider.as_ref(), &config).await;

    let (network_id, account) = match observed {
        Ok(observed) => observed,
        Err(err) => {
            fail(inner, &config, err);
            return PollOutcome::Failed;
        }
    };

    // Handler order is fixed: ready once, then network, then account. The
    // new values are committed only after all handlers ran, so handlers
    // never observe a cycle that has not finished notifying. The commit
    // sits in a drop guard: a panicking handler must not leave the cycle
    // marked in flight and wedge every later cycle.
    let commit = CommitGuard { inner, network_id, account, started };
    if first {
        config.handlers.on_ready();
    }
    if old_network != Some(network_id) {
        config.handlers.on_network_changed(network_id, old_network);
    }
    if old_account != account {
        config.handlers.on_account_changed(&account, &old_account);
    }
    commit.finish()
}

/// Commits a cycle's observations. Runs on drop too, so the observations
/// land and the in-flight marker clears even when a handler unwinds
/// mid-notification.
struct CommitGuard<'a> {
    inner: &'a Arc<ConnectionInner>,
    network_id: u64,
    account: Account,
    started: Instant,
}

impl CommitGuard<'_> {
    fn apply(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !state.in_flight {
            // The connection was reset while this cycle was in flight.
            return false;
        }
        state.phase = ConnectionPhase::Ready;
        state.network_id = Some(self.network_id);
        state.account = self.account;
        state.last_poll_started = Some(self.started);
        state.in_flight = false;
        true
    }

    fn finish(self) -> PollOutcome {
        let committed = self.apply();
        std::mem::forget(self);
        if committed {
            PollOutcome::Completed
        } else {
            PollOutcome::Skipped
        }
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.apply();
    }
}

/// Fetches the network id and account list concurrently and applies the
/// allow-list check.
async fn observe(
    provider: &dyn WalletProvider,
    config: &ConnectionConfig,
) -> Result<(u64, Account), ClientError> {
    let (network_id, accounts) = tokio::join!(provider.network_id(), provider.accounts());
    let network_id = network_id.map_err(|e| ClientError::rpc(Stage::NetworkId, e))?;
    if !config.allowed_networks.contains(&network_id) {
        return Err(ClientError::UnsupportedNetwork(network_id));
    }
    let accounts = accounts.map_err(|e| ClientError::rpc(Stage::Accounts, e))?;
    Ok((network_id, Account::from_list(&accounts)))
}

/// Transitions to `Errored`: cancels the timer and resets the observed
/// fields in the same step, then invokes the error handler.
fn fail(inner: &Arc<ConnectionInner>, config: &ConnectionConfig, err: ClientError) {
    let task = {
        let mut state = inner.state.lock();
        if !state.in_flight {
            // Reset raced with this cycle; the error no longer applies.
            return;
        }
        state.phase = ConnectionPhase::Errored;
        state.account = Account::Unknown;
        state.network_id = None;
        state.last_poll_started = None;
        state.in_flight = false;
        state.poll_task.take()
    };
    if let Some(task) = task {
        task.abort();
    }
    config.handlers.on_error(&err);
}
