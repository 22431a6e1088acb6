//! Connection configuration and the fixed handler set.

use crate::{connection::Account, error::ClientError};
use serde::Deserialize;
use std::{fmt, time::Duration};
use tracing::{error, info, warn};

/// Default interval between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Networks accepted by default: mainnet, ropsten, rinkeby, kovan.
pub const DEFAULT_ALLOWED_NETWORKS: [u64; 4] = [1, 3, 4, 42];

type NoProviderHandler = Box<dyn Fn() + Send + Sync>;
type ReadyHandler = Box<dyn Fn() + Send + Sync>;
type ErrorHandler = Box<dyn Fn(&ClientError) + Send + Sync>;
type NetworkChangedHandler = Box<dyn Fn(u64, Option<u64>) + Send + Sync>;
type AccountChangedHandler = Box<dyn Fn(&Account, &Account) + Send + Sync>;

/// The closed set of connection lifecycle handlers.
///
/// Every handler is optional; an unset handler falls back to a `tracing`
/// event so lifecycle changes are never silently dropped.
#[derive(Default)]
pub struct ConnectionHandlers {
    pub(crate) no_provider: Option<NoProviderHandler>,
    pub(crate) ready: Option<ReadyHandler>,
    pub(crate) error: Option<ErrorHandler>,
    pub(crate) network_changed: Option<NetworkChangedHandler>,
    pub(crate) account_changed: Option<AccountChangedHandler>,
}

impl ConnectionHandlers {
    pub(crate) fn on_no_provider(&self) {
        match &self.no_provider {
            Some(handler) => handler(),
            None => warn!("no injected wallet provider detected"),
        }
    }

    pub(crate) fn on_ready(&self) {
        match &self.ready {
            Some(handler) => handler(),
            None => info!("wallet connection ready"),
        }
    }

    pub(crate) fn on_error(&self, err: &ClientError) {
        match &self.error {
            Some(handler) => handler(err),
            None => error!(%err, "wallet connection failed"),
        }
    }

    pub(crate) fn on_network_changed(&self, new: u64, old: Option<u64>) {
        match &self.network_changed {
            Some(handler) => handler(new, old),
            None => info!(?old, new, "wallet network changed"),
        }
    }

    pub(crate) fn on_account_changed(&self, new: &Account, old: &Account) {
        match &self.account_changed {
            Some(handler) => handler(new, old),
            None => info!(%old, %new, "wallet account changed"),
        }
    }
}

impl fmt::Debug for ConnectionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandlers")
            .field("no_provider", &self.no_provider.is_some())
            .field("ready", &self.ready.is_some())
            .field("error", &self.error.is_some())
            .field("network_changed", &self.network_changed.is_some())
            .field("account_changed", &self.account_changed.is_some())
            .finish()
    }
}

/// Configuration for a wallet connection.
#[derive(Debug)]
pub struct ConnectionConfig {
    pub poll_interval: Duration,
    /// Closed set of acceptable network ids; observing any other id fails
    /// the connection.
    pub allowed_networks: Vec<u64>,
    pub handlers: ConnectionHandlers,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            allowed_networks: DEFAULT_ALLOWED_NETWORKS.to_vec(),
            handlers: ConnectionHandlers::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn allowed_networks(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.allowed_networks = ids.into_iter().collect();
        self
    }

    pub fn on_no_provider(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.handlers.no_provider = Some(Box::new(handler));
        self
    }

    pub fn on_ready(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.handlers.ready = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.handlers.error = Some(Box::new(handler));
        self
    }

    pub fn on_network_changed(
        mut self,
        handler: impl Fn(u64, Option<u64>) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.network_changed = Some(Box::new(handler));
        self
    }

    pub fn on_account_changed(
        mut self,
        handler: impl Fn(&Account, &Account) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.account_changed = Some(Box::new(handler));
        self
    }
}

/// Data half of the configuration as host applications embed it (JSON).
///
/// Unknown keys are rejected eagerly, at parse time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConnectionOptions {
    pub poll_interval_ms: Option<u64>,
    pub allowed_network_ids: Option<Vec<u64>>,
}

impl ConnectionOptions {
    /// Parses options from JSON, mapping unknown keys to a configuration
    /// error.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// Applies the options on top of the defaults.
    pub fn into_config(self) -> ConnectionConfig {
        let mut config = ConnectionConfig::default();
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ids) = self.allowed_network_ids {
            config.allowed_networks = ids;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.allowed_networks, vec![1, 3, 4, 42]);
    }

    #[test]
    fn options_apply_on_top_of_defaults() {
        let options =
            ConnectionOptions::from_json(r#"{"pollIntervalMs": 250, "allowedNetworkIds": [1, 4]}"#)
                .unwrap();
        let config = options.into_config();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.allowed_networks, vec![1, 4]);
    }

    #[test]
    fn unknown_option_key_is_rejected() {
        let err = ConnectionOptions::from_json(r#"{"pollTime": 250}"#).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err:?}");
        assert!(err.to_string().contains("pollTime"));
    }

    #[test]
    fn partial_options_keep_remaining_defaults() {
        let options = ConnectionOptions::from_json(r#"{"allowedNetworkIds": [42]}"#).unwrap();
        let config = options.into_config();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.allowed_networks, vec![42]);
    }
}
