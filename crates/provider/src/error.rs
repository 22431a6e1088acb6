/// Errors reported by a wallet provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying RPC call failed, was rejected by the wallet, or the
    /// transport broke.
    #[error("provider RPC error: {0}")]
    Rpc(String),
    /// The provider answered, but the payload was not what the method
    /// promised.
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
    /// The provider does not implement the requested method.
    #[error("method `{0}` is not supported by this provider")]
    UnsupportedMethod(&'static str),
}

impl ProviderError {
    /// Convenience constructor for RPC failures.
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc(message.into())
    }

    /// Convenience constructor for malformed responses.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}
