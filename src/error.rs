use std::fmt::Display;

use alloy::{contract, primitives::Address, providers::PendingTransactionError, sol_types, transports};

/// Error returned by any of the jackpot data tiers, the RPC provider
/// or the transaction path.
///
/// Only [`JackpotError::ContractNotFound`] aborts a load; every other variant
/// makes the loader degrade to a weaker data source or a visible warning.
#[derive(Clone, Debug, thiserror::Error)]
pub enum JackpotError {
    #[error("no RPC endpoint available, {0} tried")]
    EndpointUnavailable(usize),

    #[error("no contract code at {0}")]
    ContractNotFound(Address),

    #[error("index query failed: {0}")]
    IndexQueryFailed(String),

    #[error("cached snapshot is stale")]
    CacheStale,

    #[error("no cached snapshot for the active contract")]
    CacheAbsent,

    #[error("partial read failure: {0}")]
    PartialReadFailure(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("session has no signer")]
    NoSigner,

    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transaction ran out of gas")]
    OutOfGas,

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

impl JackpotError {
    /// Whether the error must stop the whole load instead of
    /// falling through to the next tier.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContractNotFound(_))
    }
}

impl From<contract::Error> for JackpotError {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::UnknownFunction(_) => Self::Fatal(value.to_string()),
            contract::Error::UnknownSelector(_) => Self::Fatal(value.to_string()),
            contract::Error::NotADeploymentTransaction => Self::Fatal(value.to_string()),
            contract::Error::ContractNotDeployed => Self::Fatal(value.to_string()),
            contract::Error::ZeroData(_, _) => Self::Fatal(value.to_string()),
            contract::Error::AbiError(_) => Self::Fatal(value.to_string()),
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::PendingTransactionError(err) => err.into(),
        }
    }
}

impl From<PendingTransactionError> for JackpotError {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::FailedToRegister => Self::Fatal(value.to_string()),
            PendingTransactionError::TransportError(rpc_err) => Self::from(rpc_err),
            PendingTransactionError::Recv(_) => Self::Transport(value.to_string()),
            PendingTransactionError::TxWatcher(err) => match err {
                alloy::providers::WatchTxError::Timeout => Self::Timeout,
            },
        }
    }
}

impl<E: Display> From<transports::RpcError<E>> for JackpotError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32603) && (msg.contains("gas") || msg.contains("oog")) {
                    Self::OutOfGas
                } else if (resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found"))
                {
                    Self::InvalidRequest(msg)
                } else if resp.code == 3 || msg.contains("reverted") {
                    Self::Reverted(resp.message.to_string())
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<sol_types::Error> for JackpotError {
    fn from(value: sol_types::Error) -> Self {
        Self::Fatal(value.to_string())
    }
}

impl From<reqwest::Error> for JackpotError {
    fn from(value: reqwest::Error) -> Self {
        Self::IndexQueryFailed(value.to_string())
    }
}

impl From<serde_json::Error> for JackpotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Cache(value.to_string())
    }
}

impl From<std::io::Error> for JackpotError {
    fn from(value: std::io::Error) -> Self {
        Self::Cache(value.to_string())
    }
}
