//! RPC endpoint selection.
//!
//! Endpoints are tried in the configured order and the first one answering
//! a liveness call wins. There is no retry beyond the single pass and the
//! chosen endpoint is not remembered, so each call site may end up on a
//! different node.

use std::{future::Future, time::Duration};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
};
use itertools::Itertools;
use tracing::{debug, warn};
use url::Url;

use crate::error::JackpotError;

/// Default bound on a single liveness probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the first client produced by `connect` for the endpoints
/// in order, or [`JackpotError::EndpointUnavailable`] when none succeeds.
pub async fn first_live<T, C, Fut>(endpoints: &[Url], mut connect: C) -> Result<T, JackpotError>
where
    C: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<T, JackpotError>>,
{
    for url in endpoints {
        match connect(url.clone()).await {
            Ok(client) => {
                debug!(%url, "RPC endpoint selected");
                return Ok(client);
            }
            Err(err) => warn!(%url, %err, "RPC endpoint unavailable"),
        }
    }
    warn!(
        endpoints = %endpoints.iter().join(", "),
        "All RPC endpoints failed"
    );
    Err(JackpotError::EndpointUnavailable(endpoints.len()))
}

/// Read-only provider for the first live endpoint.
pub async fn connect_http(endpoints: &[Url], probe_timeout: Duration) -> Result<DynProvider, JackpotError> {
    first_live(endpoints, |url| async move {
        let provider = DynProvider::new(ProviderBuilder::new().connect_client(RpcClient::new_http(url)));
        probe(&provider, probe_timeout).await?;
        Ok(provider)
    })
    .await
}

/// Wallet-filled provider for the first live endpoint.
pub async fn connect_signer(
    endpoints: &[Url],
    wallet: &EthereumWallet,
    probe_timeout: Duration,
) -> Result<DynProvider, JackpotError> {
    first_live(endpoints, |url| {
        let wallet = wallet.clone();
        async move {
            let provider = DynProvider::new(
                ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_client(RpcClient::new_http(url)),
            );
            probe(&provider, probe_timeout).await?;
            Ok(provider)
        }
    })
    .await
}

/// Liveness call: current block height.
async fn probe<P: Provider>(provider: &P, probe_timeout: Duration) -> Result<u64, JackpotError> {
    match tokio::time::timeout(probe_timeout, provider.get_block_number()).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(JackpotError::Timeout),
    }
}
