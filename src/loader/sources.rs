use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use super::{ChainSource, IndexSource};
use crate::{
    endpoint,
    error::JackpotError,
    indexer::{IndexData, IndexerClient},
    reader::{ContractReader, DirectRead},
};

impl IndexSource for IndexerClient {
    async fn fetch(&self, contract: Address) -> Result<Option<IndexData>, JackpotError> {
        IndexerClient::fetch(self, contract).await
    }
}

/// Chain access over an ordered list of RPC endpoints.
///
/// Every call selects a live endpoint anew.
#[derive(Clone, Debug)]
pub struct RpcChain {
    endpoints: Vec<Url>,
    probe_timeout: Duration,
}

impl RpcChain {
    pub fn new(endpoints: Vec<Url>) -> Self {
        Self {
            endpoints,
            probe_timeout: endpoint::DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    async fn reader(&self, contract: Address) -> Result<ContractReader<alloy::providers::DynProvider>, JackpotError> {
        let provider = endpoint::connect_http(&self.endpoints, self.probe_timeout).await?;
        Ok(ContractReader::new(contract, provider))
    }
}

impl ChainSource for RpcChain {
    async fn verify(&self, contract: Address) -> Result<(), JackpotError> {
        if self.reader(contract).await?.has_code().await? {
            Ok(())
        } else {
            Err(JackpotError::ContractNotFound(contract))
        }
    }

    async fn read(&self, contract: Address) -> Result<DirectRead, JackpotError> {
        self.reader(contract).await?.read().await
    }
}
