//! Client of the deposit indexing (GraphQL) service.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::JackpotError,
    types::{ContractSummary, Deposit},
};

/// Default number of recent deposits requested.
pub const DEFAULT_DEPOSITS_LIMIT: usize = 100;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Usable payload returned by the indexing service.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexData {
    pub summary: Option<ContractSummary>,
    /// Most recent deposits first.
    pub deposits: Vec<Deposit>,
}

#[derive(Clone, Debug)]
pub struct IndexerClient {
    url: Url,
    http: reqwest::Client,
    deposits_limit: usize,
}

impl IndexerClient {
    pub fn new(url: Url) -> Result<Self, JackpotError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            url,
            http,
            deposits_limit: DEFAULT_DEPOSITS_LIMIT,
        })
    }

    /// Sets the number of recent deposits to request (default: 100).
    pub fn with_deposits_limit(mut self, deposits_limit: usize) -> Self {
        self.deposits_limit = deposits_limit;
        self
    }

    /// Queries recent deposits and the contract summary.
    ///
    /// Returns `Ok(None)` when the service answered without usable data,
    /// and [`JackpotError::IndexQueryFailed`] on network or decoding failures.
    pub async fn fetch(&self, contract: Address) -> Result<Option<IndexData>, JackpotError> {
        let query = build_query(contract, self.deposits_limit);
        let res = self
            .http
            .post(self.url.clone())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            warn!(%status, url = %self.url, "Indexer responded without success");
            return Ok(None);
        }
        parse_response(&bytes)
    }
}

/// GraphQL query for the `limit` most recent deposits and the contract summary.
pub fn build_query(contract: Address, limit: usize) -> String {
    format!(
        "{{ newDeposits(first: {limit}, orderBy: blockTimestamp, orderDirection: desc) \
         {{ depositor amount blockTimestamp }} \
         contract(id: \"{}\") {{ totalPool jackpotUsd targetUsd last24hDepositUsd }} }}",
        crate::lower_hex(&contract)
    )
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphData {
    new_deposits: Option<Vec<DepositDto>>,
    contract: Option<SummaryDto>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepositDto {
    depositor: String,
    amount: String,
    block_timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDto {
    total_pool: Option<String>,
    jackpot_usd: Option<String>,
    target_usd: Option<String>,
    last24h_deposit_usd: Option<String>,
}

impl DepositDto {
    fn parse(&self) -> Option<Deposit> {
        let depositor: Address = self.depositor.trim().parse().ok()?;
        let amount: U256 = self.amount.trim().parse().ok()?;
        let timestamp: u64 = self.block_timestamp.trim().parse().ok()?;
        Some(Deposit::from_wei(depositor, amount, timestamp))
    }
}

impl SummaryDto {
    fn parse(&self) -> Result<ContractSummary, JackpotError> {
        let field = |name: &str, value: &Option<String>| -> Result<U256, JackpotError> {
            match value {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| JackpotError::IndexQueryFailed(format!("invalid {name}: {raw}"))),
                None => Ok(U256::ZERO),
            }
        };
        Ok(ContractSummary {
            total_pool: field("totalPool", &self.total_pool)?,
            jackpot_usd: field("jackpotUsd", &self.jackpot_usd)?,
            target_usd: field("targetUsd", &self.target_usd)?,
            last24h_usd: field("last24hDepositUsd", &self.last24h_deposit_usd)?,
        })
    }
}

/// Classifies an indexer response body.
pub fn parse_response(body: &[u8]) -> Result<Option<IndexData>, JackpotError> {
    let response: GraphResponse = serde_json::from_slice(body)
        .map_err(|err| JackpotError::IndexQueryFailed(format!("malformed response: {err}")))?;

    for error in &response.errors {
        warn!(message = %error.message, "Indexer query error");
    }

    let Some(data) = response.data else {
        return Ok(None);
    };

    let summary = data.contract.as_ref().map(SummaryDto::parse).transpose()?;
    let deposits: Vec<Deposit> = data
        .new_deposits
        .iter()
        .flatten()
        .filter_map(|dto| {
            let deposit = dto.parse();
            if deposit.is_none() {
                debug!(?dto, "Skipping malformed deposit record");
            }
            deposit
        })
        .collect();

    if summary.is_none() && deposits.is_empty() {
        return Ok(None);
    }
    Ok(Some(IndexData { summary, deposits }))
}
