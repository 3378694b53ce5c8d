//! Jackpot lottery client SDK.
//!
//! # Overview
//!
//! Data core of a pooled-deposit lottery client: reads the jackpot state
//! from the indexing service, the local cache or the contract itself,
//! ranks depositors, and sends the lottery transactions.
//!
//! Use [`loader::JackpotLoader`] to load and render the jackpot state once,
//! and [`refresh::start`] to keep it up to date.
//!
//! Use [`session::Session`] to attach a signer and send deposits, draw
//! requests and withdrawals.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Chosen RPC endpoint is not remembered between calls, every call probes
//!   the configured endpoints in order.
//!
//! * Indexed deposits are fetched as a single page of the most recent ones.
//!
//! # Testing
//!
//! [`testing`] module provides in-memory doubles of the indexer, the chain
//! and the renderer.

pub mod abi;
pub mod cache;
pub mod endpoint;
pub mod error;
pub mod indexer;
pub mod leaderboard;
pub mod loader;
pub mod num;
pub mod reader;
pub mod refresh;
pub mod render;
pub mod session;
pub mod testing;
pub mod types;

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::Address;
use url::Url;

#[derive(Clone, Debug)]
/// Chain and contract the client is operating on.
pub struct Deployment {
    chain_id: u64,
    contract: Address,
    rpc_endpoints: Vec<Url>,
    indexer_url: Url,
}

impl Deployment {
    pub fn new(chain_id: u64, contract: Address, rpc_endpoints: Vec<Url>, indexer_url: Url) -> Self {
        Self {
            chain_id,
            contract,
            rpc_endpoints,
            indexer_url,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// RPC endpoints in order of preference.
    pub fn rpc_endpoints(&self) -> &[Url] {
        &self.rpc_endpoints
    }

    pub fn indexer_url(&self) -> &Url {
        &self.indexer_url
    }
}

/// Lowercase `0x`-prefixed hex form of an address, as keyed by the indexer.
pub fn lower_hex(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// Wall-clock time, unix milliseconds.
pub(crate) fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
