//! In-memory testing doubles and fixtures.
//!
//! [`FakeIndex`] and [`FakeChain`] stand in for the indexing service and
//! the RPC endpoints with scripted responses and call counters, while
//! [`RecordingRenderer`] keeps everything the loader painted.
//!
//! [`scenario_deployment`] and [`scenario_index_data`] describe a deployed
//! jackpot with a single indexed deposit.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::primitives::{Address, U256, address};
use url::Url;

use crate::{
    Deployment,
    error::JackpotError,
    indexer::IndexData,
    leaderboard::LeaderboardEntry,
    loader::{ChainSource, IndexSource},
    reader::DirectRead,
    render::{Renderer, SnapshotView, Status},
    types::{ContractSummary, Deposit},
};

pub const SCENARIO_CONTRACT: Address = address!("0x9c216d1ab3e0407b3d6f1d5e9effe6d01c326ab7");
pub const SCENARIO_DEPOSITOR: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

pub fn scenario_deployment() -> Deployment {
    Deployment::new(
        31337,
        SCENARIO_CONTRACT,
        vec![
            Url::parse("http://127.0.0.1:1").unwrap(),
            Url::parse("http://127.0.0.1:2").unwrap(),
        ],
        Url::parse("http://127.0.0.1:3/graphql").unwrap(),
    )
}

/// 1 ETH pool worth $500 out of a $2,200,000 target, one 0.5 ETH deposit.
pub fn scenario_index_data(deposited_at: u64) -> IndexData {
    IndexData {
        summary: Some(ContractSummary {
            total_pool: U256::from(WEI_PER_ETH),
            jackpot_usd: U256::from(50_000_000_000u64),
            target_usd: U256::from(220_000_000_000_000u64),
            last24h_usd: U256::ZERO,
        }),
        deposits: vec![Deposit::from_wei(
            SCENARIO_DEPOSITOR,
            U256::from(WEI_PER_ETH / 2),
            deposited_at,
        )],
    }
}

/// 2 ETH pool at half of its target.
pub fn scenario_direct_read() -> DirectRead {
    DirectRead {
        total_pool: U256::from(2 * WEI_PER_ETH),
        jackpot_usd: Some(U256::from(100_000_000u64)),
        target_usd: Some(U256::from(200_000_000u64)),
        last24h_usd: Some(U256::ZERO),
        failures: vec![],
    }
}

/// Indexer answering with a scripted response.
#[derive(Debug)]
pub struct FakeIndex {
    response: Mutex<Result<Option<IndexData>, JackpotError>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeIndex {
    pub fn new(response: Result<Option<IndexData>, JackpotError>) -> Self {
        Self {
            response: Mutex::new(response),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self::new(Err(JackpotError::IndexQueryFailed("connection refused".to_string())))
    }

    /// Answers every query after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(&self, response: Result<Option<IndexData>, JackpotError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IndexSource for FakeIndex {
    async fn fetch(&self, _contract: Address) -> Result<Option<IndexData>, JackpotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.lock().unwrap().clone()
    }
}

/// Chain with scripted verification and direct read results.
#[derive(Debug)]
pub struct FakeChain {
    verification: Mutex<Result<(), JackpotError>>,
    read: Mutex<Result<DirectRead, JackpotError>>,
    verify_calls: AtomicUsize,
    read_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new(verification: Result<(), JackpotError>, read: Result<DirectRead, JackpotError>) -> Self {
        Self {
            verification: Mutex::new(verification),
            read: Mutex::new(read),
            verify_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
        }
    }

    /// Contract deployed, every read succeeds.
    pub fn live(read: DirectRead) -> Self {
        Self::new(Ok(()), Ok(read))
    }

    /// No endpoint answers.
    pub fn down(endpoints: usize) -> Self {
        Self::new(
            Err(JackpotError::EndpointUnavailable(endpoints)),
            Err(JackpotError::EndpointUnavailable(endpoints)),
        )
    }

    /// Endpoints answer but no code is deployed at the contract.
    pub fn without_code(contract: Address) -> Self {
        Self::new(Err(JackpotError::ContractNotFound(contract)), Ok(DirectRead::default()))
    }

    pub fn set_read(&self, read: Result<DirectRead, JackpotError>) {
        *self.read.lock().unwrap() = read;
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }
}

impl ChainSource for FakeChain {
    async fn verify(&self, _contract: Address) -> Result<(), JackpotError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verification.lock().unwrap().clone()
    }

    async fn read(&self, _contract: Address) -> Result<DirectRead, JackpotError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.read.lock().unwrap().clone()
    }
}

/// Renderer keeping every painted value in order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    snapshots: Mutex<Vec<SnapshotView>>,
    leaderboards: Mutex<Vec<Vec<LeaderboardEntry>>>,
    statuses: Mutex<Vec<Status>>,
}

impl RecordingRenderer {
    pub fn snapshots(&self) -> Vec<SnapshotView> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn leaderboards(&self) -> Vec<Vec<LeaderboardEntry>> {
        self.leaderboards.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<Status> {
        self.statuses.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn snapshot(&self, view: &SnapshotView) {
        self.snapshots.lock().unwrap().push(view.clone());
    }

    fn leaderboard(&self, entries: &[LeaderboardEntry]) {
        self.leaderboards.lock().unwrap().push(entries.to_vec());
    }

    fn status(&self, status: &Status) {
        self.statuses.lock().unwrap().push(status.clone());
    }
}
