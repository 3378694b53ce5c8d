//! Local cache of the last rendered jackpot state.
//!
//! A single [`CacheEnvelope`] is persisted as JSON. It mirrors the output of
//! the last successful tier and is never treated as a source of truth: it is
//! only used while younger than the freshness threshold and only for the
//! contract it was captured for. Concurrent writers are not coordinated,
//! the last write wins.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::JackpotError,
    leaderboard::LeaderboardEntry,
    num,
    types::{ContractSnapshot, Deposit},
};

/// Maximum age of a cache envelope usable without refresh.
pub const FRESHNESS_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Default location of the cache file.
pub const DEFAULT_CACHE_PATH: &str = "jackpot_cache.json";

/// Persisted mirror of the last rendered state.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEnvelope {
    pub contract: Address,
    pub snapshot: Option<ContractSnapshot>,
    /// Top leaderboard entries over all deposits.
    pub leaderboard: Vec<LeaderboardEntry>,
    pub deposits: Vec<Deposit>,
    /// Capture time, unix milliseconds.
    pub captured_at_ms: u64,
}

impl CacheEnvelope {
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.captured_at_ms))
    }

    /// Checks the envelope is usable for `contract` at `now_ms`.
    pub fn validate(&self, contract: Address, now_ms: u64, freshness: Duration) -> Result<(), JackpotError> {
        if self.contract != contract {
            return Err(JackpotError::CacheAbsent);
        }
        if self.age(now_ms) >= freshness {
            return Err(JackpotError::CacheStale);
        }
        Ok(())
    }
}

/// Storage of the single cache envelope.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Result<Option<CacheEnvelope>, JackpotError>;

    fn store(&self, envelope: &CacheEnvelope) -> Result<(), JackpotError>;
}

/// JSON file backed cache.
#[derive(Clone, Debug)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PATH)
    }
}

impl CacheStore for FileCache {
    fn load(&self) -> Result<Option<CacheEnvelope>, JackpotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        decode(&raw).map(Some)
    }

    fn store(&self, envelope: &CacheEnvelope) -> Result<(), JackpotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode(envelope)?)?;
        debug!(path = %self.path.display(), "Cache envelope written");
        Ok(())
    }
}

/// In-process cache keeping the serialized envelope.
#[derive(Debug, Default)]
pub struct MemoryCache {
    raw: Mutex<Option<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn load(&self) -> Result<Option<CacheEnvelope>, JackpotError> {
        let raw = self
            .raw
            .lock()
            .map_err(|_| JackpotError::Cache("poisoned lock".to_string()))?;
        raw.as_deref().map(decode).transpose()
    }

    fn store(&self, envelope: &CacheEnvelope) -> Result<(), JackpotError> {
        let encoded = encode(envelope)?;
        *self
            .raw
            .lock()
            .map_err(|_| JackpotError::Cache("poisoned lock".to_string()))? = Some(encoded);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEnvelope {
    contract_address: String,
    #[serde(default)]
    snapshot: Option<ContractSnapshot>,
    #[serde(default)]
    leaderboard: Vec<StoredEntry>,
    #[serde(default)]
    deposits: Vec<StoredDeposit>,
    captured_at_ms: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    address: String,
    amount_wei: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDeposit {
    depositor: String,
    amount_wei: String,
    timestamp: u64,
}

fn encode(envelope: &CacheEnvelope) -> Result<String, JackpotError> {
    let stored = StoredEnvelope {
        contract_address: crate::lower_hex(&envelope.contract),
        snapshot: envelope.snapshot.clone(),
        leaderboard: envelope
            .leaderboard
            .iter()
            .map(|e| StoredEntry {
                address: e.address_lower(),
                amount_wei: e.amount_wei().to_string(),
            })
            .collect(),
        deposits: envelope
            .deposits
            .iter()
            .map(|d| StoredDeposit {
                depositor: crate::lower_hex(&d.depositor()),
                amount_wei: d.amount_wei().to_string(),
                timestamp: d.timestamp(),
            })
            .collect(),
        captured_at_ms: envelope.captured_at_ms,
    };
    Ok(serde_json::to_string(&stored)?)
}

fn decode(raw: &str) -> Result<CacheEnvelope, JackpotError> {
    let stored: StoredEnvelope = serde_json::from_str(raw)?;
    let leaderboard = stored
        .leaderboard
        .iter()
        .map(|e| {
            Ok(LeaderboardEntry::new(
                parse_address(&e.address)?,
                num::Converter::eth().from_unsigned(parse_wei(&e.amount_wei)?),
            ))
        })
        .collect::<Result<Vec<_>, JackpotError>>()?;
    let deposits = stored
        .deposits
        .iter()
        .map(|d| {
            Ok(Deposit::from_wei(
                parse_address(&d.depositor)?,
                parse_wei(&d.amount_wei)?,
                d.timestamp,
            ))
        })
        .collect::<Result<Vec<_>, JackpotError>>()?;
    Ok(CacheEnvelope {
        contract: parse_address(&stored.contract_address)?,
        snapshot: stored.snapshot,
        leaderboard,
        deposits,
        captured_at_ms: stored.captured_at_ms,
    })
}

fn parse_address(raw: &str) -> Result<Address, JackpotError> {
    raw.parse()
        .map_err(|_| JackpotError::Cache(format!("invalid address: {raw}")))
}

fn parse_wei(raw: &str) -> Result<U256, JackpotError> {
    raw.parse()
        .map_err(|_| JackpotError::Cache(format!("invalid amount: {raw}")))
}
