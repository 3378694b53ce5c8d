//! Tier resolution, free of I/O.
//!
//! [`resolve`] looks at what has been fetched so far and either names the
//! next source to query or produces the final [`Outcome`]. The driver in
//! [`super::JackpotLoader`] only performs the requested I/O and feeds the
//! result back.

use std::time::Duration;

use alloy::primitives::Address;

use crate::{
    cache::{CacheEnvelope, FRESHNESS_THRESHOLD},
    error::JackpotError,
    indexer::IndexData,
    leaderboard::{self, LeaderboardEntry},
    reader::DirectRead,
    render::Tier,
    types::{ContractSnapshot, Deposit, TimeFilter},
};

/// Loader tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Maximum cache age usable without refresh (default: 5 minutes).
    pub freshness: Duration,
    /// Time window of the rendered leaderboard.
    pub filter: TimeFilter,
    /// Whether a cache render is followed by a direct tier refresh.
    pub background_refresh: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            freshness: FRESHNESS_THRESHOLD,
            filter: TimeFilter::All,
            background_refresh: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Index, then cache, then direct reads.
    Full,
    /// Direct reads only. The cache is still consulted for deposits to
    /// carry over, never rendered from.
    DirectOnly,
}

/// Everything known about the current load.
#[derive(Debug)]
pub struct TierInputs {
    pub contract: Address,
    /// Wall-clock time of the load, unix milliseconds.
    pub now_ms: u64,
    pub mode: LoadMode,
    pub options: LoaderOptions,
    pub verification: Result<(), JackpotError>,
    pub index: Option<Result<Option<IndexData>, JackpotError>>,
    pub cache: Option<Option<CacheEnvelope>>,
    pub direct: Option<Result<DirectRead, JackpotError>>,
}

impl TierInputs {
    pub fn new(
        contract: Address,
        now_ms: u64,
        mode: LoadMode,
        options: LoaderOptions,
        verification: Result<(), JackpotError>,
    ) -> Self {
        Self {
            contract,
            now_ms,
            mode,
            options,
            verification,
            index: None,
            cache: None,
            direct: None,
        }
    }

    fn now_secs(&self) -> u64 {
        self.now_ms / 1000
    }
}

/// Values to paint. `None` leaves the corresponding display untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderData {
    pub snapshot: Option<ContractSnapshot>,
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

#[derive(Debug)]
pub enum Outcome {
    Rendered {
        tier: Tier,
        data: RenderData,
        /// Envelope to persist, if the tier produced new state.
        persist: Option<CacheEnvelope>,
        warnings: Vec<JackpotError>,
    },
    Failed(JackpotError),
}

#[derive(Debug)]
pub enum Step {
    FetchIndex,
    ReadCache,
    ReadDirect,
    Done(Outcome),
}

/// Decides the next step of a load.
pub fn resolve(inputs: &TierInputs) -> Step {
    let mut warnings = vec![];

    match &inputs.verification {
        Err(err) if err.is_fatal() => return Step::Done(Outcome::Failed(err.clone())),
        Err(err) => warnings.push(err.clone()),
        Ok(()) => {}
    }

    if inputs.mode == LoadMode::Full {
        match &inputs.index {
            None => return Step::FetchIndex,
            Some(Ok(Some(data))) => return Step::Done(from_index(inputs, data, warnings)),
            Some(Ok(None)) => warnings.push(JackpotError::IndexQueryFailed(
                "no usable data returned".to_string(),
            )),
            Some(Err(err)) => warnings.push(err.clone()),
        }
    }

    let Some(cached) = &inputs.cache else {
        return Step::ReadCache;
    };

    if inputs.mode == LoadMode::Full {
        match cached {
            Some(envelope) => {
                match envelope.validate(inputs.contract, inputs.now_ms, inputs.options.freshness) {
                    Ok(()) => return Step::Done(from_cache(inputs, envelope, warnings)),
                    Err(err) => warnings.push(err),
                }
            }
            None => warnings.push(JackpotError::CacheAbsent),
        }
    }

    match &inputs.direct {
        None => Step::ReadDirect,
        Some(Ok(read)) => {
            let carried = cached.as_ref().filter(|envelope| {
                envelope
                    .validate(inputs.contract, inputs.now_ms, inputs.options.freshness)
                    .is_ok()
            });
            Step::Done(from_direct(inputs, read, carried, warnings))
        }
        Some(Err(err)) => Step::Done(Outcome::Failed(err.clone())),
    }
}

fn from_index(inputs: &TierInputs, data: &IndexData, warnings: Vec<JackpotError>) -> Outcome {
    let snapshot = data.summary.as_ref().map(ContractSnapshot::from);
    let leaderboard = leaderboard::aggregate(&data.deposits, inputs.options.filter, inputs.now_secs());
    Outcome::Rendered {
        tier: Tier::Index,
        data: RenderData {
            snapshot: snapshot.clone(),
            leaderboard: Some(leaderboard),
        },
        persist: Some(envelope(inputs, snapshot, &data.deposits, inputs.now_ms)),
        warnings,
    }
}

fn from_cache(inputs: &TierInputs, cached: &CacheEnvelope, warnings: Vec<JackpotError>) -> Outcome {
    let leaderboard = if !cached.deposits.is_empty() {
        Some(leaderboard::aggregate(&cached.deposits, inputs.options.filter, inputs.now_secs()))
    } else if !cached.leaderboard.is_empty() {
        Some(cached.leaderboard.clone())
    } else {
        None
    };
    Outcome::Rendered {
        tier: Tier::Cache,
        data: RenderData {
            snapshot: cached.snapshot.clone(),
            leaderboard,
        },
        persist: None,
        warnings,
    }
}

/// Direct reads carry no deposits: only those of a fresh same-contract
/// envelope are kept, together with its capture time so they never outlive
/// the freshness threshold.
fn from_direct(
    inputs: &TierInputs,
    read: &DirectRead,
    carried: Option<&CacheEnvelope>,
    mut warnings: Vec<JackpotError>,
) -> Outcome {
    warnings.extend(read.failures.iter().cloned());
    let snapshot = read.snapshot();
    let (deposits, captured_at_ms) = match carried {
        Some(envelope) if !envelope.deposits.is_empty() => {
            (envelope.deposits.as_slice(), envelope.captured_at_ms)
        }
        _ => (&[][..], inputs.now_ms),
    };
    let leaderboard = (!deposits.is_empty())
        .then(|| leaderboard::aggregate(deposits, inputs.options.filter, inputs.now_secs()));
    Outcome::Rendered {
        tier: Tier::Direct,
        data: RenderData {
            snapshot: Some(snapshot.clone()),
            leaderboard,
        },
        persist: Some(envelope(inputs, Some(snapshot), deposits, captured_at_ms)),
        warnings,
    }
}

fn envelope(
    inputs: &TierInputs,
    snapshot: Option<ContractSnapshot>,
    deposits: &[Deposit],
    captured_at_ms: u64,
) -> CacheEnvelope {
    CacheEnvelope {
        contract: inputs.contract,
        snapshot,
        leaderboard: leaderboard::aggregate(deposits, TimeFilter::All, captured_at_ms / 1000),
        deposits: deposits.to_vec(),
        captured_at_ms,
    }
}
