//! Jackpot state loader.
//!
//! A load always starts by verifying that the configured contract has code
//! on-chain, then walks the data tiers:
//!
//! 1. the indexing service,
//! 2. the local cache, when the indexer failed or returned nothing usable
//!    and the cached envelope is fresh,
//! 3. direct contract reads through the first live RPC endpoint.
//!
//! The decision logic lives in [`tier::resolve`] and is free of I/O; the
//! [`JackpotLoader`] only performs the I/O it asks for, paints the result
//! and persists the next cache envelope.
//!
//! Loads are re-entrant and not coordinated with each other. Overlapping
//! loads race on the renderer and the cache, the last one to finish wins.

mod sources;
pub mod tier;


use std::future::Future;

use alloy::primitives::Address;
use tracing::{debug, info, warn};

pub use sources::RpcChain;
pub use tier::{LoadMode, LoaderOptions, Outcome, RenderData, Step, TierInputs};

use crate::{
    cache::{CacheStore, FileCache},
    error::JackpotError,
    indexer::{IndexData, IndexerClient},
    reader::DirectRead,
    render::{Renderer, SnapshotView, Status, Tier},
    session::Session,
};

/// Source of indexed deposits and contract summary.
pub trait IndexSource: Send + Sync {
    fn fetch(
        &self,
        contract: Address,
    ) -> impl Future<Output = Result<Option<IndexData>, JackpotError>> + Send;
}

/// On-chain access used for verification and the direct tier.
pub trait ChainSource: Send + Sync {
    /// Fails with [`JackpotError::ContractNotFound`] when no code is deployed
    /// at `contract`.
    fn verify(&self, contract: Address) -> impl Future<Output = Result<(), JackpotError>> + Send;

    fn read(&self, contract: Address) -> impl Future<Output = Result<DirectRead, JackpotError>> + Send;
}

/// Loads jackpot state through the data tiers and paints it.
pub struct JackpotLoader<I, C, S, R> {
    index: I,
    chain: C,
    cache: S,
    renderer: R,
    options: LoaderOptions,
}

impl<R: Renderer> JackpotLoader<IndexerClient, RpcChain, FileCache, R> {
    /// Loader over the session deployment's indexer and RPC endpoints,
    /// caching into `cache`.
    pub fn for_session(session: &Session, cache: FileCache, renderer: R) -> Result<Self, JackpotError> {
        let deployment = session.deployment();
        Ok(Self::new(
            IndexerClient::new(deployment.indexer_url().clone())?,
            RpcChain::new(deployment.rpc_endpoints().to_vec()).with_probe_timeout(session.probe_timeout()),
            cache,
            renderer,
        ))
    }
}

impl<I, C, S, R> JackpotLoader<I, C, S, R>
where
    I: IndexSource,
    C: ChainSource,
    S: CacheStore,
    R: Renderer,
{
    pub fn new(index: I, chain: C, cache: S, renderer: R) -> Self {
        Self {
            index,
            chain,
            cache,
            renderer,
            options: LoaderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Loads and renders the current jackpot state.
    ///
    /// Returns the tier the values were rendered from. On error the status
    /// area shows the failure and previously rendered values are kept.
    ///
    /// A render from cache is followed by a direct refresh when enabled. Its
    /// failure is reported as a warning of the cache render.
    pub async fn load(&self, session: &Session) -> Result<Tier, JackpotError> {
        let contract = session.contract();
        self.renderer.status(&Status::Loading);

        let verification = self.chain.verify(contract).await;
        let outcome = self.resolve(contract, LoadMode::Full, verification).await;
        let cache_warnings = match &outcome {
            Outcome::Rendered {
                tier: Tier::Cache,
                warnings,
                ..
            } => Some(warnings.clone()),
            _ => None,
        };
        let tier = self.apply(contract, outcome)?;

        if let Some(mut warnings) = cache_warnings.filter(|_| self.options.background_refresh) {
            // Verification already passed or was inconclusive, the direct
            // read surfaces any outage.
            match self.resolve(contract, LoadMode::DirectOnly, Ok(())).await {
                outcome @ Outcome::Rendered { .. } => {
                    self.apply(contract, outcome)?;
                }
                Outcome::Failed(err) => {
                    warn!(%contract, %err, "Direct refresh after cache render failed");
                    warnings.push(err);
                    self.renderer.status(&Status::Rendered {
                        tier: Tier::Cache,
                        warnings,
                    });
                }
            }
        }
        Ok(tier)
    }

    /// Loads and renders from direct contract reads only.
    pub async fn load_direct(&self, session: &Session) -> Result<Tier, JackpotError> {
        let contract = session.contract();
        self.renderer.status(&Status::Loading);

        let verification = self.chain.verify(contract).await;
        let outcome = self.resolve(contract, LoadMode::DirectOnly, verification).await;
        self.apply(contract, outcome)
    }

    async fn resolve(
        &self,
        contract: Address,
        mode: LoadMode,
        verification: Result<(), JackpotError>,
    ) -> Outcome {
        let mut inputs = TierInputs::new(contract, crate::unix_now_ms(), mode, self.options, verification);

        loop {
            match tier::resolve(&inputs) {
                Step::FetchIndex => {
                    inputs.index = Some(self.index.fetch(contract).await);
                }
                Step::ReadCache => {
                    let cached = self.cache.load().unwrap_or_else(|err| {
                        warn!(%err, "Unable to read cache envelope");
                        None
                    });
                    inputs.cache = Some(cached);
                }
                Step::ReadDirect => {
                    inputs.direct = Some(self.chain.read(contract).await);
                }
                Step::Done(outcome) => return outcome,
            }
        }
    }

    fn apply(&self, contract: Address, outcome: Outcome) -> Result<Tier, JackpotError> {
        match outcome {
            Outcome::Rendered {
                tier,
                data,
                persist,
                warnings,
            } => {
                if let Some(snapshot) = &data.snapshot {
                    self.renderer.snapshot(&SnapshotView::from(snapshot));
                }
                if let Some(leaderboard) = &data.leaderboard {
                    self.renderer.leaderboard(leaderboard);
                }
                for warning in &warnings {
                    debug!(%contract, %warning, "Tier fallback");
                }
                info!(
                    %contract,
                    %tier,
                    warnings = warnings.len(),
                    "Jackpot state rendered"
                );
                self.renderer.status(&Status::Rendered { tier, warnings });

                if let Some(envelope) = persist {
                    if let Err(err) = self.cache.store(&envelope) {
                        warn!(%err, "Unable to persist cache envelope");
                    }
                }
                Ok(tier)
            }
            Outcome::Failed(err) => {
                warn!(%contract, %err, "Jackpot state load failed");
                self.renderer.status(&Status::Failed(err.clone()));
                Err(err)
            }
        }
    }
}
