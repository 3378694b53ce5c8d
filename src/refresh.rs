//! Periodic reload of the jackpot state.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

use crate::{
    cache::CacheStore,
    loader::{ChainSource, IndexSource, JackpotLoader},
    render::Renderer,
    session::Session,
};

/// Default period between two loads.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Running refresh timer. Dropping the handle does not stop it.
#[derive(Debug)]
pub struct RefreshHandle {
    timer: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the timer. Loads already in flight run to completion.
    pub fn stop(&self) {
        self.timer.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }
}

/// Starts loading the jackpot state every `every`, first tick immediately.
///
/// Each tick spawns an independent load, so a slow load never delays the
/// next one and overlapping loads are possible.
pub fn start<I, C, S, R>(
    loader: Arc<JackpotLoader<I, C, S, R>>,
    session: Arc<Session>,
    every: Duration,
) -> RefreshHandle
where
    I: IndexSource + 'static,
    C: ChainSource + 'static,
    S: CacheStore + 'static,
    R: Renderer + 'static,
{
    info!(contract = %session.contract(), period = ?every, "Starting jackpot refresh");
    let timer = tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let loader = Arc::clone(&loader);
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                if let Err(err) = loader.load(&session).await {
                    debug!(%err, "Scheduled load failed");
                }
            });
        }
    });
    RefreshHandle { timer }
}
