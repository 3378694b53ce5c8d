//! Display contract between the loader and the UI layer.
//!
//! The loader never paints anything itself; it pushes display-ready values
//! into a [`Renderer`]. Renderers only ever see a [`SnapshotView`], whose
//! completion percentage is already clamped to `[0, 100]`.

use std::fmt;

use crate::{
    error::JackpotError,
    leaderboard::LeaderboardEntry,
    num,
    types::ContractSnapshot,
};

/// Data source the rendered values came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Index,
    Cache,
    Direct,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Index => write!(f, "indexer"),
            Tier::Cache => write!(f, "cache"),
            Tier::Direct => write!(f, "contract"),
        }
    }
}

/// Status area message.
#[derive(Clone, Debug)]
pub enum Status {
    Loading,
    /// Values rendered from `tier`, with non-fatal issues met on the way.
    Rendered { tier: Tier, warnings: Vec<JackpotError> },
    /// Nothing could be loaded; previously rendered values stay on screen.
    Failed(JackpotError),
}

impl Status {
    /// Short annotated message for the status area.
    pub fn message(&self) -> String {
        match self {
            Status::Loading => "Loading jackpot…".to_string(),
            Status::Rendered { tier, warnings } if warnings.is_empty() => {
                format!("Live data from {tier}")
            }
            Status::Rendered { tier, warnings } => {
                format!("Data from {tier} ({} warning(s): {})", warnings.len(), warnings[0])
            }
            Status::Failed(err) => format!("Unable to load jackpot: {err}"),
        }
    }
}

/// Display-ready jackpot figures.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotView {
    pub total_pool_eth: String,
    pub jackpot_usd: String,
    pub target_usd: String,
    pub last24h_usd: String,
    /// Completion percentage clamped to `[0, 100]`.
    pub progress_percent: f64,
}

impl From<&ContractSnapshot> for SnapshotView {
    fn from(snapshot: &ContractSnapshot) -> Self {
        Self {
            total_pool_eth: snapshot.total_pool_eth.clone(),
            jackpot_usd: snapshot.jackpot_usd_formatted.clone(),
            target_usd: snapshot.target_usd_formatted.clone(),
            last24h_usd: snapshot.last24h_usd_formatted.clone(),
            progress_percent: num::clamp_percent(snapshot.percent_complete),
        }
    }
}

/// Sink of display values, implemented by the UI layer.
///
/// Shared between overlapping loads, so implementations synchronize
/// internally.
pub trait Renderer: Send + Sync {
    fn snapshot(&self, view: &SnapshotView);

    fn leaderboard(&self, entries: &[LeaderboardEntry]);

    fn status(&self, status: &Status);
}
