use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::UnixSeconds;
use crate::num;

/// Raw contract summary values, either indexed or read on-chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContractSummary {
    /// Pool size, wei.
    pub total_pool: U256,
    /// Jackpot value, USD scaled by 1e8.
    pub jackpot_usd: U256,
    /// Target value, USD scaled by 1e8.
    pub target_usd: U256,
    /// Deposits over the last 24 hours, USD scaled by 1e8.
    pub last24h_usd: U256,
}

/// Jackpot figures as displayed, recomputed on every refresh.
///
/// `percent_complete` is the raw ratio and may exceed 100,
/// renderers receive it clamped through [`crate::render::SnapshotView`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSnapshot {
    pub total_pool_eth: String,
    pub jackpot_usd_formatted: String,
    pub target_usd_formatted: String,
    pub last24h_usd_formatted: String,
    pub percent_complete: f64,
}

impl Default for ContractSnapshot {
    fn default() -> Self {
        Self {
            total_pool_eth: "0.0".to_string(),
            jackpot_usd_formatted: "0.00".to_string(),
            target_usd_formatted: "0.00".to_string(),
            last24h_usd_formatted: "0.00".to_string(),
            percent_complete: 0.0,
        }
    }
}

impl ContractSnapshot {
    /// Builds a snapshot from whatever values are known, missing ones
    /// rendered with their defaults.
    pub fn from_parts(
        total_pool: Option<U256>,
        jackpot_usd: Option<U256>,
        target_usd: Option<U256>,
        last24h_usd: Option<U256>,
    ) -> Self {
        let mut snapshot = Self::default();
        if let Some(total_pool) = total_pool {
            snapshot.total_pool_eth = num::format_ether(total_pool);
        }
        if let Some(jackpot_usd) = jackpot_usd {
            snapshot.jackpot_usd_formatted = num::format_usd(jackpot_usd);
        }
        if let Some(target_usd) = target_usd {
            snapshot.target_usd_formatted = num::format_usd(target_usd);
        }
        if let Some(last24h_usd) = last24h_usd {
            snapshot.last24h_usd_formatted = num::format_usd(last24h_usd);
        }
        if let (Some(jackpot_usd), Some(target_usd)) = (jackpot_usd, target_usd) {
            snapshot.percent_complete = num::percent_complete(jackpot_usd, target_usd);
        }
        snapshot
    }
}

impl From<&ContractSummary> for ContractSnapshot {
    fn from(summary: &ContractSummary) -> Self {
        Self::from_parts(
            Some(summary.total_pool),
            Some(summary.jackpot_usd),
            Some(summary.target_usd),
            Some(summary.last24h_usd),
        )
    }
}

/// Draw state of the lottery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStatus {
    /// Current winner, `None` while the contract reports the zero address.
    pub winner: Option<Address>,
    pub can_draw: bool,
    /// Start of the current holding period, `None` when not started.
    pub hold_started_at: Option<UnixSeconds>,
}
