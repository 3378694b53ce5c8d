use std::{fmt, str::FromStr};

use alloy::primitives::{Address, U256};
use fastnum::UD256;

use super::UnixSeconds;
use crate::num;

/// A single deposit into the jackpot pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deposit {
    depositor: Address,
    amount: UD256,
    timestamp: UnixSeconds,
}

impl Deposit {
    pub fn new(depositor: Address, amount: UD256, timestamp: UnixSeconds) -> Self {
        Self {
            depositor,
            amount,
            timestamp,
        }
    }

    /// Deposit from a raw wei amount.
    pub fn from_wei(depositor: Address, amount_wei: U256, timestamp: UnixSeconds) -> Self {
        Self::new(
            depositor,
            num::Converter::eth().from_unsigned(amount_wei),
            timestamp,
        )
    }

    pub fn depositor(&self) -> Address {
        self.depositor
    }

    /// Deposited amount in ETH.
    pub fn amount(&self) -> UD256 {
        self.amount
    }

    pub fn amount_wei(&self) -> U256 {
        num::Converter::eth().to_unsigned(self.amount)
    }

    pub fn timestamp(&self) -> UnixSeconds {
        self.timestamp
    }
}

/// Time window applied to deposits before leaderboard aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeFilter {
    #[default]
    All,
    Last24h,
    Last7d,
}

impl TimeFilter {
    /// Oldest timestamp kept by the filter at `now`, if any.
    pub fn cutoff(&self, now: UnixSeconds) -> Option<UnixSeconds> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Last24h => Some(now.saturating_sub(86_400)),
            TimeFilter::Last7d => Some(now.saturating_sub(604_800)),
        }
    }

    pub fn admits(&self, deposit: &Deposit, now: UnixSeconds) -> bool {
        self.cutoff(now)
            .is_none_or(|cutoff| deposit.timestamp() >= cutoff)
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFilter::All => write!(f, "all"),
            TimeFilter::Last24h => write!(f, "24h"),
            TimeFilter::Last7d => write!(f, "7d"),
        }
    }
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TimeFilter::All),
            "24h" | "day" => Ok(TimeFilter::Last24h),
            "7d" | "week" => Ok(TimeFilter::Last7d),
            other => Err(format!("unknown time filter: {other}")),
        }
    }
}
