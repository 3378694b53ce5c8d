mod deposit;
mod snapshot;

pub use deposit::{Deposit, TimeFilter};
pub use snapshot::{ContractSnapshot, ContractSummary, DrawStatus};

/// Unix timestamp, seconds.
pub type UnixSeconds = u64;

/// Number of leaderboard rows kept after aggregation.
pub const LEADERBOARD_SIZE: usize = 10;
