//! Terminal rendering of the jackpot state.

use jackpot_sdk::{
    leaderboard::LeaderboardEntry,
    render::{Renderer, SnapshotView, Status},
    types::TimeFilter,
};
use tracing::{info, warn};

const BAR_WIDTH: usize = 40;

/// Prints figures and the leaderboard to stdout, status to the log.
#[derive(Debug)]
pub struct ConsoleRenderer {
    window: TimeFilter,
}

impl ConsoleRenderer {
    pub fn new(window: TimeFilter) -> Self {
        Self { window }
    }
}

impl Renderer for ConsoleRenderer {
    fn snapshot(&self, view: &SnapshotView) {
        println!("Pool:        {} ETH", view.total_pool_eth);
        println!("Jackpot:     ${} / ${}", view.jackpot_usd, view.target_usd);
        println!("Last 24h:    ${}", view.last24h_usd);
        println!("Progress:    {} {:.2}%", progress_bar(view.progress_percent), view.progress_percent);
    }

    fn leaderboard(&self, entries: &[LeaderboardEntry]) {
        println!("Top depositors ({}):", self.window);
        if entries.is_empty() {
            println!("  no deposits");
        }
        for (rank, entry) in entries.iter().enumerate() {
            println!("  {:>2}. {} {} ETH", rank + 1, entry.address_lower(), entry.amount_display());
        }
    }

    fn status(&self, status: &Status) {
        match status {
            Status::Failed(_) => warn!("{}", status.message()),
            Status::Rendered { warnings, .. } if !warnings.is_empty() => warn!("{}", status.message()),
            _ => info!("{}", status.message()),
        }
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
