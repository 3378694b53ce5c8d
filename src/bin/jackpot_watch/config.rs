//! Configuration for the jackpot watcher.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): deployment, endpoints, keys
//! - CLI arguments: the command to run and its parameters

use std::time::Duration;

use alloy::primitives::{Address, U256, utils::parse_ether};
use clap::{Parser, Subcommand};
use jackpot_sdk::{Deployment, cache::DEFAULT_CACHE_PATH, refresh::DEFAULT_REFRESH_INTERVAL, types::TimeFilter};
use url::Url;

/// Environment configuration (deployment, credentials).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Chain ID (e.g., 31337 for a local node)
    pub chain_id: u64,

    /// Jackpot contract address
    pub contract_address: String,

    /// RPC URLs in order of preference, comma-separated
    pub rpc_urls: String,

    /// GraphQL endpoint of the indexing service
    pub indexer_url: String,

    /// Cache file location (default: jackpot_cache.json)
    pub cache_path: Option<String>,

    /// Private key for signing transactions
    pub private_key: Option<String>,

    /// Optional bound on an RPC liveness probe, milliseconds
    pub probe_timeout_ms: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the jackpot contract address.
    pub fn contract_address(&self) -> Result<Address, alloy::primitives::hex::FromHexError> {
        self.contract_address.parse()
    }

    /// Parse the RPC URLs, keeping their order.
    pub fn rpc_urls(&self) -> Result<Vec<Url>, ConfigError> {
        let urls = self
            .rpc_urls
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(Url::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if urls.is_empty() {
            return Err(ConfigError::NoRpcUrls);
        }
        Ok(urls)
    }

    pub fn deployment(&self) -> Result<Deployment, crate::error::Error> {
        Ok(Deployment::new(
            self.chain_id,
            self.contract_address()?,
            self.rpc_urls()?,
            Url::parse(&self.indexer_url)?,
        ))
    }

    pub fn cache_path(&self) -> &str {
        self.cache_path.as_deref().unwrap_or(DEFAULT_CACHE_PATH)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_ms.map(Duration::from_millis)
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "jackpot-watch")]
#[command(about = "Jackpot lottery watcher and wallet")]
pub struct CliConfig {
    /// Skip the contract refresh that follows a render from cache
    #[arg(long, global = true)]
    pub no_background_refresh: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the jackpot once through indexer, cache and contract
    Load,

    /// Load the jackpot from the contract only
    Direct,

    /// Keep reloading the jackpot until interrupted
    Watch {
        /// Seconds between two loads
        #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
        interval: u64,
    },

    /// Load the jackpot and rank depositors over a time window
    Leaderboard {
        /// One of all, 24h, 7d
        #[arg(long, default_value = "all")]
        window: String,
    },

    /// Deposit ETH into the pool
    Deposit {
        /// Amount in ETH (e.g., 0.05)
        #[arg(long)]
        amount: String,
    },

    /// Claim the pool if the wallet is the winner
    Withdraw,

    /// Request a draw
    Draw,

    /// Withdraw accumulated fees
    WithdrawFees,

    /// Show draw state and the wallet's deposits
    Status,
}

impl Command {
    /// Refresh period of the watch command.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        match self {
            Command::Watch { interval: 0 } => Err(ConfigError::ZeroInterval),
            Command::Watch { interval } => Ok(Duration::from_secs(*interval)),
            _ => Ok(DEFAULT_REFRESH_INTERVAL),
        }
    }

    /// Leaderboard window of the command.
    pub fn window(&self) -> Result<TimeFilter, ConfigError> {
        match self {
            Command::Leaderboard { window } => window.parse().map_err(ConfigError::InvalidWindow),
            _ => Ok(TimeFilter::All),
        }
    }

    /// Deposit amount, wei.
    pub fn deposit_value(&self) -> Result<Option<U256>, ConfigError> {
        let Command::Deposit { amount } = self else {
            return Ok(None);
        };
        let value = parse_ether(amount).map_err(|_| ConfigError::InvalidAmount(amount.clone()))?;
        if value.is_zero() {
            return Err(ConfigError::InvalidAmount(amount.clone()));
        }
        Ok(Some(value))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("RPC_URLS must name at least one endpoint")]
    NoRpcUrls,

    #[error("Invalid leaderboard window: {0}")]
    InvalidWindow(String),

    #[error("Invalid deposit amount: {0}")]
    InvalidAmount(String),

    #[error("Refresh interval cannot be zero")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(rpc_urls: &str) -> EnvConfig {
        EnvConfig {
            chain_id: 31337,
            contract_address: "0x9c216d1ab3e0407b3d6f1d5e9effe6d01c326ab7".to_string(),
            rpc_urls: rpc_urls.to_string(),
            indexer_url: "http://localhost:8000/graphql".to_string(),
            cache_path: None,
            private_key: None,
            probe_timeout_ms: None,
        }
    }

    #[test]
    fn test_rpc_urls_keep_order() {
        let urls = env("http://a.example:8545, http://b.example:8545,").rpc_urls().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].host_str(), Some("a.example"));
        assert_eq!(urls[1].host_str(), Some("b.example"));

        assert!(matches!(env(" , ").rpc_urls(), Err(ConfigError::NoRpcUrls)));
    }

    #[test]
    fn test_deployment_from_env() {
        let config = env("http://localhost:8545");
        let deployment = config.deployment().unwrap();
        assert_eq!(deployment.chain_id(), 31337);
        assert_eq!(deployment.rpc_endpoints().len(), 1);
        assert_eq!(config.cache_path(), DEFAULT_CACHE_PATH);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = CliConfig::try_parse_from(["jackpot-watch", "leaderboard", "--window", "24h"]).unwrap();
        assert_eq!(cli.command.window().unwrap(), TimeFilter::Last24h);
        assert!(!cli.no_background_refresh);

        let cli = CliConfig::try_parse_from(["jackpot-watch", "watch", "--no-background-refresh"]).unwrap();
        assert_eq!(cli.command.interval().unwrap(), Duration::from_secs(30));
        assert!(cli.no_background_refresh);
    }

    #[test]
    fn test_deposit_amount() {
        let deposit = Command::Deposit {
            amount: "0.05".to_string(),
        };
        assert_eq!(
            deposit.deposit_value().unwrap(),
            Some(U256::from(50_000_000_000_000_000u64))
        );

        let zero = Command::Deposit {
            amount: "0".to_string(),
        };
        assert!(matches!(zero.deposit_value(), Err(ConfigError::InvalidAmount(_))));
        assert_eq!(Command::Status.deposit_value().unwrap(), None);
    }

    #[test]
    fn test_invalid_window_and_interval() {
        let board = Command::Leaderboard {
            window: "month".to_string(),
        };
        assert!(matches!(board.window(), Err(ConfigError::InvalidWindow(_))));
        assert!(matches!(
            Command::Watch { interval: 0 }.interval(),
            Err(ConfigError::ZeroInterval)
        ));
    }
}
