//! Read-only access to the deployed jackpot contract.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use tracing::warn;

use crate::{
    abi::jackpot::Jackpot,
    error::JackpotError,
    types::{ContractSnapshot, DrawStatus},
};

/// Result of the direct tier read. The primary field is always present,
/// secondary fields are `None` when their accessor failed.
#[derive(Clone, Debug, Default)]
pub struct DirectRead {
    pub total_pool: U256,
    pub jackpot_usd: Option<U256>,
    pub target_usd: Option<U256>,
    pub last24h_usd: Option<U256>,
    /// Accessors that failed, with their errors.
    pub failures: Vec<JackpotError>,
}

impl DirectRead {
    pub fn snapshot(&self) -> ContractSnapshot {
        ContractSnapshot::from_parts(
            Some(self.total_pool),
            self.jackpot_usd,
            self.target_usd,
            self.last24h_usd,
        )
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Contract accessors over a live provider.
pub struct ContractReader<P> {
    instance: Jackpot::JackpotInstance<P>,
    provider: P,
}

impl<P: Provider + Clone> ContractReader<P> {
    pub fn new(contract: Address, provider: P) -> Self {
        Self {
            instance: Jackpot::new(contract, provider.clone()),
            provider,
        }
    }

    pub fn contract(&self) -> Address {
        *self.instance.address()
    }

    /// Whether any code is deployed at the contract address.
    pub async fn has_code(&self) -> Result<bool, JackpotError> {
        let code = self.provider.get_code_at(self.contract()).await?;
        Ok(!code.is_empty())
    }

    /// Pool size, wei.
    pub async fn total_pool(&self) -> Result<U256, JackpotError> {
        Ok(self.instance.totalPool().call().await?)
    }

    /// Jackpot value, USD scaled by 1e8.
    pub async fn jackpot_usd(&self) -> Result<U256, JackpotError> {
        Ok(self.instance.getJackpotUsd().call().await?)
    }

    /// Target value, USD scaled by 1e8.
    pub async fn target_usd(&self) -> Result<U256, JackpotError> {
        Ok(self.instance.TARGET_USD().call().await?)
    }

    /// Deposits over the last 24 hours, USD scaled by 1e8.
    pub async fn last24h_deposit_usd(&self) -> Result<U256, JackpotError> {
        Ok(self.instance.last24hDepositUsd().call().await?)
    }

    /// Cumulative deposits of `user`, wei.
    pub async fn user_deposits(&self, user: Address) -> Result<U256, JackpotError> {
        Ok(self.instance.userDeposits(user).call().await?)
    }

    pub async fn winner(&self) -> Result<Address, JackpotError> {
        Ok(self.instance.winner().call().await?)
    }

    pub async fn can_draw(&self) -> Result<bool, JackpotError> {
        Ok(self.instance.canDraw().call().await?)
    }

    pub async fn hold_start_timestamp(&self) -> Result<U256, JackpotError> {
        Ok(self.instance.holdStartTimestamp().call().await?)
    }

    /// Reads the jackpot figures for the direct tier.
    ///
    /// Fails only when the pool size can not be read; each USD accessor is
    /// independent and its failure leaves that field unset.
    pub async fn read(&self) -> Result<DirectRead, JackpotError> {
        let total_pool = self.total_pool().await?;

        let (jackpot_usd, target_usd, last24h_usd) = futures::join!(
            self.jackpot_usd(),
            self.target_usd(),
            self.last24h_deposit_usd(),
        );

        let mut failures = vec![];
        let mut keep = |name: &str, result: Result<U256, JackpotError>| match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(contract = %self.contract(), accessor = name, %err, "Contract read failed");
                failures.push(JackpotError::PartialReadFailure(format!("{name}: {err}")));
                None
            }
        };
        let jackpot_usd = keep("getJackpotUsd", jackpot_usd);
        let target_usd = keep("TARGET_USD", target_usd);
        let last24h_usd = keep("last24hDepositUsd", last24h_usd);

        Ok(DirectRead {
            total_pool,
            jackpot_usd,
            target_usd,
            last24h_usd,
            failures,
        })
    }

    /// Winner, draw readiness and holding period start.
    pub async fn draw_status(&self) -> Result<DrawStatus, JackpotError> {
        let (winner, can_draw, hold_start) = futures::try_join!(
            self.winner(),
            self.can_draw(),
            self.hold_start_timestamp(),
        )?;
        Ok(DrawStatus {
            winner: (!winner.is_zero()).then_some(winner),
            can_draw,
            hold_started_at: (!hold_start.is_zero()).then(|| hold_start.saturating_to::<u64>()),
        })
    }
}
