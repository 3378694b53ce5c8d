//! Wallet session and jackpot transactions.
//!
//! A [`Session`] is passed explicitly to every operation. It carries the
//! active [`Deployment`] and, once a key is attached, the signer used for
//! writes. Every call selects a live RPC endpoint anew.

use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder},
    signers::local::PrivateKeySigner,
};
use tracing::{debug, info, warn};

use crate::{
    Deployment,
    abi::jackpot::Jackpot::{self, JackpotInstance},
    endpoint,
    error::JackpotError,
    reader::ContractReader,
    types::DrawStatus,
};

/// Mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[derive(Clone, derive_more::Debug)]
pub struct Session {
    deployment: Deployment,
    account: Option<Address>,
    #[debug(skip)]
    wallet: Option<EthereumWallet>,
    probe_timeout: Duration,
}

impl Session {
    /// Read-only session.
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment,
            account: None,
            wallet: None,
            probe_timeout: endpoint::DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_signer(mut self, signer: PrivateKeySigner) -> Self {
        self.account = Some(signer.address());
        self.wallet = Some(EthereumWallet::from(signer));
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn contract(&self) -> Address {
        self.deployment.contract()
    }

    /// Address of the attached signer.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Deposits `value` wei into the pool.
    pub async fn deposit(&self, value: U256) -> Result<TxOutcome, JackpotError> {
        if value.is_zero() {
            return Err(JackpotError::InvalidRequest("deposit amount must be positive".to_string()));
        }
        let instance = self.signed_instance().await?;
        let pending = instance.deposit().value(value).send().await?;
        self.confirm("deposit", pending).await
    }

    /// Claims the pool when the session account is the winner.
    pub async fn withdraw_if_winner(&self) -> Result<TxOutcome, JackpotError> {
        let instance = self.signed_instance().await?;
        let pending = instance.withdrawIfWinner().send().await?;
        self.confirm("withdrawIfWinner", pending).await
    }

    pub async fn request_draw(&self) -> Result<TxOutcome, JackpotError> {
        let instance = self.signed_instance().await?;
        let pending = instance.requestDraw().send().await?;
        self.confirm("requestDraw", pending).await
    }

    pub async fn withdraw_fees(&self) -> Result<TxOutcome, JackpotError> {
        let instance = self.signed_instance().await?;
        let pending = instance.withdrawFees().send().await?;
        self.confirm("withdrawFees", pending).await
    }

    /// Cumulative deposits of the session account, wei.
    pub async fn my_deposits(&self) -> Result<U256, JackpotError> {
        let account = self.account.ok_or(JackpotError::NoSigner)?;
        self.reader().await?.user_deposits(account).await
    }

    pub async fn draw_status(&self) -> Result<DrawStatus, JackpotError> {
        self.reader().await?.draw_status().await
    }

    async fn reader(&self) -> Result<ContractReader<DynProvider>, JackpotError> {
        let provider = endpoint::connect_http(self.deployment.rpc_endpoints(), self.probe_timeout).await?;
        Ok(ContractReader::new(self.contract(), provider))
    }

    async fn signed_instance(&self) -> Result<JackpotInstance<DynProvider>, JackpotError> {
        let wallet = self.wallet.as_ref().ok_or(JackpotError::NoSigner)?;
        let provider =
            endpoint::connect_signer(self.deployment.rpc_endpoints(), wallet, self.probe_timeout).await?;
        Ok(Jackpot::new(self.contract(), provider))
    }

    async fn confirm(
        &self,
        method: &str,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TxOutcome, JackpotError> {
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, method, "Transaction sent");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            warn!(%tx_hash, method, "Transaction reverted");
            return Err(JackpotError::Reverted(format!("{method} in {tx_hash}")));
        }

        info!(%tx_hash, method, block = ?receipt.block_number, "Transaction mined");
        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}
