//! Jackpot lottery watcher.
//!
//! This binary loads and renders the jackpot state, keeps it refreshed and
//! sends the lottery transactions of the configured wallet.

mod config;
mod console;
mod error;

use std::{process::exit, sync::Arc};

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use jackpot_sdk::{
    cache::FileCache,
    loader::{JackpotLoader, LoaderOptions},
    num, refresh,
    session::{Session, TxOutcome},
};
use tracing::{error, info};

use config::{CliConfig, Command, EnvConfig};
use console::ConsoleRenderer;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(env_config, cli_config).await {
        error!(%e, "Jackpot watcher encountered an error, shutting down");
        exit(1);
    }
}

async fn run(env_config: EnvConfig, cli_config: CliConfig) -> Result<()> {
    let mut session = Session::new(env_config.deployment()?);
    if let Some(timeout) = env_config.probe_timeout() {
        session = session.with_probe_timeout(timeout);
    }
    if let Some(key) = &env_config.private_key {
        let signer: PrivateKeySigner = key.parse()?;
        session = session.with_signer(signer);
    }
    info!(
        chain_id = session.deployment().chain_id(),
        contract = %session.contract(),
        account = ?session.account(),
        "Session ready"
    );

    let command = cli_config.command;
    let window = command.window()?;
    let options = LoaderOptions {
        filter: window,
        background_refresh: !cli_config.no_background_refresh,
        ..LoaderOptions::default()
    };
    let loader = JackpotLoader::for_session(
        &session,
        FileCache::new(env_config.cache_path()),
        ConsoleRenderer::new(window),
    )?
    .with_options(options);

    match command {
        Command::Load | Command::Leaderboard { .. } => {
            loader.load(&session).await?;
        }
        Command::Direct => {
            loader.load_direct(&session).await?;
        }
        Command::Watch { .. } => {
            let handle = refresh::start(Arc::new(loader), Arc::new(session), command.interval()?);
            tokio::signal::ctrl_c().await?;
            info!("Interrupted, stopping refresh");
            handle.stop();
        }
        Command::Deposit { .. } => {
            if let Some(value) = command.deposit_value()? {
                report(session.deposit(value).await?);
            }
        }
        Command::Withdraw => report(session.withdraw_if_winner().await?),
        Command::Draw => report(session.request_draw().await?),
        Command::WithdrawFees => report(session.withdraw_fees().await?),
        Command::Status => {
            let status = session.draw_status().await?;
            match status.winner {
                Some(winner) => println!("Winner:      {winner}"),
                None => println!("Winner:      none"),
            }
            println!("Can draw:    {}", status.can_draw);
            if let Some(started) = status.hold_started_at {
                println!("Hold since:  {started}");
            }
            if session.account().is_some() {
                println!("My deposits: {} ETH", num::format_ether(session.my_deposits().await?));
            }
        }
    }

    Ok(())
}

fn report(outcome: TxOutcome) {
    match outcome.block_number {
        Some(block) => println!("Transaction {} mined in block {block}", outcome.tx_hash),
        None => println!("Transaction {} mined", outcome.tx_hash),
    }
}
