//! Finguard - transfer submission from the command line
//!
//! Runs one attempt through the full pipeline:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Amount  │───▶│ Location │───▶│ Transfer │───▶│  Notify  │
//! │  (keys)  │    │  (gate)  │    │  (POST)  │    │  (POST)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Usage:
//!   finguard --from 1000123456789 --to 110-222-333333 --amount 50000 \
//!            --balance 100000 [--lat 37.5665 --lon 126.978] [--user u-1] \
//!            [--token <push-token>] [--id-token <jwt>] [--env dev]

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;

use finguard::config::AppConfig;
use finguard::logging::init_logging;
use finguard::transfer::{
    AmountEntryValidator, FixedLocationProvider, StaticSession, StaticTokenStore, SubmitOutcome,
    TransferForm, TransferOrchestrator,
};

// ============================================================
// ARGUMENTS
// ============================================================

fn get_arg(args: &[String], names: &[&str]) -> Option<String> {
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn require_arg(args: &[String], name: &str) -> Result<String> {
    get_arg(args, &[name]).with_context(|| format!("missing required argument {}", name))
}

fn parse_arg<T>(args: &[String], name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get_arg(args, &[name]) {
        Some(v) => v
            .parse()
            .with_context(|| format!("invalid value for {}: {}", name, v)),
        None => Ok(default),
    }
}

/// Replay the amount as keypad presses so the entry rules apply
fn enter_amount(validator: &AmountEntryValidator, amount: &str, balance: u64) -> Result<String> {
    let mut entered = String::new();
    for digit in amount.chars() {
        entered = validator
            .append_digit(&entered, digit, balance)
            .with_context(|| format!("amount rejected at '{}'", digit))?;
    }
    Ok(entered)
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let env = get_arg(&args, &["--env", "-e"]).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env).with_context(|| format!("loading config/{}.yaml", env))?;
    let _log_guard = init_logging(&config);

    info!(env = %env, endpoint = %config.transfer_api.base_url, "Finguard starting");

    let source_account = require_arg(&args, "--from")?;
    let counter_account = require_arg(&args, "--to")?;
    let amount = require_arg(&args, "--amount")?;
    let balance: u64 = parse_arg(&args, "--balance", 0)?;
    let lat: f64 = parse_arg(&args, "--lat", 37.5665)?;
    let lon: f64 = parse_arg(&args, "--lon", 126.9780)?;
    let user = get_arg(&args, &["--user"]).unwrap_or_else(|| "local-user".to_string());

    let mut session = StaticSession::new(user);
    if let Some(id_token) = get_arg(&args, &["--id-token"]) {
        session = session.with_id_token(id_token);
    }

    let orchestrator = Arc::new(TransferOrchestrator::from_config(
        &config,
        Arc::new(FixedLocationProvider::new(lat, lon)),
        Arc::new(session),
        Arc::new(StaticTokenStore::new(get_arg(&args, &["--token"]))),
    )?);

    let entered = enter_amount(orchestrator.validator(), &amount, balance)?;
    let form = TransferForm {
        source_account,
        counter_account,
        amount: entered,
        latest_balance: balance,
    };

    let outcome = orchestrator.submit(&form).await;
    if let Some(message) = outcome.user_message() {
        println!("{}", message);
    }

    match outcome {
        SubmitOutcome::Completed(receipt) => {
            if let Some(warning) = receipt.warning() {
                eprintln!("warning: {}", warning);
            }
            println!("transaction id: {}", receipt.transaction_id);
            Ok(())
        }
        SubmitOutcome::Aborted { stage, error } => {
            bail!("transfer aborted during {}: {}", stage, error.code())
        }
        SubmitOutcome::Debounced => bail!("submission already in flight"),
    }
}
