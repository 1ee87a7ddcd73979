//! Multi-account automation runner for the Animix game.
//!
//! Every round the runner visits each account in the init-data file and
//! works through its daily routine against the game API: quests, clan
//! membership, gacha, DNA mixing, missions, achievement and season pass
//! claims, and the arena. Decisions about which pets go where come from
//! `animix-engine`; this crate owns transport, pacing, and scheduling.
//!
//! # Architecture
//!
//! ```text
//! config --> scheduler --(buffer_unordered)--> AccountPass --> phases --> ApiClient
//!                                                                |
//!                                                         animix-engine
//! ```
//!
//! A failing phase is logged and the pass moves on. A rejected init data
//! string (HTTP 401) ends that account's pass.

mod account;
mod client;
mod config;
mod error;
mod pass;
mod phases;
mod proxy;
mod scheduler;
mod session;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::BotConfig;

/// Application entry point.
///
/// Initializes logging, loads configuration, then runs account rounds
/// indefinitely.
///
/// # Errors
///
/// Returns an error if the configuration or the account files cannot be
/// loaded.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("animix-runner starting");

    let config = BotConfig::load().context("failed to load configuration")?;
    info!(
        base_url = %config.api.base_url,
        data_file = %config.accounts.data_file,
        use_proxy = config.accounts.use_proxy,
        max_concurrent_accounts = config.scheduler.max_concurrent_accounts,
        pass_sleep_minutes = config.scheduler.pass_sleep_minutes,
        "configuration loaded"
    );

    scheduler::run(&config)
        .await
        .context("failed to start account rounds")?;
    Ok(())
}

/// Structured logging; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
