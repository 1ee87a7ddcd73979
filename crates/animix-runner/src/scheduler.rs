//! Endless rounds over all accounts with bounded concurrency.
//!
//! Each round runs one pass per account, at most
//! `scheduler.max_concurrent_accounts` at a time, each bounded by
//! `scheduler.account_timeout_secs`. A failing account never stops the
//! round. Between rounds the scheduler sleeps `scheduler.pass_sleep_minutes`.

use std::path::Path;

use chrono::Utc;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{Instrument, error, info, info_span, warn};

use crate::account::{Account, load_accounts};
use crate::client::ApiClient;
use crate::config::BotConfig;
use crate::error::RunnerError;
use crate::pass::AccountPass;
use crate::proxy::{assign_proxies, check_proxy_ip, load_proxies};
use crate::session::UserAgentStore;

/// An account with everything it needs before its first pass.
#[derive(Debug, Clone)]
pub struct PreparedAccount {
    /// The account.
    pub account: Account,
    /// Persisted user agent for the account.
    pub user_agent: String,
    /// Assigned proxy in proxy mode.
    pub proxy: Option<String>,
}

/// How one account pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every enabled phase ran.
    Completed,
    /// The pass stopped on an error.
    Failed,
    /// The pass hit the account timeout.
    TimedOut,
    /// The account was not run, e.g. its proxy was unreachable.
    Skipped,
}

/// Outcome counts for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Passes that completed.
    pub completed: usize,
    /// Passes that failed.
    pub failed: usize,
    /// Passes that timed out.
    pub timed_out: usize,
    /// Accounts skipped.
    pub skipped: usize,
}

impl RoundSummary {
    /// Tally a round's outcomes.
    pub fn tally(outcomes: &[PassOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            let slot = match outcome {
                PassOutcome::Completed => &mut summary.completed,
                PassOutcome::Failed => &mut summary.failed,
                PassOutcome::TimedOut => &mut summary.timed_out,
                PassOutcome::Skipped => &mut summary.skipped,
            };
            *slot = slot.saturating_add(1);
        }
        summary
    }
}

/// Load accounts, user agents, and proxies.
///
/// # Errors
///
/// Returns [`RunnerError`] if a file cannot be read or written, or when
/// proxy mode has fewer proxies than accounts.
pub async fn prepare(config: &BotConfig) -> Result<Vec<PreparedAccount>, RunnerError> {
    let accounts = load_accounts(Path::new(&config.accounts.data_file)).await?;
    info!(accounts = accounts.len(), "accounts loaded");

    let mut store = UserAgentStore::load(Path::new(&config.accounts.session_file)).await?;
    let mut rng = rand::rng();
    let user_agents: Vec<String> = accounts
        .iter()
        .map(|account| store.user_agent_for(&account.session_name, &mut rng))
        .collect();
    store.save().await?;

    let proxies: Vec<Option<String>> = if config.accounts.use_proxy {
        let proxies = load_proxies(Path::new(&config.accounts.proxy_file)).await?;
        assign_proxies(accounts.len(), proxies)?
            .into_iter()
            .map(Some)
            .collect()
    } else {
        vec![None; accounts.len()]
    };

    Ok(accounts
        .into_iter()
        .zip(user_agents)
        .zip(proxies)
        .map(|((account, user_agent), proxy)| PreparedAccount {
            account,
            user_agent,
            proxy,
        })
        .collect())
}

/// Run rounds forever.
///
/// # Errors
///
/// Returns [`RunnerError`] only if preparation fails.
pub async fn run(config: &BotConfig) -> Result<(), RunnerError> {
    let prepared = prepare(config).await?;
    if prepared.is_empty() {
        warn!(data_file = %config.accounts.data_file, "no accounts to run");
        return Ok(());
    }

    loop {
        let started = Utc::now();
        info!(
            accounts = prepared.len(),
            concurrency = config.scheduler.max_concurrent_accounts,
            "round starting"
        );

        let outcomes: Vec<PassOutcome> = futures::stream::iter(prepared.iter())
            .map(|account| run_account(config, account))
            .buffer_unordered(config.scheduler.max_concurrent_accounts)
            .collect()
            .await;

        let summary = RoundSummary::tally(&outcomes);
        let next_round = chrono::Duration::from_std(config.scheduler.pass_sleep())
            .ok()
            .and_then(|sleep| Utc::now().checked_add_signed(sleep))
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        info!(
            started = %started.to_rfc3339(),
            completed = summary.completed,
            failed = summary.failed,
            timed_out = summary.timed_out,
            skipped = summary.skipped,
            next_round = %next_round,
            "round finished"
        );

        tokio::time::sleep(config.scheduler.pass_sleep()).await;
    }
}

async fn run_account(config: &BotConfig, prepared: &PreparedAccount) -> PassOutcome {
    let account = &prepared.account;
    let span = info_span!(
        "account",
        index = account.index,
        name = %account.display_name
    );

    async move {
        if let Some(proxy) = prepared.proxy.as_deref() {
            config.scheduler.delay_start_bot.wait().await;
            match check_proxy_ip(proxy, config.api.request_timeout()).await {
                Ok(ip) => info!(ip = %ip, "proxy reachable"),
                Err(e) => {
                    warn!(error = %e, "proxy check failed, skipping account");
                    return PassOutcome::Skipped;
                }
            }
        }

        let client = match ApiClient::new(
            config,
            &account.init_data,
            &prepared.user_agent,
            prepared.proxy.as_deref(),
        ) {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "failed to build client");
                return PassOutcome::Skipped;
            }
        };

        let pass = AccountPass::new(&client, &config.features);
        match timeout(config.scheduler.account_timeout(), pass.run()).await {
            Ok(Ok(())) => {
                info!("pass completed");
                PassOutcome::Completed
            }
            Ok(Err(RunnerError::Unauthorized)) => {
                error!("init data rejected, refresh the account's query string");
                PassOutcome::Failed
            }
            Ok(Err(e)) => {
                warn!(error = %e, "pass failed");
                PassOutcome::Failed
            }
            Err(_) => {
                warn!(
                    timeout_secs = config.scheduler.account_timeout_secs,
                    "pass timed out"
                );
                PassOutcome::TimedOut
            }
        }
    }
    .instrument(span)
    .await
}
