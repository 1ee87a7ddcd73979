//! Account loading from the init-data file.
//!
//! Each non-blank line is a Telegram web-app init-data query string. Its
//! `user` parameter holds URL-encoded JSON naming the account.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::error::RunnerError;

/// One account to automate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Position among the loaded accounts, from zero.
    pub index: usize,
    /// Raw init data, sent as the `tg-init-data` header.
    pub init_data: String,
    /// Telegram user id; keys the persisted user agent.
    pub session_name: String,
    /// First and last name, for logs.
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: u64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

/// Parse one init-data line into an account.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] when the line has no `user` parameter and
/// [`RunnerError::Serde`] when that parameter is not the expected JSON.
pub fn parse_account(index: usize, line: &str) -> Result<Account, RunnerError> {
    let init_data = line.trim();
    let url = Url::parse(&format!("https://init.data/?{init_data}"))
        .map_err(|e| RunnerError::Config(format!("init data is not a query string: {e}")))?;
    let user = url
        .query_pairs()
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| RunnerError::Config("init data has no user parameter".to_owned()))?;
    let user: TelegramUser = serde_json::from_str(&user)?;

    Ok(Account {
        index,
        init_data: init_data.to_owned(),
        session_name: user.id.to_string(),
        display_name: format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_owned(),
    })
}

/// Parse every non-blank line, skipping malformed ones with a warning.
pub fn parse_accounts(contents: &str) -> Vec<Account> {
    let mut accounts = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_account(accounts.len(), line) {
            Ok(account) => accounts.push(account),
            Err(e) => warn!(line = line_no.saturating_add(1), error = %e, "skipping malformed account line"),
        }
    }
    accounts
}

/// Read and parse the account file.
///
/// # Errors
///
/// Returns [`RunnerError::Io`] if the file cannot be read.
pub async fn load_accounts(path: &Path) -> Result<Vec<Account>, RunnerError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_accounts(&contents))
}
