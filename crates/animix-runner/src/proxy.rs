//! Proxy list loading and egress IP checks.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::RunnerError;

/// Service that echoes the caller's public IP.
const IP_CHECK_URL: &str = "https://api.ipify.org?format=json";

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Non-blank lines of the proxy file, in order.
pub fn parse_proxies(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Read the proxy file.
///
/// # Errors
///
/// Returns [`RunnerError::Io`] if the file cannot be read.
pub async fn load_proxies(path: &Path) -> Result<Vec<String>, RunnerError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_proxies(&contents))
}

/// Give account `i` proxy `i`.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] when there are fewer proxies than
/// accounts.
pub fn assign_proxies(accounts: usize, proxies: Vec<String>) -> Result<Vec<String>, RunnerError> {
    if proxies.len() < accounts {
        return Err(RunnerError::Config(format!(
            "{accounts} accounts but only {} proxies",
            proxies.len()
        )));
    }
    Ok(proxies.into_iter().take(accounts).collect())
}

/// Resolve the public IP seen through a proxy.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] for an invalid proxy URL,
/// [`RunnerError::Transport`] if the check request fails, and
/// [`RunnerError::Decode`] if the response has no IP.
pub async fn check_proxy_ip(proxy: &str, timeout: Duration) -> Result<String, RunnerError> {
    let proxy = reqwest::Proxy::all(proxy)
        .map_err(|e| RunnerError::Config(format!("invalid proxy: {e}")))?;
    let client = reqwest::Client::builder()
        .proxy(proxy)
        .timeout(timeout)
        .build()
        .map_err(|e| RunnerError::Transport(format!("failed to build proxy client: {e}")))?;

    let response = client
        .get(IP_CHECK_URL)
        .send()
        .await
        .map_err(|e| RunnerError::Transport(format!("proxy IP check failed: {e}")))?;
    if !response.status().is_success() {
        return Err(RunnerError::Transport(format!(
            "proxy IP check returned {}",
            response.status()
        )));
    }
    let body: IpResponse = response
        .json()
        .await
        .map_err(|e| RunnerError::Decode(format!("proxy IP check: {e}")))?;
    Ok(body.ip)
}
