//! Configuration loading and typed config structures for the runner.
//!
//! The configuration lives in `animix-config.yaml` (path overridable with
//! `ANIMIX_CONFIG`). Every section and field has a default, so a file only
//! needs `api.base_url`. Environment variables override a few values:
//!
//! - `ANIMIX_API_BASE_URL` overrides `api.base_url`
//! - `ANIMIX_DATA_FILE` overrides `accounts.data_file`

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use animix_types::MissionId;
use rand::Rng;
use serde::Deserialize;

use crate::error::RunnerError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "animix-config.yaml";

/// Inclusive range of whole seconds to wait, sampled uniformly.
///
/// Written in YAML as a two-element list, e.g. `[1, 5]`. A reversed range
/// is treated as if its bounds were swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange(pub u64, pub u64);

impl DelayRange {
    /// Sample one delay from the range.
    pub fn sample<R: Rng>(self, rng: &mut R) -> Duration {
        let (low, high) = if self.0 <= self.1 {
            (self.0, self.1)
        } else {
            (self.1, self.0)
        };
        Duration::from_secs(rng.random_range(low..=high))
    }

    /// Sleep for one sampled delay.
    pub async fn wait(self) {
        let delay = self.sample(&mut rand::rng());
        tokio::time::sleep(delay).await;
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BotConfig {
    /// Game API endpoints and transport behavior.
    #[serde(default)]
    pub api: ApiConfig,

    /// Account, proxy, and session files.
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Concurrency, deadlines, and pacing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Which phases run and how.
    #[serde(default)]
    pub features: FeatureConfig,
}

impl BotConfig {
    /// Load the file named by `ANIMIX_CONFIG`, or [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    ///
    /// See [`BotConfig::from_file`].
    pub fn load() -> Result<Self, RunnerError> {
        let path = std::env::var("ANIMIX_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::from_file(Path::new(&path))
    }

    /// Load configuration from a YAML file, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Io`] if the file cannot be read and
    /// [`RunnerError::Config`] if it is not valid or lacks a base URL.
    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the YAML is invalid or no API base
    /// URL is configured.
    pub fn parse(yaml: &str) -> Result<Self, RunnerError> {
        let mut config: Self = serde_yml::from_str(yaml)
            .map_err(|e| RunnerError::Config(format!("invalid config YAML: {e}")))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ANIMIX_API_BASE_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("ANIMIX_DATA_FILE") {
            self.accounts.data_file = val;
        }
    }

    fn validate(&self) -> Result<(), RunnerError> {
        if self.api.base_url.trim().is_empty() {
            return Err(RunnerError::Config(
                "api.base_url is required (or set ANIMIX_API_BASE_URL)".to_owned(),
            ));
        }
        if self.scheduler.max_concurrent_accounts == 0 {
            return Err(RunnerError::Config(
                "scheduler.max_concurrent_accounts must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Game API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Base URL every `/public/...` path is appended to.
    #[serde(default)]
    pub base_url: String,

    /// Static pet catalog used to resolve opponent pets.
    #[serde(default = "default_static_pets_url")]
    pub static_pets_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry policy for transport failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ApiConfig {
    /// Per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            static_pets_url: default_static_pets_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Bounded retry for failed requests.
///
/// HTTP 401 and 400 are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wait before each retry.
    #[serde(default = "default_delay_between_requests")]
    pub delay_secs: DelayRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_secs: default_delay_between_requests(),
        }
    }
}

/// Account and session files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountsConfig {
    /// One init-data string per line.
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// One proxy URL per line, matched to accounts by position.
    #[serde(default = "default_proxy_file")]
    pub proxy_file: String,

    /// Route each account through its proxy.
    #[serde(default)]
    pub use_proxy: bool,

    /// Persisted account to user agent mapping.
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            proxy_file: default_proxy_file(),
            use_proxy: false,
            session_file: default_session_file(),
        }
    }
}

/// Scheduling and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Accounts processed at the same time.
    #[serde(default = "default_max_concurrent_accounts")]
    pub max_concurrent_accounts: usize,

    /// Deadline for one account pass, in seconds.
    #[serde(default = "default_account_timeout_secs")]
    pub account_timeout_secs: u64,

    /// Sleep between full rounds, in minutes.
    #[serde(default = "default_pass_sleep_minutes")]
    pub pass_sleep_minutes: u64,

    /// Wait before each state-changing call.
    #[serde(default = "default_delay_between_requests")]
    pub delay_between_requests: DelayRange,

    /// Startup jitter per account in proxy mode.
    #[serde(default = "default_delay_start_bot")]
    pub delay_start_bot: DelayRange,
}

impl SchedulerConfig {
    /// Deadline for one account pass.
    pub const fn account_timeout(&self) -> Duration {
        Duration::from_secs(self.account_timeout_secs)
    }

    /// Sleep between rounds.
    pub const fn pass_sleep(&self) -> Duration {
        Duration::from_secs(self.pass_sleep_minutes.saturating_mul(60))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_accounts: default_max_concurrent_accounts(),
            account_timeout_secs: default_account_timeout_secs(),
            pass_sleep_minutes: default_pass_sleep_minutes(),
            delay_between_requests: default_delay_between_requests(),
            delay_start_bot: default_delay_start_bot(),
        }
    }
}

/// A DNA stack to leave out of mixing, by kind id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DnaSkip {
    /// Kind id.
    Id(u64),
    /// Display name.
    Name(String),
}

impl DnaSkip {
    fn key(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }
}

/// Phase toggles and their parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureConfig {
    /// Spend god power on gacha pulls.
    #[serde(default = "default_true")]
    pub auto_gacha: bool,

    /// Stop pulling once this many pets were pulled in a pass.
    #[serde(default = "default_max_amount_gacha")]
    pub max_amount_gacha: u32,

    /// Claim gacha bonus rewards.
    #[serde(default = "default_true")]
    pub auto_claim_bonus: bool,

    /// Mix DNA units.
    #[serde(default = "default_true")]
    pub auto_merge_pet: bool,

    /// Mix towards outstanding collection goals instead of at random.
    #[serde(default)]
    pub enable_advanced_merge: bool,

    /// DNA stacks never mixed.
    #[serde(default)]
    pub skip_pets_dna: Vec<DnaSkip>,

    /// Claim finished missions and enter new ones.
    #[serde(default = "default_true")]
    pub auto_missions: bool,

    /// Finished missions never claimed.
    #[serde(default)]
    pub skip_claim_missions: Vec<u64>,

    /// Missions never entered.
    #[serde(default)]
    pub skip_missions: Vec<u64>,

    /// Check in daily quests and claim rewards.
    #[serde(default = "default_true")]
    pub auto_quests: bool,

    /// Quest codes never checked in.
    #[serde(default)]
    pub skip_quests: Vec<String>,

    /// Clan every account should belong to; `None` leaves clans alone.
    #[serde(default)]
    pub clan_id: Option<u64>,

    /// Fight in the PvP arena.
    #[serde(default)]
    pub auto_pvp: bool,

    /// Pause between two attacks, in seconds.
    #[serde(default = "default_attack_interval_secs")]
    pub attack_interval_secs: u64,
}

impl FeatureConfig {
    /// Skip keys for DNA stacks, as compared against kind ids and names.
    pub fn dna_skip_keys(&self) -> BTreeSet<String> {
        self.skip_pets_dna.iter().map(DnaSkip::key).collect()
    }

    /// Finished missions not to claim.
    pub fn claim_skip_set(&self) -> BTreeSet<MissionId> {
        self.skip_claim_missions.iter().copied().map(MissionId).collect()
    }

    /// Missions not to enter.
    pub fn mission_skip_set(&self) -> BTreeSet<MissionId> {
        self.skip_missions.iter().copied().map(MissionId).collect()
    }

    /// Quest codes never checked in.
    pub fn quest_skip_set(&self) -> BTreeSet<String> {
        self.skip_quests.iter().cloned().collect()
    }

    /// Pause between two attacks.
    pub const fn attack_interval(&self) -> Duration {
        Duration::from_secs(self.attack_interval_secs)
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            auto_gacha: true,
            max_amount_gacha: default_max_amount_gacha(),
            auto_claim_bonus: true,
            auto_merge_pet: true,
            enable_advanced_merge: false,
            skip_pets_dna: Vec::new(),
            auto_missions: true,
            skip_claim_missions: Vec::new(),
            skip_missions: Vec::new(),
            auto_quests: true,
            skip_quests: Vec::new(),
            clan_id: None,
            auto_pvp: false,
            attack_interval_secs: default_attack_interval_secs(),
        }
    }
}

fn default_static_pets_url() -> String {
    "https://statics.animix.tech/pets.json".to_owned()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    1
}

fn default_data_file() -> String {
    "data.txt".to_owned()
}

fn default_proxy_file() -> String {
    "proxy.txt".to_owned()
}

fn default_session_file() -> String {
    "session_user_agents.json".to_owned()
}

const fn default_max_concurrent_accounts() -> usize {
    10
}

const fn default_account_timeout_secs() -> u64 {
    86_400
}

const fn default_pass_sleep_minutes() -> u64 {
    60
}

const fn default_delay_between_requests() -> DelayRange {
    DelayRange(1, 5)
}

const fn default_delay_start_bot() -> DelayRange {
    DelayRange(1, 15)
}

const fn default_max_amount_gacha() -> u32 {
    100
}

const fn default_attack_interval_secs() -> u64 {
    15
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let config = BotConfig::parse("api:\n  base_url: https://api.example.test\n").unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.api.retry.max_retries, 1);
        assert_eq!(config.scheduler.account_timeout(), Duration::from_secs(86_400));
        assert_eq!(config.scheduler.delay_between_requests, DelayRange(1, 5));
        assert!(config.features.auto_gacha);
        assert!(!config.features.auto_pvp);
        assert!(config.features.clan_id.is_none());
    }

    #[test]
    fn missing_base_url_is_rejected() {
        if std::env::var("ANIMIX_API_BASE_URL").is_ok() {
            return;
        }
        assert!(matches!(BotConfig::parse("{}"), Err(RunnerError::Config(_))));
    }

    #[test]
    fn full_yaml_parses() {
        let yaml = r"
api:
  base_url: https://api.example.test
  request_timeout_secs: 10
  retry:
    max_retries: 3
    delay_secs: [2, 4]
accounts:
  use_proxy: true
scheduler:
  max_concurrent_accounts: 4
  pass_sleep_minutes: 30
  delay_start_bot: [5, 10]
features:
  enable_advanced_merge: true
  skip_pets_dna: [105, Lynx]
  skip_missions: [7, 9]
  skip_quests: [daily_login]
  clan_id: 178
  auto_pvp: true
";
        let config = BotConfig::parse(yaml).unwrap();
        assert_eq!(config.api.retry.delay_secs, DelayRange(2, 4));
        assert!(config.accounts.use_proxy);
        assert_eq!(config.scheduler.pass_sleep(), Duration::from_secs(1800));
        assert_eq!(config.features.clan_id, Some(178));

        let keys = config.features.dna_skip_keys();
        assert!(keys.contains("105"));
        assert!(keys.contains("Lynx"));
        assert!(config.features.mission_skip_set().contains(&MissionId(9)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let yaml = "api:\n  base_url: x\nscheduler:\n  max_concurrent_accounts: 0\n";
        assert!(BotConfig::parse(yaml).is_err());
    }

    #[test]
    fn delay_range_samples_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let d = DelayRange(2, 4).sample(&mut rng);
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(4));
            let reversed = DelayRange(4, 2).sample(&mut rng);
            assert!(reversed >= Duration::from_secs(2) && reversed <= Duration::from_secs(4));
        }
        assert_eq!(DelayRange(3, 3).sample(&mut rng), Duration::from_secs(3));
    }
}
