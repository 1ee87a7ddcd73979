//! One pass over one account: profile, then every enabled phase in order.

use animix_engine::PairingReport;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::config::FeatureConfig;
use crate::error::RunnerError;
use crate::phases::{gacha, merge, missions, pvp, rewards};

/// The phases run for an account, gated by the feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Gacha pulls.
    Gacha,
    /// Gacha bonus claim.
    GachaBonus,
    /// DNA mixing.
    Merge,
    /// Mission claiming and allocation.
    Missions,
    /// Quest check-ins.
    Quests,
    /// Clan membership.
    Clan,
    /// Achievement claims.
    Achievements,
    /// Season pass claims.
    SeasonPass,
    /// Arena.
    Pvp,
}

impl Phase {
    /// Name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gacha => "gacha",
            Self::GachaBonus => "gacha bonus",
            Self::Merge => "merge",
            Self::Missions => "missions",
            Self::Quests => "quests",
            Self::Clan => "clan",
            Self::Achievements => "achievements",
            Self::SeasonPass => "season pass",
            Self::Pvp => "pvp",
        }
    }
}

/// Enabled phases, in the order a pass runs them.
pub fn enabled_phases(features: &FeatureConfig) -> Vec<Phase> {
    [
        (Phase::Gacha, features.auto_gacha),
        (Phase::GachaBonus, features.auto_claim_bonus),
        (Phase::Merge, features.auto_merge_pet),
        (Phase::Missions, features.auto_missions),
        (Phase::Quests, features.auto_quests),
        (Phase::Clan, features.clan_id.is_some()),
        (Phase::Achievements, true),
        (Phase::SeasonPass, true),
        (Phase::Pvp, features.auto_pvp),
    ]
    .into_iter()
    .filter_map(|(phase, enabled)| enabled.then_some(phase))
    .collect()
}

/// Log a failed phase and carry on, unless the failure ends the pass.
///
/// # Errors
///
/// Returns the error when it ends the pass.
pub fn settle(phase: Phase, result: Result<(), RunnerError>) -> Result<(), RunnerError> {
    match result {
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(phase = phase.name(), error = %e, "phase failed");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

/// Drives one account through a pass.
pub struct AccountPass<'a> {
    client: &'a ApiClient,
    features: &'a FeatureConfig,
}

impl<'a> AccountPass<'a> {
    /// Create a pass over `client` with the given feature switches.
    pub const fn new(client: &'a ApiClient, features: &'a FeatureConfig) -> Self {
        Self { client, features }
    }

    /// Run the pass.
    ///
    /// # Errors
    ///
    /// Returns the failed profile fetch, or an authentication failure from
    /// any phase.
    pub async fn run(&self) -> Result<(), RunnerError> {
        let user = self.client.user_info().await?;
        info!(
            name = %user.full_name,
            level = user.level,
            token = user.token,
            god_power = user.god_power.unwrap_or(0),
            "account profile"
        );

        for phase in enabled_phases(self.features) {
            self.client.pace().await;
            let result = match phase {
                Phase::Gacha => self.gacha(user.god_power.unwrap_or(0)).await,
                Phase::GachaBonus => gacha::claim_bonus(self.client).await,
                Phase::Merge => self.merge().await,
                Phase::Missions => {
                    missions::run(
                        self.client,
                        &self.features.claim_skip_set(),
                        &self.features.mission_skip_set(),
                    )
                    .await
                }
                Phase::Quests => {
                    rewards::check_quests(self.client, &self.features.quest_skip_set()).await
                }
                Phase::Clan => {
                    rewards::settle_clan(self.client, user.clan_id, self.features.clan_id).await
                }
                Phase::Achievements => rewards::claim_achievements(self.client).await,
                Phase::SeasonPass => rewards::claim_season_pass(self.client).await,
                Phase::Pvp => pvp::run(self.client).await,
            };
            settle(phase, result)?;
        }
        Ok(())
    }

    async fn gacha(&self, god_power: u32) -> Result<(), RunnerError> {
        if god_power == 0 {
            info!("no god power to spend");
            return Ok(());
        }
        gacha::pull_all(self.client, god_power, self.features.max_amount_gacha)
            .await
            .map(|_| ())
    }

    async fn merge(&self) -> Result<(), RunnerError> {
        let skip = self.features.dna_skip_keys();
        let report = if self.features.enable_advanced_merge {
            merge::merge_towards_goals(self.client, &skip).await?
        } else {
            merge::merge_randomly(self.client, &skip).await?
        };
        log_pairings(&report);
        Ok(())
    }
}

/// Per-pair results are logged by the engine as they are committed.
fn log_pairings(report: &PairingReport) {
    info!(
        mixed = report.mixed.len(),
        failed = report.failed.len(),
        "mixing done"
    );
}
