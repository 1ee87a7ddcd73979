//! Account, quest, achievement, and season pass payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::AchievementId;

/// Profile from `GET /public/user/info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    /// Display name.
    pub full_name: String,
    /// Token balance.
    pub token: f64,
    /// Gacha currency.
    pub god_power: Option<u32>,
    /// Clan the account belongs to, if any.
    pub clan_id: Option<u64>,
    /// Account level.
    pub level: u32,
}

/// A daily quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Quest code, sent back when checking in.
    pub quest_code: String,
    /// Whether the quest is already done.
    #[serde(default)]
    pub status: bool,
}

/// Result of `GET /public/quest/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestBoard {
    /// All quests.
    #[serde(default)]
    pub quests: Vec<Quest>,
}

/// The pet attached to a collection achievement, carrying a packed pair id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementPet {
    /// Packed `dad ++ mom` kind id, decoded by the pairing allocator.
    pub pet_id: u64,
}

/// One achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Achievement identity used when claiming.
    pub quest_id: AchievementId,
    /// Whether the achievement is completed.
    #[serde(default)]
    pub status: bool,
    /// Whether the reward was claimed.
    #[serde(default)]
    pub claimed: bool,
    /// Collection target, only present for pet collection achievements.
    #[serde(default)]
    pub pet: Option<AchievementPet>,
}

/// A named group of achievements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementGroup {
    /// Achievements in the group.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

/// Result of `GET /public/achievement/list`, keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook(pub BTreeMap<String, AchievementGroup>);

impl AchievementBook {
    /// Group holding the pet mixing collection.
    pub const MIX_PET: &'static str = "MIX_PET";

    /// Completed achievements whose reward is still unclaimed.
    pub fn claimable(&self) -> Vec<AchievementId> {
        self.0
            .values()
            .flat_map(|group| &group.achievements)
            .filter(|a| a.status && !a.claimed)
            .map(|a| a.quest_id)
            .collect()
    }

    /// Packed pair ids of mixing collection entries not completed yet.
    pub fn outstanding_mix_goals(&self) -> Vec<u64> {
        self.0
            .get(Self::MIX_PET)
            .map(|group| {
                group
                    .achievements
                    .iter()
                    .filter(|a| !a.status)
                    .filter_map(|a| a.pet.map(|pet| pet.pet_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A free-track season pass reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonReward {
    /// Step at which the reward unlocks.
    pub step: u32,
    /// Whether it was claimed.
    #[serde(default)]
    pub is_claimed: bool,
    /// Reward quantity.
    #[serde(default)]
    pub amount: u64,
    /// Reward name.
    #[serde(default)]
    pub name: String,
}

/// A season pass from `GET /public/season-pass/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonPass {
    /// Season identity.
    pub season_id: u64,
    /// Progress on the pass.
    pub current_step: u32,
    /// Season title.
    pub title: String,
    /// Free-track rewards.
    pub free_rewards: Vec<SeasonReward>,
}

impl SeasonPass {
    /// Free rewards that are unlocked and not yet claimed.
    pub fn claimable_rewards(&self) -> impl Iterator<Item = &SeasonReward> {
        self.free_rewards
            .iter()
            .filter(|reward| reward.step <= self.current_step && !reward.is_claimed)
    }
}
