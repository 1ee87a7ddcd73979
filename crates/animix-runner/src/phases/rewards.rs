//! Quests, clan membership, achievements, and the season pass.

use std::collections::BTreeSet;

use animix_types::QuestBoard;
use tracing::info;

use super::tolerate;
use crate::client::ApiClient;
use crate::error::RunnerError;

/// What to do about clan membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClanAction {
    /// Already in the target clan, or no target configured.
    Stay,
    /// Not in a clan yet.
    Join(u64),
    /// In another clan: leave it first.
    Switch {
        /// Clan to leave.
        from: u64,
        /// Clan to join.
        to: u64,
    },
}

/// Decide the clan move for an account.
pub const fn clan_action(current: Option<u64>, target: Option<u64>) -> ClanAction {
    match (current, target) {
        (_, None) => ClanAction::Stay,
        (None, Some(to)) => ClanAction::Join(to),
        (Some(from), Some(to)) if from != to => ClanAction::Switch { from, to },
        (Some(_), Some(_)) => ClanAction::Stay,
    }
}

/// Quest codes still open and not configured to be skipped.
pub fn pending_quests(board: &QuestBoard, skip: &BTreeSet<String>) -> Vec<String> {
    board
        .quests
        .iter()
        .filter(|q| !q.status && !skip.contains(&q.quest_code))
        .map(|q| q.quest_code.clone())
        .collect()
}

/// Check in every pending quest.
///
/// # Errors
///
/// Returns only an authentication failure.
pub async fn check_quests(client: &ApiClient, skip: &BTreeSet<String>) -> Result<(), RunnerError> {
    let Some(board) = tolerate("quests", client.quests().await)? else {
        return Ok(());
    };
    let pending = pending_quests(&board, skip);
    info!(pending = pending.len(), "checking quests");

    for code in &pending {
        client.pace().await;
        if tolerate("check quest", client.check_quest(code).await)?.is_some() {
            info!(quest = %code, "quest checked");
        }
    }
    Ok(())
}

/// Move the account into the configured clan.
///
/// # Errors
///
/// Returns the failed quit or join.
pub async fn settle_clan(
    client: &ApiClient,
    current: Option<u64>,
    target: Option<u64>,
) -> Result<(), RunnerError> {
    match clan_action(current, target) {
        ClanAction::Stay => {}
        ClanAction::Join(to) => {
            client.join_clan(to).await?;
            info!(clan_id = to, "joined clan");
        }
        ClanAction::Switch { from, to } => {
            client.quit_clan(from).await?;
            client.pace().await;
            client.join_clan(to).await?;
            info!(from = from, clan_id = to, "switched clan");
        }
    }
    Ok(())
}

/// Claim every completed achievement.
///
/// # Errors
///
/// Returns only an authentication failure.
pub async fn claim_achievements(client: &ApiClient) -> Result<(), RunnerError> {
    let Some(book) = tolerate("achievements", client.achievements().await)? else {
        return Ok(());
    };
    for quest_id in book.claimable() {
        client.pace().await;
        if tolerate("claim achievement", client.claim_achievement(quest_id).await)?.is_some() {
            info!(quest_id = %quest_id, "claimed achievement");
        }
    }
    Ok(())
}

/// Claim every unlocked free season pass reward.
///
/// # Errors
///
/// Returns only an authentication failure.
pub async fn claim_season_pass(client: &ApiClient) -> Result<(), RunnerError> {
    let Some(passes) = tolerate("season passes", client.season_passes().await)? else {
        return Ok(());
    };
    for pass in &passes {
        for reward in pass.claimable_rewards() {
            client.pace().await;
            let claimed = client.claim_season_reward(pass.season_id, reward.step).await;
            if tolerate("claim season reward", claimed)?.is_some() {
                info!(
                    season = %pass.title,
                    step = reward.step,
                    reward = %reward.name,
                    amount = reward.amount,
                    "claimed season reward"
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clan_moves() {
        assert_eq!(clan_action(None, None), ClanAction::Stay);
        assert_eq!(clan_action(Some(9), None), ClanAction::Stay);
        assert_eq!(clan_action(None, Some(178)), ClanAction::Join(178));
        assert_eq!(clan_action(Some(178), Some(178)), ClanAction::Stay);
        assert_eq!(
            clan_action(Some(9), Some(178)),
            ClanAction::Switch { from: 9, to: 178 }
        );
    }

    #[test]
    fn done_and_skipped_quests_are_not_checked() {
        let board: QuestBoard = serde_json::from_str(
            r#"{"quests": [
                {"quest_code": "DAILY_LOGIN", "status": false},
                {"quest_code": "JOIN_CHANNEL", "status": false},
                {"quest_code": "MIX_PET", "status": true}
            ]}"#,
        )
        .unwrap();
        let skip = BTreeSet::from(["JOIN_CHANNEL".to_owned()]);
        assert_eq!(pending_quests(&board, &skip), vec!["DAILY_LOGIN".to_owned()]);
    }

    #[test]
    fn a_single_pending_quest_is_checked() {
        let board: QuestBoard =
            serde_json::from_str(r#"{"quests": [{"quest_code": "DAILY_LOGIN"}]}"#).unwrap();
        assert_eq!(pending_quests(&board, &BTreeSet::new()).len(), 1);
    }
}
