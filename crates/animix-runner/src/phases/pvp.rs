//! Arena: defense team upkeep and the attack loop.

use animix_engine::{AdvantageTable, TEAM_SIZE, run_attacks, select_defense_team};
use animix_types::BattleInfo;
use tracing::info;

use super::tolerate;
use crate::client::ApiClient;
use crate::error::RunnerError;

/// How many attacks one pass may start.
///
/// A finished season allows none.
pub const fn attack_budget(info: &BattleInfo) -> u32 {
    if info.is_end_season { 0 } else { info.ticket.amount }
}

/// Run the arena for one pass.
///
/// # Errors
///
/// Returns only an authentication failure.
pub async fn run(client: &ApiClient) -> Result<(), RunnerError> {
    let Some(info) = tolerate("battle info", client.battle_info().await)? else {
        return Ok(());
    };
    info!(
        score = info.score,
        wins = info.win_match,
        tier = %info.tier_name,
        tickets = info.ticket.amount,
        "arena status"
    );
    if info.is_end_season {
        info!("arena season has ended");
        return Ok(());
    }

    if info.defense_ids().len() < TEAM_SIZE {
        refresh_defense(client, &info).await?;
    }

    let budget = attack_budget(&info);
    if budget == 0 {
        info!("no attack tickets");
        return Ok(());
    }
    let Some(catalog) = tolerate("pet catalog", client.pet_catalog().await)? else {
        return Ok(());
    };

    let report = run_attacks(client, budget, &catalog, &AdvantageTable::default()).await?;
    info!(
        attempts = report.attempts,
        fought = report.fought.len(),
        wins = report.wins(),
        failed = report.failed.len(),
        stop = ?report.stop,
        "attacks done"
    );
    Ok(())
}

async fn refresh_defense(client: &ApiClient, info: &BattleInfo) -> Result<(), RunnerError> {
    let Some(pets) = tolerate("pets", client.pets().await)? else {
        return Ok(());
    };
    let Some(team) = select_defense_team(&pets, &info.defense_ids()) else {
        info!("defense team unchanged");
        return Ok(());
    };
    client.pace().await;
    if tolerate("set defense team", client.set_defense_team(team).await)?.is_some() {
        info!(team = ?team, "defense team set");
    }
    Ok(())
}
