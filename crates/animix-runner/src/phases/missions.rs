//! Mission claiming and allocation.

use std::collections::BTreeSet;

use animix_engine::{InventoryIndex, MissionPlanner, allocate_missions};
use animix_types::{Mission, MissionId};
use tracing::{info, warn};

use super::tolerate;
use crate::client::ApiClient;
use crate::error::RunnerError;

/// Finished missions to claim, minus the configured skips.
pub fn claimable(missions: &[Mission], skip: &BTreeSet<MissionId>) -> Vec<MissionId> {
    missions
        .iter()
        .filter(|m| m.is_claimable() && !skip.contains(&m.mission_id))
        .map(|m| m.mission_id)
        .collect()
}

/// Claim finished missions, then fill every open mission the inventory can
/// staff.
///
/// Allocation is skipped for the pass when either snapshot could not be
/// fetched after claiming.
///
/// # Errors
///
/// Returns only an authentication failure.
pub async fn run(
    client: &ApiClient,
    claim_skip: &BTreeSet<MissionId>,
    mission_skip: &BTreeSet<MissionId>,
) -> Result<(), RunnerError> {
    if let Some(missions) = tolerate("missions", client.missions().await)? {
        for mission_id in claimable(&missions, claim_skip) {
            client.pace().await;
            if tolerate("claim mission", client.claim_mission(mission_id).await)?.is_some() {
                info!(mission_id = %mission_id, "claimed mission");
            }
        }
    }

    // Claiming frees units, so both snapshots are taken again.
    client.pace().await;
    let missions = tolerate("missions", client.missions().await)?;
    let pets = tolerate("pets", client.pets().await)?;

    let index = match InventoryIndex::from_snapshots(pets.as_deref(), missions.as_deref()) {
        Ok(index) => index,
        Err(e) => {
            warn!(error = %e, "skipping mission allocation");
            return Ok(());
        }
    };

    let missions = missions.unwrap_or_default();
    let mut planner = MissionPlanner::new(&missions, index.pool(), mission_skip);
    info!(
        open = planner.pending(),
        units = index.available_units().len(),
        "allocating missions"
    );

    let report = allocate_missions(client, &mut planner).await;
    info!(
        entered = report.entered.len(),
        rejected = report.rejected.len(),
        "mission allocation done"
    );
    Ok(())
}
