//! DNA mixing, goal-directed or random.

use std::collections::BTreeSet;

use animix_engine::{
    BreedingPools, PairingGoal, PairingPlan, PairingReport, PairingStop, commit_pairings,
    plan_goal_pairings, plan_random_pairings,
};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::RunnerError;

/// Decode packed collection goals, dropping malformed ones.
pub fn decode_goals(packed: &[u64]) -> Vec<PairingGoal> {
    packed
        .iter()
        .filter_map(|value| match PairingGoal::from_packed(*value) {
            Ok(goal) => Some(goal),
            Err(e) => {
                warn!(error = %e, "skipping collection goal");
                None
            }
        })
        .collect()
}

/// Describe why a pairing plan stopped.
pub const fn stop_reason(stop: PairingStop) -> &'static str {
    match stop {
        PairingStop::Exhausted => "pools exhausted",
        PairingStop::NoPartner => "no partner left",
        PairingStop::NoMatchingGoals => "no goal matches owned DNA",
    }
}

fn log_plan(plan: &PairingPlan) {
    info!(pairs = plan.pairs.len(), stop = stop_reason(plan.stop), "mix plan ready");
}

/// Mix towards the outstanding `MIX_PET` collection goals.
///
/// # Errors
///
/// Returns a failed DNA or achievement fetch.
pub async fn merge_towards_goals(
    client: &ApiClient,
    skip: &BTreeSet<String>,
) -> Result<PairingReport, RunnerError> {
    let dna = client.dna().await?;
    let book = client.achievements().await?;

    let goals = decode_goals(&book.outstanding_mix_goals());
    let pools = BreedingPools::from_dna(&dna, skip);
    info!(
        goals = goals.len(),
        moms = pools.moms().len(),
        dads = pools.dads().len(),
        "planning collection mixes"
    );

    let plan = plan_goal_pairings(&pools, &goals);
    log_plan(&plan);
    Ok(commit_pairings(client, &plan).await)
}

/// Mix random mom and dad units until one side runs out.
///
/// # Errors
///
/// Returns a failed DNA fetch.
pub async fn merge_randomly(
    client: &ApiClient,
    skip: &BTreeSet<String>,
) -> Result<PairingReport, RunnerError> {
    let dna = client.dna().await?;
    let pools = BreedingPools::from_dna(&dna, skip);
    info!(moms = pools.moms().len(), dads = pools.dads().len(), "planning random mixes");

    let plan = plan_random_pairings(&pools, &mut rand::rng());
    log_plan(&plan);
    Ok(commit_pairings(client, &plan).await)
}

#[cfg(test)]
mod tests {
    use animix_types::DnaKindId;

    use super::*;

    #[test]
    fn malformed_goals_are_dropped() {
        let goals = decode_goals(&[101_105, 99, 200_300]);
        assert_eq!(goals.len(), 2);
        assert_eq!(goals.first().map(|g| g.mom), Some(DnaKindId(105)));
    }
}
