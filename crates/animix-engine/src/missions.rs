//! Mission allocation: greedy assignment of free units to open missions.
//!
//! Candidates are scanned from the last mission to the first. The first
//! mission whose every non-empty slot can be filled wins, its units are
//! reserved, it is committed, and the scan restarts against the reduced
//! pool. The loop ends when no remaining candidate can be filled.
//!
//! A rejected commit puts the mission on the skip-set for the rest of the
//! pass; the units chosen for it stay reserved so the same units are never
//! submitted twice.

use std::collections::BTreeSet;

use animix_types::{Mission, MissionId, PetId};
use tracing::{debug, info, warn};

use crate::gateway::{CommitGateway, MissionAssignment};
use crate::inventory::UnitPool;

/// Work queue of open missions plus the pool they draw from.
#[derive(Debug, Clone)]
pub struct MissionPlanner {
    /// Open missions in the order the server listed them.
    queue: Vec<Mission>,
    /// Free units.
    pool: UnitPool,
    /// Missions never to be tried again this pass.
    skipped: BTreeSet<MissionId>,
}

impl MissionPlanner {
    /// Queue every mission that is open and not on the skip-set.
    ///
    /// Missions already holding units are immutable remote state and never
    /// enter the queue.
    pub fn new(missions: &[Mission], pool: UnitPool, skip: &BTreeSet<MissionId>) -> Self {
        let queue = missions
            .iter()
            .filter(|m| !m.has_joined_pets() && !skip.contains(&m.mission_id))
            .cloned()
            .collect();
        Self {
            queue,
            pool,
            skipped: skip.clone(),
        }
    }

    /// Missions still waiting for an assignment.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The pool as it stands after the reservations made so far.
    pub const fn pool(&self) -> &UnitPool {
        &self.pool
    }

    /// Missions excluded for the rest of the pass.
    pub const fn skipped(&self) -> &BTreeSet<MissionId> {
        &self.skipped
    }

    /// Pick the next satisfiable mission, newest first, and reserve its units.
    ///
    /// The chosen mission leaves the queue. Returns `None` once nothing left
    /// in the queue can be filled from the pool.
    pub fn next_assignment(&mut self) -> Option<MissionAssignment> {
        let (position, assignment) = self
            .queue
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, mission)| !self.skipped.contains(&mission.mission_id))
            .find_map(|(position, mission)| {
                fill_slots(mission, &self.pool).map(|assignment| (position, assignment))
            })?;

        self.queue.remove(position);
        for id in assignment.units() {
            // fill_slots only returns units with a free copy.
            self.pool.take(id);
        }
        Some(assignment)
    }

    /// Exclude a mission for the rest of the pass.
    pub fn skip(&mut self, mission_id: MissionId) {
        self.skipped.insert(mission_id);
        self.queue.retain(|m| m.mission_id != mission_id);
    }
}

/// Try to fill every non-empty slot of a mission with distinct free stacks.
fn fill_slots(mission: &Mission, pool: &UnitPool) -> Option<MissionAssignment> {
    let mut pet_ids: [Option<PetId>; 3] = [None; 3];
    let mut chosen: Vec<PetId> = Vec::with_capacity(3);

    for (slot, requirement) in pet_ids.iter_mut().zip(mission.slots()) {
        let Some(requirement) = requirement else {
            continue;
        };
        let id = pool.find(requirement, &chosen)?;
        chosen.push(id);
        *slot = Some(id);
    }

    if chosen.is_empty() {
        // A mission without requirements has nothing to enter with.
        return None;
    }

    Some(MissionAssignment {
        mission_id: mission.mission_id,
        pet_ids,
    })
}

/// What one allocation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionReport {
    /// Assignments the server accepted, in commit order.
    pub entered: Vec<MissionAssignment>,
    /// Missions whose commit was rejected.
    pub rejected: Vec<MissionId>,
}

/// Drive the planner to exhaustion, committing each assignment in turn.
///
/// Commits run strictly one after another. A rejected commit skips the
/// mission for the rest of the pass without releasing its units.
pub async fn allocate_missions<G: CommitGateway>(
    gateway: &G,
    planner: &mut MissionPlanner,
) -> MissionReport {
    let mut report = MissionReport::default();

    while let Some(assignment) = planner.next_assignment() {
        debug!(
            mission_id = %assignment.mission_id,
            pets = ?assignment.pet_ids,
            units_left = planner.pool().total_units(),
            "entering mission"
        );
        match gateway.commit_mission(&assignment).await {
            Ok(()) => {
                info!(mission_id = %assignment.mission_id, "entered mission");
                report.entered.push(assignment);
            }
            Err(e) => {
                warn!(
                    mission_id = %assignment.mission_id,
                    error = %e,
                    "entering mission failed, skipping it for this pass"
                );
                planner.skip(assignment.mission_id);
                report.rejected.push(assignment.mission_id);
            }
        }
    }

    info!(
        entered = report.entered.len(),
        rejected = report.rejected.len(),
        pending = planner.pending(),
        "no further mission matches"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use animix_types::{AttackOutcome, JoinedPet, MixedPet, Pet, PetClass};

    use super::*;
    use crate::gateway::AttackPlan;
    use crate::inventory::InventoryIndex;
    use crate::pairing::Pairing;

    #[derive(Default)]
    struct FakeGateway {
        reject: BTreeSet<MissionId>,
        committed: RefCell<Vec<MissionAssignment>>,
    }

    impl CommitGateway for FakeGateway {
        type Error = String;

        async fn commit_mission(&self, assignment: &MissionAssignment) -> Result<(), String> {
            self.committed.borrow_mut().push(*assignment);
            if self.reject.contains(&assignment.mission_id) {
                Err("rejected".to_owned())
            } else {
                Ok(())
            }
        }

        async fn commit_pairing(&self, _pairing: &Pairing) -> Result<Option<MixedPet>, String> {
            Ok(None)
        }

        async fn commit_attack(&self, _plan: &AttackPlan) -> Result<AttackOutcome, String> {
            Ok(AttackOutcome::default())
        }
    }

    fn pet(id: u64, class: PetClass, star: u32, amount: u32) -> Pet {
        Pet {
            pet_id: PetId(id),
            name: String::new(),
            class,
            star,
            level: 1,
            amount,
        }
    }

    fn mission(id: u64, slots: [Option<(PetClass, u32)>; 3]) -> Mission {
        let [s1, s2, s3] = slots;
        Mission {
            mission_id: MissionId(id),
            name: format!("mission-{id}"),
            pet_1_class: s1.map(|s| s.0),
            pet_1_star: s1.map(|s| s.1),
            pet_2_class: s2.map(|s| s.0),
            pet_2_star: s2.map(|s| s.1),
            pet_3_class: s3.map(|s| s.0),
            pet_3_star: s3.map(|s| s.1),
            pet_joined: None,
            can_completed: None,
        }
    }

    fn planner(pets: &[Pet], missions: &[Mission]) -> MissionPlanner {
        let pool = InventoryIndex::build(pets, missions).pool();
        MissionPlanner::new(missions, pool, &BTreeSet::new())
    }

    #[test]
    fn single_slot_mission_gets_matching_unit() {
        let pets = [pet(1, PetClass::Earth, 5, 1), pet(2, PetClass::Water, 3, 1)];
        let missions = [mission(7, [Some((PetClass::Earth, 5)), None, None])];
        let mut planner = planner(&pets, &missions);

        let assignment = planner.next_assignment().unwrap();
        assert_eq!(assignment.mission_id, MissionId(7));
        assert_eq!(assignment.pet_ids, [Some(PetId(1)), None, None]);
        assert!(planner.next_assignment().is_none());
    }

    #[test]
    fn last_mission_is_preferred_when_scarce() {
        let pets = [pet(1, PetClass::Wind, 2, 1)];
        let missions = [
            mission(1, [Some((PetClass::Wind, 1)), None, None]),
            mission(2, [Some((PetClass::Wind, 2)), None, None]),
        ];
        let mut planner = planner(&pets, &missions);

        assert_eq!(planner.next_assignment().map(|a| a.mission_id), Some(MissionId(2)));
        assert!(planner.next_assignment().is_none());
        assert_eq!(planner.pending(), 1);
    }

    #[test]
    fn partially_fillable_mission_is_skipped() {
        let pets = [pet(1, PetClass::Earth, 3, 1), pet(2, PetClass::Water, 3, 1)];
        let missions = [
            mission(1, [Some((PetClass::Earth, 1)), None, None]),
            mission(
                2,
                [Some((PetClass::Earth, 1)), Some((PetClass::Wind, 1)), None],
            ),
        ];
        let mut planner = planner(&pets, &missions);

        let first = planner.next_assignment().unwrap();
        assert_eq!(first.mission_id, MissionId(1));
        assert_eq!(planner.pool().remaining(PetId(1)), 0);
        assert_eq!(planner.pool().remaining(PetId(2)), 1);
    }

    #[test]
    fn same_stack_never_fills_two_slots_of_one_mission() {
        let pets = [pet(1, PetClass::Earth, 4, 3)];
        let missions = [mission(
            1,
            [Some((PetClass::Earth, 1)), Some((PetClass::Earth, 1)), None],
        )];
        let mut planner = planner(&pets, &missions);
        assert!(planner.next_assignment().is_none());
        assert_eq!(planner.pool().total_units(), 3);
    }

    #[test]
    fn stacked_units_serve_several_missions() {
        let pets = [pet(1, PetClass::Earth, 4, 2)];
        let missions = [
            mission(1, [Some((PetClass::Earth, 1)), None, None]),
            mission(2, [Some((PetClass::Earth, 1)), None, None]),
            mission(3, [Some((PetClass::Earth, 1)), None, None]),
        ];
        let mut planner = planner(&pets, &missions);

        let mut entered = Vec::new();
        while let Some(a) = planner.next_assignment() {
            entered.push(a.mission_id);
        }
        assert_eq!(entered, vec![MissionId(3), MissionId(2)]);
        assert_eq!(planner.pool().total_units(), 0);
    }

    #[test]
    fn missions_holding_units_and_skip_set_are_ignored() {
        let pets = [pet(1, PetClass::Earth, 4, 2)];
        let mut running = mission(1, [Some((PetClass::Earth, 1)), None, None]);
        running.pet_joined = Some(vec![JoinedPet { pet_id: PetId(1) }]);
        let missions = [
            running,
            mission(2, [Some((PetClass::Earth, 1)), None, None]),
            mission(3, [Some((PetClass::Earth, 1)), None, None]),
        ];
        let pool = InventoryIndex::build(&pets, &missions).pool();
        assert_eq!(pool.total_units(), 1);

        let skip: BTreeSet<MissionId> = [MissionId(3)].into_iter().collect();
        let mut planner = MissionPlanner::new(&missions, pool, &skip);
        assert_eq!(planner.pending(), 1);
        assert_eq!(planner.next_assignment().map(|a| a.mission_id), Some(MissionId(2)));
    }

    #[test]
    fn pool_shrinks_by_units_consumed() {
        let pets = [
            pet(1, PetClass::Earth, 2, 1),
            pet(2, PetClass::Water, 2, 1),
            pet(3, PetClass::Wind, 2, 1),
            pet(4, PetClass::Wind, 2, 1),
        ];
        let missions = [mission(
            1,
            [
                Some((PetClass::Earth, 1)),
                Some((PetClass::Water, 2)),
                Some((PetClass::Wind, 1)),
            ],
        )];
        let mut planner = planner(&pets, &missions);
        let before = planner.pool().total_units();
        let assignment = planner.next_assignment().unwrap();
        let consumed = u64::try_from(assignment.units().count()).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(planner.pool().total_units(), before.saturating_sub(consumed));
    }

    #[tokio::test]
    async fn allocation_commits_each_match_once() {
        let pets = [pet(1, PetClass::Earth, 5, 1), pet(2, PetClass::Water, 3, 1)];
        let missions = [
            mission(10, [Some((PetClass::Water, 3)), None, None]),
            mission(11, [Some((PetClass::Earth, 5)), None, None]),
        ];
        let gateway = FakeGateway::default();
        let mut planner = planner(&pets, &missions);

        let report = allocate_missions(&gateway, &mut planner).await;
        assert_eq!(report.entered.len(), 2);
        assert!(report.rejected.is_empty());

        let committed = gateway.committed.borrow();
        assert_eq!(committed.first().map(|a| a.mission_id), Some(MissionId(11)));
        let mut units: Vec<PetId> = committed
            .iter()
            .flat_map(|a| a.units().collect::<Vec<_>>())
            .collect();
        units.sort();
        units.dedup();
        assert_eq!(units, vec![PetId(1), PetId(2)]);
    }

    #[tokio::test]
    async fn rejected_commit_keeps_units_reserved() {
        let pets = [pet(1, PetClass::Earth, 5, 1)];
        let missions = [
            mission(1, [Some((PetClass::Earth, 1)), None, None]),
            mission(2, [Some((PetClass::Earth, 1)), None, None]),
        ];
        let gateway = FakeGateway {
            reject: [MissionId(2)].into_iter().collect(),
            ..FakeGateway::default()
        };
        let mut planner = planner(&pets, &missions);

        let report = allocate_missions(&gateway, &mut planner).await;
        assert_eq!(report.rejected, vec![MissionId(2)]);
        assert!(report.entered.is_empty());
        assert!(planner.skipped().contains(&MissionId(2)));
        // The unit tried for mission 2 is not offered to mission 1.
        assert_eq!(gateway.committed.borrow().len(), 1);
    }
}
