//! A whole allocation pass against an in-memory gateway.
//!
//! Snapshots are decoded from API-shaped JSON, indexed, allocated, and
//! committed, the way the runner drives the engine for one account.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::cell::RefCell;
use std::collections::BTreeSet;

use animix_engine::{
    AdvantageTable, AttackPlan, BreedingPools, CommitGateway, InventoryIndex, MissionAssignment,
    MissionPlanner, Pairing, PairingGoal, PairingStop, allocate_missions, commit_pairings,
    plan_goal_pairings, plan_random_pairings, resolve_roster, select_attack_team,
};
use animix_types::{
    AchievementBook, AttackOutcome, Mission, MissionId, MixedPet, OpponentPetRef, Pet,
    PetCatalogEntry, PetDna, PetId, Ticket,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Default)]
struct RecordingGateway {
    missions: RefCell<Vec<MissionAssignment>>,
    pairings: RefCell<Vec<Pairing>>,
    attacks: RefCell<Vec<AttackPlan>>,
}

impl CommitGateway for RecordingGateway {
    type Error = String;

    async fn commit_mission(&self, assignment: &MissionAssignment) -> Result<(), String> {
        self.missions.borrow_mut().push(*assignment);
        Ok(())
    }

    async fn commit_pairing(&self, pairing: &Pairing) -> Result<Option<MixedPet>, String> {
        self.pairings.borrow_mut().push(*pairing);
        Ok(None)
    }

    async fn commit_attack(&self, plan: &AttackPlan) -> Result<AttackOutcome, String> {
        self.attacks.borrow_mut().push(*plan);
        Ok(AttackOutcome {
            is_win: true,
            rounds: Vec::new(),
            score: 10,
            ticket: Ticket { amount: 0 },
        })
    }
}

fn pets() -> Vec<Pet> {
    serde_json::from_value(serde_json::json!([
        {"pet_id": 1, "name": "Pebble", "class": "Earth", "star": 5, "level": 3, "amount": 1},
        {"pet_id": 2, "name": "Drop", "class": "Water", "star": 3, "level": 1, "amount": 1}
    ]))
    .unwrap()
}

#[tokio::test]
async fn single_slot_mission_commits_with_empty_slots_as_none() {
    let missions: Vec<Mission> = serde_json::from_value(serde_json::json!([
        {"mission_id": 77, "name": "Dig", "pet_1_class": "Earth", "pet_1_star": 5}
    ]))
    .unwrap();
    let pets = pets();
    let index =
        InventoryIndex::from_snapshots(Some(pets.as_slice()), Some(missions.as_slice())).unwrap();
    let mut planner = MissionPlanner::new(&missions, index.pool(), &BTreeSet::new());
    let gateway = RecordingGateway::default();

    let report = allocate_missions(&gateway, &mut planner).await;

    assert_eq!(report.entered.len(), 1);
    assert_eq!(
        gateway.missions.borrow().as_slice(),
        &[MissionAssignment {
            mission_id: MissionId(77),
            pet_ids: [Some(PetId(1)), None, None],
        }]
    );
    assert_eq!(planner.pool().remaining(PetId(1)), 0);
    assert_eq!(planner.pool().remaining(PetId(2)), 1);
}

#[tokio::test]
async fn running_missions_hold_their_units_across_the_pass() {
    let missions: Vec<Mission> = serde_json::from_value(serde_json::json!([
        {"mission_id": 1, "pet_1_class": "Earth", "pet_1_star": 1,
         "pet_joined": [{"pet_id": 1}], "can_completed": false},
        {"mission_id": 2, "pet_1_class": "Earth", "pet_1_star": 1},
        {"mission_id": 3, "pet_1_class": "Water", "pet_1_star": 2}
    ]))
    .unwrap();
    let index = InventoryIndex::build(&pets(), &missions);
    let mut planner = MissionPlanner::new(&missions, index.pool(), &BTreeSet::new());
    let gateway = RecordingGateway::default();

    let report = allocate_missions(&gateway, &mut planner).await;

    let entered: Vec<MissionId> = report.entered.iter().map(|a| a.mission_id).collect();
    assert_eq!(entered, vec![MissionId(3)]);
    assert!(planner.pool().is_empty());
}

#[test]
fn attack_with_two_pets_is_infeasible() {
    let catalog = [PetCatalogEntry {
        pet_id: PetId(900),
        class: animix_types::PetClass::Earth,
        star: 4,
    }];
    let roster = resolve_roster(&[OpponentPetRef { pet_id: PetId(900), level: 2 }], &catalog);
    let own: Vec<Pet> = serde_json::from_value(serde_json::json!([
        {"pet_id": 5, "class": "Water", "star": 5, "level": 10, "amount": 1},
        {"pet_id": 6, "class": "Earth", "star": 6, "level": 1, "amount": 1}
    ]))
    .unwrap();

    assert!(select_attack_team(&roster, &own, &AdvantageTable::default()).is_err());
}

#[tokio::test]
async fn attack_team_is_committed_as_planned() {
    let catalog = [PetCatalogEntry {
        pet_id: PetId(900),
        class: animix_types::PetClass::Earth,
        star: 4,
    }];
    let roster = resolve_roster(&[OpponentPetRef { pet_id: PetId(900), level: 2 }], &catalog);
    let own: Vec<Pet> = serde_json::from_value(serde_json::json!([
        {"pet_id": 5, "class": "Water", "star": 5, "level": 10, "amount": 1},
        {"pet_id": 6, "class": "Earth", "star": 6, "level": 1, "amount": 1},
        {"pet_id": 7, "class": "Wind", "star": 1, "level": 1, "amount": 1}
    ]))
    .unwrap();
    let team = select_attack_team(&roster, &own, &AdvantageTable::default()).unwrap();
    let gateway = RecordingGateway::default();
    let plan = AttackPlan {
        opponent_id: animix_types::OpponentId(42),
        pet_ids: team.picks,
    };

    let outcome = gateway.commit_attack(&plan).await.unwrap();

    assert_eq!(team.picks, [PetId(6), PetId(5), PetId(7)]);
    assert!(outcome.is_win);
    assert_eq!(gateway.attacks.borrow().len(), 1);
}

#[tokio::test]
async fn collection_goals_drive_mixing() {
    let dna: Vec<PetDna> = serde_json::from_value(serde_json::json!([
        {"item_id": 101, "name": "Bear", "class": "Earth", "star": 1, "can_mom": false, "amount": 1},
        {"item_id": 105, "name": "Owl", "class": "Wind", "star": 1, "can_mom": true, "amount": 1}
    ]))
    .unwrap();
    let book: AchievementBook = serde_json::from_value(serde_json::json!({
        "MIX_PET": {"achievements": [
            {"quest_id": 1, "status": false, "pet": {"pet_id": 101_105}},
            {"quest_id": 2, "status": false, "pet": {"pet_id": 12}}
        ]}
    }))
    .unwrap();

    let goals: Vec<PairingGoal> = book
        .outstanding_mix_goals()
        .into_iter()
        .filter_map(|packed| PairingGoal::from_packed(packed).ok())
        .collect();
    assert_eq!(goals.len(), 1);

    let pools = BreedingPools::from_dna(&dna, &BTreeSet::new());
    let plan = plan_goal_pairings(&pools, &goals);
    let gateway = RecordingGateway::default();
    let report = commit_pairings(&gateway, &plan).await;

    assert_eq!(report.mixed.len(), 1);
    assert_eq!(gateway.pairings.borrow()[0].dad.into_inner(), 101);
}

#[tokio::test]
async fn no_mom_capable_dna_commits_nothing() {
    let dna: Vec<PetDna> = serde_json::from_value(serde_json::json!([
        {"item_id": 101, "name": "Bear", "can_mom": false, "amount": 3}
    ]))
    .unwrap();
    let pools = BreedingPools::from_dna(&dna, &BTreeSet::new());
    let plan = plan_random_pairings(&pools, &mut SmallRng::seed_from_u64(1));
    let gateway = RecordingGateway::default();

    let report = commit_pairings(&gateway, &plan).await;

    assert_eq!(plan.stop, PairingStop::NoPartner);
    assert!(report.mixed.is_empty());
    assert!(gateway.pairings.borrow().is_empty());
}
