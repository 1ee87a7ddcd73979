//! Allocation engine for the Animix automation client.
//!
//! Given one pass's snapshot of owned pets, DNA, missions, and opponents,
//! the engine decides what to commit: which pets enter which missions,
//! which three pets attack, and which DNA units get mixed. Decisions are
//! pure functions over the snapshot; side effects go through the
//! [`CommitGateway`] trait, which the runner implements over HTTP.
//!
//! # Modules
//!
//! - [`inventory`] -- Stack expansion, mission deductions, the unit pool
//! - [`missions`] -- Greedy last-to-first mission allocation
//! - [`battle`] -- Attack and defense team selection, the attack loop
//! - [`pairing`] -- Goal-directed and random DNA pairing
//! - [`gateway`] -- The commit seam
//! - [`error`] -- Engine error types

pub mod battle;
pub mod error;
pub mod gateway;
pub mod inventory;
pub mod missions;
pub mod pairing;

pub use battle::{
    AdvantageTable, AttackReport, AttackStop, BattleTeam, TEAM_SIZE, resolve_roster, run_attacks,
    select_attack_team, select_defense_team,
};
pub use error::EngineError;
pub use gateway::{ArenaGateway, AttackPlan, CommitGateway, Matchup, MissionAssignment};
pub use inventory::{ClassStar, InventoryIndex, UnitPool};
pub use missions::{MissionPlanner, MissionReport, allocate_missions};
pub use pairing::{
    BreedingPools, Pairing, PairingGoal, PairingPlan, PairingReport, PairingStop, commit_pairings,
    plan_goal_pairings, plan_random_pairings,
};
