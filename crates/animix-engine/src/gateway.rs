//! The commit seam between the allocation engine and the game API.
//!
//! Allocators decide; a [`CommitGateway`] performs the side effect. The
//! runner's HTTP client implements this trait, tests use in-memory fakes.
//! Every commit is awaited before the next decision is taken, so two
//! commits for the same account never race.

use core::fmt::Display;
use core::future::Future;

use animix_types::{AttackOutcome, MissionId, MixedPet, Opponent, OpponentId, Pet, PetId};

use crate::pairing::Pairing;

/// Units chosen for one mission, in slot order; empty slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionAssignment {
    /// Mission to enter.
    pub mission_id: MissionId,
    /// Pet per slot.
    pub pet_ids: [Option<PetId>; 3],
}

impl MissionAssignment {
    /// The units this assignment consumes.
    pub fn units(&self) -> impl Iterator<Item = PetId> + '_ {
        self.pet_ids.iter().flatten().copied()
    }
}

/// A three-pet attack against one opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPlan {
    /// Target account.
    pub opponent_id: OpponentId,
    /// Attackers in submission order.
    pub pet_ids: [PetId; 3],
}

/// Side-effecting calls the allocators drive.
///
/// Implementations must not retry commits on their own beyond the
/// transport's bounded retry: none of these calls is idempotent.
pub trait CommitGateway {
    /// Error reported by a failed commit; only logged by the engine.
    type Error: Display;

    /// Enter a mission with the given units.
    fn commit_mission(
        &self,
        assignment: &MissionAssignment,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Mix two DNA units, returning the pet produced if the server reports it.
    fn commit_pairing(
        &self,
        pairing: &Pairing,
    ) -> impl Future<Output = Result<Option<MixedPet>, Self::Error>>;

    /// Attack an opponent.
    fn commit_attack(
        &self,
        plan: &AttackPlan,
    ) -> impl Future<Output = Result<AttackOutcome, Self::Error>>;
}

/// An opponent drawn from the arena and the pets owned when it was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    /// Opponent account and its roster, unresolved.
    pub opponent: Opponent,
    /// Pets available to answer it.
    pub own: Vec<Pet>,
}

/// The arena side of the gateway: drawing opponents and pausing between
/// attacks. Attacks themselves go through [`CommitGateway::commit_attack`].
pub trait ArenaGateway: CommitGateway {
    /// Draw the next opponent together with a fresh view of owned pets.
    fn draw_matchup(&self) -> impl Future<Output = Result<Matchup, Self::Error>>;

    /// Wait between two attacks.
    fn rest(&self) -> impl Future<Output = ()>;

    /// Whether an error ends the attack loop instead of costing one attempt.
    fn is_fatal(&self, error: &Self::Error) -> bool;
}
