//! PvP arena payloads.

use serde::{Deserialize, Serialize};

use crate::enums::PetClass;
use crate::ids::{OpponentId, PetId};

/// A ticket balance as the arena reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Attacks left.
    #[serde(default)]
    pub amount: u32,
}

/// A pet currently on the account's defense team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensePet {
    /// Pet identity.
    pub pet_id: PetId,
}

/// Arena state from `GET /public/battle/user/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleInfo {
    /// Whether the PvP season is over.
    pub is_end_season: bool,
    /// Current defenders.
    pub defense_team: Option<Vec<DefensePet>>,
    /// Arena score.
    pub score: i64,
    /// Matches won this season.
    pub win_match: u32,
    /// Arena tier label.
    pub tier_name: String,
    /// Attack tickets.
    pub ticket: Ticket,
}

impl BattleInfo {
    /// Ids of the current defenders.
    pub fn defense_ids(&self) -> Vec<PetId> {
        self.defense_team
            .iter()
            .flatten()
            .map(|pet| pet.pet_id)
            .collect()
    }
}

/// An opponent pet as the opponents endpoint reports it (no class or star).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentPetRef {
    /// Pet identity, resolved against the static catalog.
    pub pet_id: PetId,
    /// Pet level.
    #[serde(default)]
    pub level: u32,
}

/// The opponent offered by `GET /public/battle/user/opponents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    /// Opponent account id, used as the attack target.
    pub telegram_id: OpponentId,
    /// The opponent's defenders.
    #[serde(default)]
    pub pets: Vec<OpponentPetRef>,
}

/// Envelope of the opponents endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentResponse {
    /// The drawn opponent.
    pub opponent: Opponent,
}

/// A fully resolved opponent roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentPet {
    /// Pet identity.
    pub pet_id: PetId,
    /// Elemental class.
    pub class: PetClass,
    /// Tier ("star").
    pub star: u32,
    /// Pet level.
    pub level: u32,
}

/// One round of a resolved attack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRound {
    /// Whether the attacker won the round.
    #[serde(default)]
    pub result: bool,
}

/// Result of `POST /public/battle/attack`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackOutcome {
    /// Whether the attack was won.
    pub is_win: bool,
    /// Per-round results.
    pub rounds: Vec<AttackRound>,
    /// Arena score after the attack.
    pub score: i64,
    /// Tickets left after the attack.
    pub ticket: Ticket,
}

impl AttackOutcome {
    /// Human-readable round summary, e.g. `Round 1: Win, Round 2: Lose`.
    pub fn round_summary(&self) -> String {
        self.rounds
            .iter()
            .zip(1_usize..)
            .map(|(round, n)| {
                let verdict = if round.result { "Win" } else { "Lose" };
                format!("Round {n}: {verdict}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
