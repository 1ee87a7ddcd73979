//! Pet and DNA inventory payloads.
//!
//! The API reports inventory as stacks: one entry per identity with an
//! `amount` of fungible copies. Expansion into individual units happens in
//! the allocation engine, never here.

use serde::{Deserialize, Serialize};

use crate::enums::PetClass;
use crate::ids::{DnaKindId, PetId};

/// One owned pet stack from `GET /public/pet/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Stack identity; the API accepts this id for every copy in the stack.
    pub pet_id: PetId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Elemental class.
    pub class: PetClass,
    /// Tier ("star"), higher is stronger.
    pub star: u32,
    /// Pet level.
    #[serde(default)]
    pub level: u32,
    /// Number of identical copies held.
    #[serde(default)]
    pub amount: u32,
}

/// One DNA stack from `GET /public/pet/dna/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetDna {
    /// Kind id of the DNA item.
    pub item_id: DnaKindId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Elemental class.
    #[serde(default = "unknown_class")]
    pub class: PetClass,
    /// Tier ("star").
    #[serde(default)]
    pub star: u32,
    /// Whether this DNA can take the mom role when mixing.
    #[serde(default)]
    pub can_mom: bool,
    /// Number of identical copies held.
    #[serde(default)]
    pub amount: u32,
}

const fn unknown_class() -> PetClass {
    PetClass::Unknown
}

/// A DNA item revealed by a gacha pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaPull {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Elemental class.
    #[serde(default = "unknown_class")]
    pub class: PetClass,
    /// Tier ("star").
    #[serde(default)]
    pub star: u32,
}

/// Result of `POST /public/pet/dna/gacha`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaResult {
    /// DNA items pulled.
    #[serde(default)]
    pub dna: Vec<GachaPull>,
    /// God power left after the pull.
    #[serde(default)]
    pub god_power: u32,
}

/// Progress of the gacha bonus track (`GET /public/pet/dna/gacha/bonus`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaBonus {
    /// Pulls made on the current track.
    pub current_step: u32,
    /// Whether the god power reward was claimed.
    pub is_claimed_god_power: bool,
    /// Whether the DNA reward was claimed.
    pub is_claimed_dna: bool,
    /// Step at which the god power reward unlocks.
    pub step_bonus_god_power: u32,
    /// Step at which the DNA reward unlocks.
    pub step_bonus_dna: u32,
}

/// The pet produced by a successful mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedPet {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Tier ("star").
    #[serde(default)]
    pub star: u32,
    /// Elemental class.
    #[serde(default = "unknown_class")]
    pub class: PetClass,
}

/// Result of `POST /public/pet/mix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixResult {
    /// The resulting pet, when the server reports one.
    #[serde(default)]
    pub pet: Option<MixedPet>,
}

/// One entry of the static pet catalog (`pets.json`).
///
/// Opponent rosters only carry `pet_id` and `level`; class and star are
/// looked up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetCatalogEntry {
    /// Pet identity.
    pub pet_id: PetId,
    /// Elemental class.
    pub class: PetClass,
    /// Tier ("star").
    pub star: u32,
}
