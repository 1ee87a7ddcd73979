//! Shared type definitions for the Animix automation client.
//!
//! Everything the game API sends or receives is modelled here once and
//! consumed by both the allocation engine and the runner.
//!
//! # Modules
//!
//! - [`ids`] -- Numeric id newtypes (pets, DNA kinds, missions, opponents)
//! - [`enums`] -- Pet classes
//! - [`pets`] -- Pet and DNA stacks, gacha and mixing results, pet catalog
//! - [`missions`] -- Missions and their slot requirements
//! - [`battle`] -- PvP arena state, opponents, and attack results
//! - [`rewards`] -- User profile, quests, achievements, season pass

pub mod battle;
pub mod enums;
pub mod ids;
pub mod missions;
pub mod pets;
pub mod rewards;

// Re-export all public types at crate root for convenience.
pub use battle::{
    AttackOutcome, AttackRound, BattleInfo, DefensePet, Opponent, OpponentPet, OpponentPetRef,
    OpponentResponse, Ticket,
};
pub use enums::PetClass;
pub use ids::{AchievementId, DnaKindId, MissionId, OpponentId, PetId};
pub use missions::{JoinedPet, Mission, SlotRequirement};
pub use pets::{
    GachaBonus, GachaPull, GachaResult, MixResult, MixedPet, Pet, PetCatalogEntry, PetDna,
};
pub use rewards::{
    Achievement, AchievementBook, AchievementGroup, AchievementPet, Quest, QuestBoard,
    SeasonPass, SeasonReward, UserInfo,
};
