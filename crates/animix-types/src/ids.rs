//! Type-safe identifier wrappers around the numeric ids the game API uses.
//!
//! The remote API identifies pets, DNA kinds, missions, quests, and battle
//! opponents with plain integers. Wrapping each one in its own newtype keeps
//! a pet id from being passed where a mission id is expected.

use serde::{Deserialize, Serialize};

/// Generates a transparent newtype wrapper around an integer id.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the raw numeric value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identity of an owned pet stack (`pet_id` in `/public/pet/list`).
    PetId(u64)
}

define_id! {
    /// Kind id of a DNA item (`item_id` in `/public/pet/dna/list`).
    ///
    /// Pairing goals are expressed in these ids.
    DnaKindId(u32)
}

define_id! {
    /// Identity of a mission.
    MissionId(u64)
}

define_id! {
    /// Identity of an achievement ("quest" on the wire).
    AchievementId(u64)
}

define_id! {
    /// Telegram id of a PvP opponent.
    OpponentId(u64)
}
