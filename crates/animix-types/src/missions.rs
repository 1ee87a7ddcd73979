//! Mission payloads.

use serde::{Deserialize, Serialize};

use crate::enums::PetClass;
use crate::ids::{MissionId, PetId};

/// A unit already sitting in a running mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedPet {
    /// The pet stack the unit belongs to.
    pub pet_id: PetId,
}

/// One slot requirement of a mission: a class and a minimum star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequirement {
    /// Required class.
    pub class: PetClass,
    /// Minimum star, inclusive.
    pub min_star: u32,
}

/// A mission from `GET /public/mission/list`.
///
/// Each of the three slots is empty when either its class or its star is
/// missing. `can_completed` is `Some(true)` when the mission can be claimed,
/// `Some(false)` while it runs, and absent for open missions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Mission identity.
    pub mission_id: MissionId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Slot 1 class.
    #[serde(default)]
    pub pet_1_class: Option<PetClass>,
    /// Slot 1 minimum star.
    #[serde(default)]
    pub pet_1_star: Option<u32>,
    /// Slot 2 class.
    #[serde(default)]
    pub pet_2_class: Option<PetClass>,
    /// Slot 2 minimum star.
    #[serde(default)]
    pub pet_2_star: Option<u32>,
    /// Slot 3 class.
    #[serde(default)]
    pub pet_3_class: Option<PetClass>,
    /// Slot 3 minimum star.
    #[serde(default)]
    pub pet_3_star: Option<u32>,
    /// Units already assigned remote side.
    #[serde(default)]
    pub pet_joined: Option<Vec<JoinedPet>>,
    /// Claim state, see the type docs.
    #[serde(default)]
    pub can_completed: Option<bool>,
}

impl Mission {
    /// The three slot requirements in slot order; `None` marks an empty slot.
    pub fn slots(&self) -> [Option<SlotRequirement>; 3] {
        [
            slot(self.pet_1_class, self.pet_1_star),
            slot(self.pet_2_class, self.pet_2_star),
            slot(self.pet_3_class, self.pet_3_star),
        ]
    }

    /// Whether the mission already holds units remote side.
    pub fn has_joined_pets(&self) -> bool {
        self.pet_joined.as_ref().is_some_and(|pets| !pets.is_empty())
    }

    /// Whether the mission is finished and waiting to be claimed.
    pub fn is_claimable(&self) -> bool {
        self.can_completed == Some(true)
    }

    /// Units this mission keeps busy.
    pub fn joined_pet_ids(&self) -> impl Iterator<Item = PetId> + '_ {
        self.pet_joined
            .iter()
            .flatten()
            .map(|joined| joined.pet_id)
    }
}

fn slot(class: Option<PetClass>, star: Option<u32>) -> Option<SlotRequirement> {
    match (class, star) {
        (Some(class), Some(min_star)) if min_star > 0 => Some(SlotRequirement { class, min_star }),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mission(json: serde_json::Value) -> Mission {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn slots_with_missing_fields_are_empty() {
        let m = mission(serde_json::json!({
            "mission_id": 11,
            "pet_1_class": "Earth",
            "pet_1_star": 2,
            "pet_2_class": "Wind",
            "pet_3_star": 4
        }));
        let slots = m.slots();
        assert_eq!(
            slots.first().copied().flatten(),
            Some(SlotRequirement { class: PetClass::Earth, min_star: 2 })
        );
        assert_eq!(slots.get(1).copied().flatten(), None);
        assert_eq!(slots.get(2).copied().flatten(), None);
    }

    #[test]
    fn joined_and_claim_state() {
        let running = mission(serde_json::json!({
            "mission_id": 3,
            "pet_joined": [{"pet_id": 5}, {"pet_id": 5}],
            "can_completed": false
        }));
        assert!(running.has_joined_pets());
        assert!(!running.is_claimable());
        assert_eq!(running.joined_pet_ids().count(), 2);

        let open = mission(serde_json::json!({"mission_id": 4, "pet_joined": []}));
        assert_eq!(open.mission_id, MissionId(4));
        assert!(!open.has_joined_pets());
    }
}
