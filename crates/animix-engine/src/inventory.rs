//! Inventory indexing: from remote pet stacks to an allocatable unit pool.
//!
//! The pet list reports stacks (one `pet_id` with an `amount`). Before any
//! allocation the stacks are expanded into units, units already busy in
//! running missions are deducted, and what remains becomes a [`UnitPool`]
//! that allocators draw from. All counts use checked or saturating
//! arithmetic so a stack can never go negative.

use std::collections::BTreeMap;

use animix_types::{Mission, Pet, PetClass, PetId, SlotRequirement};

use crate::error::EngineError;

/// Index key: pet class and star.
pub type ClassStar = (PetClass, u32);

/// Expanded view of one pass's pet snapshot.
///
/// Built once per pass and never mutated; allocators work on the
/// [`UnitPool`] obtained from [`InventoryIndex::pool`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryIndex {
    /// Available units (a stack id repeated per free copy) grouped by class and star.
    by_class_and_star: BTreeMap<ClassStar, Vec<PetId>>,
    /// Units left after deducting those already in missions, in source order.
    available: Vec<PetId>,
    /// Units per stack already held by missions.
    deductions: BTreeMap<PetId, u32>,
}

impl InventoryIndex {
    /// Build the index from a pet snapshot and a mission snapshot.
    ///
    /// Units referenced by any mission's `pet_joined` are deducted from the
    /// expanded pool, first occurrence first. A mission referencing more
    /// copies than the account owns deducts what exists and no more.
    pub fn build(pets: &[Pet], missions: &[Mission]) -> Self {
        let deductions = count_deductions(missions);
        let mut pending = deductions.clone();
        let mut by_class_and_star: BTreeMap<ClassStar, Vec<PetId>> = BTreeMap::new();
        let mut available = Vec::new();

        for pet in pets {
            for _ in 0..pet.amount {
                match pending.get_mut(&pet.pet_id) {
                    Some(left) if *left > 0 => *left = left.saturating_sub(1),
                    _ => {
                        available.push(pet.pet_id);
                        by_class_and_star
                            .entry((pet.class, pet.star))
                            .or_default()
                            .push(pet.pet_id);
                    }
                }
            }
        }

        Self {
            by_class_and_star,
            available,
            deductions,
        }
    }

    /// Build the index only when both snapshots were fetched.
    ///
    /// A missing snapshot means the pool would be partial, so allocation
    /// must be skipped for the pass.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SnapshotUnavailable`] naming the missing snapshot.
    pub fn from_snapshots(
        pets: Option<&[Pet]>,
        missions: Option<&[Mission]>,
    ) -> Result<Self, EngineError> {
        let pets = pets.ok_or(EngineError::SnapshotUnavailable { what: "pets" })?;
        let missions = missions.ok_or(EngineError::SnapshotUnavailable { what: "missions" })?;
        Ok(Self::build(pets, missions))
    }

    /// Available units grouped by class and star, deductions applied.
    pub const fn by_class_and_star(&self) -> &BTreeMap<ClassStar, Vec<PetId>> {
        &self.by_class_and_star
    }

    /// Units free for allocation, one entry per unit.
    pub fn available_units(&self) -> &[PetId] {
        &self.available
    }

    /// Units per stack already held by missions.
    pub const fn deductions(&self) -> &BTreeMap<PetId, u32> {
        &self.deductions
    }

    /// Derive the mutable pool allocators draw from.
    pub fn pool(&self) -> UnitPool {
        let mut remaining: BTreeMap<PetId, u32> = BTreeMap::new();
        for id in &self.available {
            let count = remaining.entry(*id).or_insert(0);
            *count = count.saturating_add(1);
        }

        let by_class_and_star = self
            .by_class_and_star
            .iter()
            .map(|(key, units)| {
                let mut ids: Vec<PetId> = Vec::new();
                for id in units {
                    if !ids.contains(id) {
                        ids.push(*id);
                    }
                }
                (*key, ids)
            })
            .collect();

        UnitPool {
            by_class_and_star,
            remaining,
        }
    }
}

fn count_deductions(missions: &[Mission]) -> BTreeMap<PetId, u32> {
    let mut counts: BTreeMap<PetId, u32> = BTreeMap::new();
    for id in missions.iter().flat_map(Mission::joined_pet_ids) {
        let count = counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
    }
    counts
}

/// Units still free during one pass, with per-stack counts.
///
/// Shrinks monotonically: [`UnitPool::take`] is the only mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitPool {
    /// Distinct stack ids per class and star, in first-seen order.
    by_class_and_star: BTreeMap<ClassStar, Vec<PetId>>,
    /// Free units per stack.
    remaining: BTreeMap<PetId, u32>,
}

impl UnitPool {
    /// Free units left in a stack.
    pub fn remaining(&self, id: PetId) -> u32 {
        self.remaining.get(&id).copied().unwrap_or(0)
    }

    /// Total free units across all stacks.
    pub fn total_units(&self) -> u64 {
        self.remaining
            .values()
            .fold(0_u64, |acc, n| acc.saturating_add(u64::from(*n)))
    }

    /// Whether no unit is left.
    pub fn is_empty(&self) -> bool {
        self.remaining.values().all(|n| *n == 0)
    }

    /// First free unit of the required class at or above the minimum star.
    ///
    /// Stars are scanned in ascending order so the weakest sufficient pet is
    /// used first. Stacks listed in `exclude` are skipped even when they
    /// still hold copies.
    pub fn find(&self, requirement: SlotRequirement, exclude: &[PetId]) -> Option<PetId> {
        if !requirement.class.is_playable() {
            return None;
        }
        self.by_class_and_star
            .range((requirement.class, requirement.min_star)..=(requirement.class, u32::MAX))
            .flat_map(|(_, ids)| ids)
            .copied()
            .find(|id| self.remaining(*id) > 0 && !exclude.contains(id))
    }

    /// Reserve one unit of a stack.
    ///
    /// Returns `false` and leaves the pool untouched when the stack is empty.
    pub fn take(&mut self, id: PetId) -> bool {
        match self.remaining.get_mut(&id) {
            Some(count) if *count > 0 => {
                *count = count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }
}
