//! Pairing allocation: which DNA units get mixed together.
//!
//! DNA stacks are expanded into units and split by the `can_mom` flag into
//! a mom pool and a dad pool. Two policies draw from them:
//!
//! - goal-directed, where each outstanding collection goal names the exact
//!   dad and mom kinds to mix;
//! - random, where one unit is drawn uniformly from each pool until a pool
//!   runs dry.
//!
//! Planning is pure. [`commit_pairings`] then submits the plan one pair at a
//! time through a [`CommitGateway`].

use std::collections::BTreeSet;

use animix_types::{DnaKindId, MixedPet, PetDna};
use rand::Rng;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::gateway::CommitGateway;

/// Decimal digits of the dad part of a packed goal.
const DAD_DIGITS: usize = 3;

/// A collection goal: mix this dad kind with this mom kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairingGoal {
    /// Kind id for the dad role.
    pub dad: DnaKindId,
    /// Kind id for the mom role.
    pub mom: DnaKindId,
}

impl PairingGoal {
    /// Decode a packed goal: the first three decimal digits are the dad kind,
    /// the remaining digits the mom kind.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedPairingGoal`] when the value has three
    /// digits or fewer, or when the mom part does not fit a kind id.
    pub fn from_packed(packed: u64) -> Result<Self, EngineError> {
        let digits = packed.to_string();
        let malformed = |reason: &str| EngineError::MalformedPairingGoal {
            packed,
            reason: reason.to_owned(),
        };

        let (Some(dad), Some(mom)) = (digits.get(..DAD_DIGITS), digits.get(DAD_DIGITS..)) else {
            return Err(malformed("too few digits"));
        };
        if mom.is_empty() {
            return Err(malformed("missing mom kind"));
        }

        let dad = dad.parse::<u32>().map_err(|_| malformed("dad kind out of range"))?;
        let mom = mom.parse::<u32>().map_err(|_| malformed("mom kind out of range"))?;
        Ok(Self {
            dad: DnaKindId(dad),
            mom: DnaKindId(mom),
        })
    }
}

/// Two DNA units to mix. The two roles are never the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    /// Unit in the dad role.
    pub dad: DnaKindId,
    /// Unit in the mom role.
    pub mom: DnaKindId,
}

impl Pairing {
    /// Pair two kinds, refusing to pair a kind with itself.
    pub fn new(dad: DnaKindId, mom: DnaKindId) -> Option<Self> {
        (dad != mom).then_some(Self { dad, mom })
    }
}

/// DNA units split by mom capability, one entry per unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedingPools {
    moms: Vec<DnaKindId>,
    dads: Vec<DnaKindId>,
}

impl BreedingPools {
    /// Expand DNA stacks into the two pools.
    ///
    /// Stacks named in `skip` (by kind id or by name) are left out entirely.
    pub fn from_dna(dna: &[PetDna], skip: &BTreeSet<String>) -> Self {
        let mut pools = Self::default();
        for stack in dna {
            if skip.contains(&stack.item_id.to_string()) || skip.contains(&stack.name) {
                continue;
            }
            let pool = if stack.can_mom {
                &mut pools.moms
            } else {
                &mut pools.dads
            };
            for _ in 0..stack.amount {
                pool.push(stack.item_id);
            }
        }
        pools
    }

    /// Units that can take the mom role.
    pub fn moms(&self) -> &[DnaKindId] {
        &self.moms
    }

    /// Units that cannot.
    pub fn dads(&self) -> &[DnaKindId] {
        &self.dads
    }
}

/// Why planning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStop {
    /// Every usable unit or goal was consumed.
    Exhausted,
    /// One side had no partner left for the other.
    NoPartner,
    /// No goal could be matched against the pools.
    NoMatchingGoals,
}

/// Pairs to commit, in order, and why planning ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingPlan {
    /// Pairs in commit order.
    pub pairs: Vec<Pairing>,
    /// Why no further pair was planned.
    pub stop: PairingStop,
}

/// Plan one mix per goal whose dad and mom units are both still unused.
///
/// Duplicate goals are handled independently, each consuming its own pair.
/// Goals with no matching units are skipped.
pub fn plan_goal_pairings(pools: &BreedingPools, goals: &[PairingGoal]) -> PairingPlan {
    let mut moms = pools.moms.clone();
    let mut dads = pools.dads.clone();
    let mut pairs = Vec::new();

    for goal in goals {
        let dad_at = dads.iter().position(|kind| *kind == goal.dad);
        let mom_at = moms.iter().position(|kind| *kind == goal.mom);
        let (Some(dad_at), Some(mom_at)) = (dad_at, mom_at) else {
            continue;
        };
        let Some(pairing) = Pairing::new(goal.dad, goal.mom) else {
            continue;
        };
        dads.remove(dad_at);
        moms.remove(mom_at);
        pairs.push(pairing);
    }

    let stop = if pairs.is_empty() {
        PairingStop::NoMatchingGoals
    } else {
        PairingStop::Exhausted
    };
    PairingPlan { pairs, stop }
}

/// Plan random mixes until the mom pool is empty or no dad is left.
pub fn plan_random_pairings<R: Rng>(pools: &BreedingPools, rng: &mut R) -> PairingPlan {
    let mut moms = pools.moms.clone();
    let mut dads = pools.dads.clone();
    let mut pairs = Vec::new();

    while !moms.is_empty() {
        if dads.is_empty() {
            return PairingPlan {
                pairs,
                stop: PairingStop::NoPartner,
            };
        }
        let mom = moms.swap_remove(rng.random_range(0..moms.len()));
        let dad = dads.swap_remove(rng.random_range(0..dads.len()));
        match Pairing::new(dad, mom) {
            Some(pairing) => pairs.push(pairing),
            None => {
                return PairingPlan {
                    pairs,
                    stop: PairingStop::NoPartner,
                };
            }
        }
    }

    let stop = if pairs.is_empty() {
        PairingStop::NoPartner
    } else {
        PairingStop::Exhausted
    };
    PairingPlan { pairs, stop }
}

/// What committing a plan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingReport {
    /// Accepted mixes with the pet the server reported, if any.
    pub mixed: Vec<(Pairing, Option<MixedPet>)>,
    /// Mixes the server rejected; their units are still spent.
    pub failed: Vec<Pairing>,
}

/// Commit every planned pair in order.
pub async fn commit_pairings<G: CommitGateway>(gateway: &G, plan: &PairingPlan) -> PairingReport {
    let mut report = PairingReport::default();

    for pairing in &plan.pairs {
        match gateway.commit_pairing(pairing).await {
            Ok(pet) => {
                match &pet {
                    Some(pet) => info!(
                        dad = %pairing.dad,
                        mom = %pairing.mom,
                        name = %pet.name,
                        star = pet.star,
                        class = %pet.class,
                        "mixed pets"
                    ),
                    None => info!(dad = %pairing.dad, mom = %pairing.mom, "mixed pets"),
                }
                report.mixed.push((*pairing, pet));
            }
            Err(e) => {
                warn!(dad = %pairing.dad, mom = %pairing.mom, error = %e, "mixing failed");
                report.failed.push(*pairing);
            }
        }
    }

    match plan.stop {
        PairingStop::NoPartner => warn!("no partner available for the remaining units"),
        PairingStop::NoMatchingGoals => info!("no collection goal matches the owned DNA"),
        PairingStop::Exhausted => {}
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use animix_types::{AttackOutcome, PetClass};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::gateway::{AttackPlan, MissionAssignment};

    fn dna(item_id: u32, name: &str, can_mom: bool, amount: u32) -> PetDna {
        PetDna {
            item_id: DnaKindId(item_id),
            name: name.to_owned(),
            class: PetClass::Earth,
            star: 1,
            can_mom,
            amount,
        }
    }

    struct FakeGateway {
        fail_first: bool,
        calls: RefCell<Vec<Pairing>>,
    }

    impl CommitGateway for FakeGateway {
        type Error = String;

        async fn commit_mission(&self, _assignment: &MissionAssignment) -> Result<(), String> {
            Ok(())
        }

        async fn commit_pairing(&self, pairing: &Pairing) -> Result<Option<MixedPet>, String> {
            let first = self.calls.borrow().is_empty();
            self.calls.borrow_mut().push(*pairing);
            if self.fail_first && first {
                return Err("busy".to_owned());
            }
            Ok(Some(MixedPet {
                name: "Chimera".to_owned(),
                star: 2,
                class: PetClass::Wind,
            }))
        }

        async fn commit_attack(&self, _plan: &AttackPlan) -> Result<AttackOutcome, String> {
            Ok(AttackOutcome::default())
        }
    }

    #[test]
    fn packed_goal_splits_after_three_digits() {
        let goal = PairingGoal::from_packed(101_105).unwrap();
        assert_eq!(goal.dad, DnaKindId(101));
        assert_eq!(goal.mom, DnaKindId(105));

        let long_mom = PairingGoal::from_packed(1_021_234).unwrap();
        assert_eq!(long_mom.mom, DnaKindId(1234));
    }

    #[test]
    fn short_packed_goal_is_rejected() {
        assert!(matches!(
            PairingGoal::from_packed(105),
            Err(EngineError::MalformedPairingGoal { packed: 105, .. })
        ));
        assert!(PairingGoal::from_packed(7).is_err());
        assert!(PairingGoal::from_packed(u64::MAX).is_err());
    }

    #[test]
    fn pools_expand_split_and_skip() {
        let mut skip = BTreeSet::new();
        skip.insert("Lynx".to_owned());
        skip.insert("300".to_owned());
        let pools = BreedingPools::from_dna(
            &[
                dna(100, "Bear", false, 2),
                dna(200, "Owl", true, 1),
                dna(300, "Fox", true, 4),
                dna(400, "Lynx", false, 1),
            ],
            &skip,
        );
        assert_eq!(pools.dads(), &[DnaKindId(100), DnaKindId(100)]);
        assert_eq!(pools.moms(), &[DnaKindId(200)]);
    }

    #[test]
    fn goals_consume_matching_units_once() {
        let pools = BreedingPools::from_dna(
            &[dna(101, "A", false, 1), dna(105, "B", true, 2)],
            &BTreeSet::new(),
        );
        let goal = PairingGoal { dad: DnaKindId(101), mom: DnaKindId(105) };
        let missing = PairingGoal { dad: DnaKindId(102), mom: DnaKindId(105) };

        let plan = plan_goal_pairings(&pools, &[goal, missing, goal]);
        assert_eq!(plan.pairs, vec![Pairing::new(DnaKindId(101), DnaKindId(105)).unwrap()]);
        assert_eq!(plan.stop, PairingStop::Exhausted);

        let none = plan_goal_pairings(&pools, &[missing]);
        assert!(none.pairs.is_empty());
        assert_eq!(none.stop, PairingStop::NoMatchingGoals);
    }

    #[test]
    fn random_pairing_without_moms_has_no_partner() {
        let pools = BreedingPools::from_dna(&[dna(1, "A", false, 5)], &BTreeSet::new());
        let mut rng = SmallRng::seed_from_u64(7);
        let plan = plan_random_pairings(&pools, &mut rng);
        assert!(plan.pairs.is_empty());
        assert_eq!(plan.stop, PairingStop::NoPartner);
    }

    #[test]
    fn random_pairing_is_bounded_by_smaller_pool() {
        let pools = BreedingPools::from_dna(
            &[
                dna(1, "A", true, 3),
                dna(2, "B", true, 2),
                dna(3, "C", false, 2),
            ],
            &BTreeSet::new(),
        );
        for seed in 0..16 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let plan = plan_random_pairings(&pools, &mut rng);
            assert_eq!(plan.pairs.len(), 2);
            assert_eq!(plan.stop, PairingStop::NoPartner);
            assert!(plan.pairs.iter().all(|p| p.dad == DnaKindId(3)));
            let ones = plan.pairs.iter().filter(|p| p.mom == DnaKindId(1)).count();
            assert!(ones <= 3);
        }
    }

    #[test]
    fn random_pairing_uses_every_mom_when_dads_suffice() {
        let pools = BreedingPools::from_dna(
            &[dna(1, "A", true, 2), dna(3, "C", false, 5)],
            &BTreeSet::new(),
        );
        let mut rng = SmallRng::seed_from_u64(42);
        let plan = plan_random_pairings(&pools, &mut rng);
        assert_eq!(plan.pairs.len(), 2);
        assert_eq!(plan.stop, PairingStop::Exhausted);
    }

    #[tokio::test]
    async fn failed_mix_still_consumes_the_pair() {
        let gateway = FakeGateway {
            fail_first: true,
            calls: RefCell::new(Vec::new()),
        };
        let plan = PairingPlan {
            pairs: vec![
                Pairing::new(DnaKindId(1), DnaKindId(2)).unwrap(),
                Pairing::new(DnaKindId(3), DnaKindId(4)).unwrap(),
            ],
            stop: PairingStop::Exhausted,
        };
        let report = commit_pairings(&gateway, &plan).await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.mixed.len(), 1);
        assert_eq!(gateway.calls.borrow().len(), 2);
    }
}
