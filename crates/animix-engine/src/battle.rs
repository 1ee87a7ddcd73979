//! PvP team selection.
//!
//! An attack needs exactly three distinct pets. The selector counters the
//! opponent roster pet by pet, then backfills with the strongest pets left.
//! If three distinct pets cannot be found the attack is infeasible; a
//! partial team is never produced.
//!
//! [`run_attacks`] drives the arena: one attempt per ticket, stopping early
//! when the server reports no tickets left or no team can be formed.

use std::collections::BTreeMap;

use animix_types::{
    AttackOutcome, OpponentPet, OpponentPetRef, Pet, PetCatalogEntry, PetClass, PetId,
};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::gateway::{ArenaGateway, AttackPlan, CommitGateway};

/// Strong picks after which the counter phase stops.
const STRONG_PICKS_WANTED: usize = 2;

/// Pets per team.
pub const TEAM_SIZE: usize = 3;

/// Which class beats which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvantageTable {
    beats: BTreeMap<PetClass, PetClass>,
}

impl AdvantageTable {
    /// Build a table from `(attacker, beaten)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (PetClass, PetClass)>) -> Self {
        Self {
            beats: pairs.into_iter().collect(),
        }
    }

    /// Whether `attacker` has the class advantage over `defender`.
    pub fn beats(&self, attacker: PetClass, defender: PetClass) -> bool {
        self.beats.get(&attacker) == Some(&defender)
    }
}

impl Default for AdvantageTable {
    /// Earth beats Water, Water beats Wind, Wind beats Earth.
    fn default() -> Self {
        Self::new([
            (PetClass::Earth, PetClass::Water),
            (PetClass::Water, PetClass::Wind),
            (PetClass::Wind, PetClass::Earth),
        ])
    }
}

/// A feasible attack team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleTeam {
    /// Three distinct pets in submission order.
    pub picks: [PetId; TEAM_SIZE],
    /// Picks whose star strictly exceeds the opponent pet they counter.
    pub strong_picks: usize,
}

/// Resolve an opponent roster against the static catalog.
///
/// Entries the catalog does not know are dropped.
pub fn resolve_roster(refs: &[OpponentPetRef], catalog: &[PetCatalogEntry]) -> Vec<OpponentPet> {
    refs.iter()
        .filter_map(|r| {
            catalog
                .iter()
                .find(|entry| entry.pet_id == r.pet_id)
                .map(|entry| OpponentPet {
                    pet_id: r.pet_id,
                    class: entry.class,
                    star: entry.star,
                    level: r.level,
                })
        })
        .collect()
}

/// Pick an attack team against one opponent roster.
///
/// # Errors
///
/// Returns [`EngineError::TeamUnavailable`] when fewer than three distinct
/// pets can be selected.
pub fn select_attack_team(
    roster: &[OpponentPet],
    own: &[Pet],
    table: &AdvantageTable,
) -> Result<BattleTeam, EngineError> {
    let own = distinct_pets(own);
    let mut picked: Vec<&Pet> = Vec::with_capacity(TEAM_SIZE);
    let mut strong_picks = 0_usize;

    for opponent in roster {
        if strong_picks >= STRONG_PICKS_WANTED || picked.len() >= TEAM_SIZE {
            break;
        }
        let best = own
            .iter()
            .copied()
            .filter(|pet| pet.star >= opponent.star && !contains(&picked, pet.pet_id))
            .reduce(|best, pet| {
                let key = (pet.star, pet.level, table.beats(pet.class, opponent.class));
                let best_key = (best.star, best.level, table.beats(best.class, opponent.class));
                if key > best_key { pet } else { best }
            });
        if let Some(pet) = best {
            if pet.star > opponent.star {
                strong_picks = strong_picks.saturating_add(1);
            }
            picked.push(pet);
        }
    }

    while picked.len() < TEAM_SIZE {
        let Some(pet) = strongest_remaining(&own, &picked) else {
            break;
        };
        picked.push(pet);
    }

    match picked.as_slice() {
        [a, b, c] => Ok(BattleTeam {
            picks: [a.pet_id, b.pet_id, c.pet_id],
            strong_picks,
        }),
        _ => Err(EngineError::TeamUnavailable { owned: own.len() }),
    }
}

/// Top three pets by star then level, unless that is already the defense.
///
/// Returns `None` when fewer than three pets are owned or when the current
/// defense holds exactly the same three pets.
pub fn select_defense_team(own: &[Pet], current: &[PetId]) -> Option<[PetId; TEAM_SIZE]> {
    let mut ranked = distinct_pets(own);
    ranked.sort_by(|a, b| (b.star, b.level).cmp(&(a.star, a.level)));

    let team = match ranked.as_slice() {
        [a, b, c, ..] => [a.pet_id, b.pet_id, c.pet_id],
        _ => return None,
    };

    let unchanged = current.len() == TEAM_SIZE && current.iter().all(|id| team.contains(id));
    (!unchanged).then_some(team)
}

/// Why the attack loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStop {
    /// Every attempt in the budget was used.
    BudgetSpent,
    /// The server reported no tickets left.
    OutOfTickets,
    /// Owned pets could not form a team against the drawn opponent.
    NoTeam,
}

/// What one run of the attack loop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    /// Attempts started, including failed draws and commits.
    pub attempts: u32,
    /// Committed attacks and their results, in order.
    pub fought: Vec<(AttackPlan, AttackOutcome)>,
    /// Attacks the server rejected. They are not retried.
    pub failed: Vec<AttackPlan>,
    /// Why the loop ended.
    pub stop: AttackStop,
}

impl AttackReport {
    const fn new() -> Self {
        Self {
            attempts: 0,
            fought: Vec::new(),
            failed: Vec::new(),
            stop: AttackStop::BudgetSpent,
        }
    }

    /// Attacks won.
    pub fn wins(&self) -> usize {
        self.fought.iter().filter(|(_, outcome)| outcome.is_win).count()
    }
}

/// Attack up to `budget` times.
///
/// Each attempt draws an opponent, picks a team against its roster, and
/// commits the attack. A failed draw or commit costs the attempt and the
/// loop moves on; the same plan is never sent twice.
///
/// # Errors
///
/// Returns the first error the gateway reports as fatal.
pub async fn run_attacks<G: ArenaGateway>(
    gateway: &G,
    budget: u32,
    catalog: &[PetCatalogEntry],
    table: &AdvantageTable,
) -> Result<AttackReport, G::Error> {
    let mut report = AttackReport::new();

    while report.attempts < budget {
        report.attempts = report.attempts.saturating_add(1);

        let matchup = match gateway.draw_matchup().await {
            Ok(matchup) => Some(matchup),
            Err(e) if gateway.is_fatal(&e) => return Err(e),
            Err(e) => {
                warn!(error = %e, "drawing an opponent failed");
                None
            }
        };

        if let Some(matchup) = matchup {
            let roster = resolve_roster(&matchup.opponent.pets, catalog);
            let team = match select_attack_team(&roster, &matchup.own, table) {
                Ok(team) => team,
                Err(e) => {
                    info!(reason = %e, "no attack team");
                    report.stop = AttackStop::NoTeam;
                    return Ok(report);
                }
            };

            let plan = AttackPlan {
                opponent_id: matchup.opponent.telegram_id,
                pet_ids: team.picks,
            };
            match gateway.commit_attack(&plan).await {
                Ok(outcome) => {
                    info!(
                        opponent = %plan.opponent_id,
                        win = outcome.is_win,
                        rounds = %outcome.round_summary(),
                        score = outcome.score,
                        tickets_left = outcome.ticket.amount,
                        "attack finished"
                    );
                    let tickets_left = outcome.ticket.amount;
                    report.fought.push((plan, outcome));
                    if tickets_left == 0 {
                        report.stop = AttackStop::OutOfTickets;
                        return Ok(report);
                    }
                }
                Err(e) if gateway.is_fatal(&e) => return Err(e),
                Err(e) => {
                    warn!(opponent = %plan.opponent_id, error = %e, "attack failed");
                    report.failed.push(plan);
                }
            }
        }

        if report.attempts < budget {
            gateway.rest().await;
        }
    }

    Ok(report)
}

/// One entry per pet id, in first-seen order.
fn distinct_pets(own: &[Pet]) -> Vec<&Pet> {
    let mut seen: Vec<&Pet> = Vec::with_capacity(own.len());
    for pet in own {
        if !contains(&seen, pet.pet_id) {
            seen.push(pet);
        }
    }
    seen
}

fn contains(pets: &[&Pet], id: PetId) -> bool {
    pets.iter().any(|pet| pet.pet_id == id)
}

fn strongest_remaining<'a>(own: &[&'a Pet], picked: &[&Pet]) -> Option<&'a Pet> {
    own.iter()
        .copied()
        .filter(|pet| !contains(picked, pet.pet_id))
        .reduce(|best, pet| {
            if (pet.star, pet.level) > (best.star, best.level) {
                pet
            } else {
                best
            }
        })
}
