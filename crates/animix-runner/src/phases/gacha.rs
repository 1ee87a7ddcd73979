//! Gacha pulls and the gacha bonus track.

use animix_types::GachaBonus;
use tracing::info;

use crate::client::ApiClient;
use crate::error::RunnerError;

/// Pull size when enough god power is left for a batch.
const BATCH_PULL: u32 = 10;

/// Bonus reward number for god power.
const REWARD_GOD_POWER: u8 = 1;

/// Bonus reward number for DNA.
const REWARD_DNA: u8 = 2;

/// Pets to pull next: a batch of ten when affordable, otherwise one.
pub const fn next_pull(god_power: u32) -> u32 {
    if god_power >= BATCH_PULL { BATCH_PULL } else { 1 }
}

/// The bonus reward to claim, god power first.
pub const fn bonus_reward(bonus: &GachaBonus) -> Option<u8> {
    if bonus.current_step >= bonus.step_bonus_god_power && !bonus.is_claimed_god_power {
        Some(REWARD_GOD_POWER)
    } else if bonus.current_step >= bonus.step_bonus_dna && !bonus.is_claimed_dna {
        Some(REWARD_DNA)
    } else {
        None
    }
}

/// Spend god power until it runs out or `max_pulled` pets were pulled.
///
/// Returns how many pets were pulled.
///
/// # Errors
///
/// Returns the first failed pull.
pub async fn pull_all(client: &ApiClient, god_power: u32, max_pulled: u32) -> Result<u32, RunnerError> {
    let mut power = god_power;
    let mut pulled: u32 = 0;

    while power > 0 && pulled < max_pulled {
        client.pace().await;
        let amount = next_pull(power);
        let result = client.gacha(amount).await?;
        for pet in &result.dna {
            info!(name = %pet.name, class = %pet.class, star = pet.star, "pulled pet");
        }
        pulled = pulled.saturating_add(amount);
        power = result.god_power;
    }

    info!(pulled = pulled, god_power_left = power, "gacha done");
    Ok(pulled)
}

/// Claim the next available gacha bonus, if any.
///
/// # Errors
///
/// Returns the failed fetch or claim.
pub async fn claim_bonus(client: &ApiClient) -> Result<(), RunnerError> {
    let bonus = client.gacha_bonus().await?;
    match bonus_reward(&bonus) {
        Some(reward_no) => {
            client.pace().await;
            client.claim_gacha_bonus(reward_no).await?;
            info!(reward_no = reward_no, "claimed gacha bonus");
        }
        None => info!("no gacha bonus to claim"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_of_ten_when_affordable() {
        assert_eq!(next_pull(25), 10);
        assert_eq!(next_pull(10), 10);
        assert_eq!(next_pull(9), 1);
    }

    #[test]
    fn god_power_bonus_comes_first() {
        let bonus = GachaBonus {
            current_step: 100,
            is_claimed_god_power: false,
            is_claimed_dna: false,
            step_bonus_god_power: 50,
            step_bonus_dna: 100,
        };
        assert_eq!(bonus_reward(&bonus), Some(1));

        let claimed = GachaBonus { is_claimed_god_power: true, ..bonus.clone() };
        assert_eq!(bonus_reward(&claimed), Some(2));

        let early = GachaBonus { current_step: 10, ..bonus };
        assert_eq!(bonus_reward(&early), None);
    }
}
