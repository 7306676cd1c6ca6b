//! Integer accrual math for reward streams.
//!
//! A stream only remembers a cumulative reward-per-staked-unit figure and each
//! account only remembers the figure it last observed, so the reward for any
//! interval is the difference of two cumulative values. Every helper here is
//! pure: callers hand in the stream snapshot, the pool totals and `now`.
//!
//! Products scaled by [`PRECISION`] are formed in 256 bits and only the
//! quotient has to fit back into `i128`.

use soroban_sdk::{Env, I256};

use crate::{AccountCheckpoint, ContractError, RewardStream};

/// Fixed-point scale applied to `accumulated_per_unit`.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Last timestamp at which the stream is still emitting.
pub fn active_until(period_end: u64, now: u64) -> u64 {
    now.min(period_end)
}

/// `a × b / denominator`, floored, with a 256-bit intermediate product.
fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, ContractError> {
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Cumulative reward per staked unit as of `now`.
///
/// - Empty pool: the stored figure is returned unchanged (no unit to accrue to).
/// - Retired pool: 0, accrual is switched off for good.
/// - Otherwise: stored + `elapsed × rate × PRECISION / total_staked`, with
///   `elapsed` clamped to the funded period.
pub fn reward_per_unit(
    env: &Env,
    stream: &RewardStream,
    total_staked: i128,
    retired: bool,
    now: u64,
) -> Result<i128, ContractError> {
    if total_staked == 0 {
        return Ok(stream.accumulated_per_unit);
    }
    if retired {
        return Ok(0);
    }

    let elapsed = active_until(stream.period_end, now).saturating_sub(stream.last_update) as i128;
    let emitted = elapsed
        .checked_mul(stream.rate)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let increment = mul_div(env, emitted, PRECISION, total_staked)?;

    stream
        .accumulated_per_unit
        .checked_add(increment)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Reward owed to an account holding `balance` units, given the stream's
/// current cumulative figure and the account's last checkpoint.
pub fn earned(
    env: &Env,
    balance: i128,
    per_unit: i128,
    checkpoint: &AccountCheckpoint,
    retired: bool,
) -> Result<i128, ContractError> {
    if retired {
        return Ok(0);
    }

    let delta = per_unit
        .checked_sub(checkpoint.paid_per_unit)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let pending = mul_div(env, balance, delta, PRECISION)?;

    pending
        .checked_add(checkpoint.accrued)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Emission rate after funding `amount` at `now`.
///
/// A top-up before `period_end` folds the undistributed tail of the running
/// period into the new rate. Division floors; the remainder stays in the
/// contract balance.
pub fn funded_rate(stream: &RewardStream, amount: i128, now: u64) -> Result<i128, ContractError> {
    let duration = stream.duration as i128;
    if now >= stream.period_end {
        return Ok(amount / duration);
    }

    let remaining = (stream.period_end - now) as i128;
    let leftover = remaining
        .checked_mul(stream.rate)
        .ok_or(ContractError::ArithmeticOverflow)?;

    Ok(amount
        .checked_add(leftover)
        .ok_or(ContractError::ArithmeticOverflow)?
        / duration)
}

/// Over-allocation guard: a full period at `rate` must be payable from the
/// tokens the contract actually holds.
pub fn covered_by_balance(rate: i128, on_hand: i128, duration: u64) -> bool {
    rate <= on_hand / duration as i128
}

/// Total emission of one full period at the current rate.
pub fn reward_window(stream: &RewardStream) -> Result<i128, ContractError> {
    stream
        .rate
        .checked_mul(stream.duration as i128)
        .ok_or(ContractError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    const WEEK: u64 = 604_800;

    fn stream(env: &Env, rate: i128, last_update: u64, period_end: u64) -> RewardStream {
        RewardStream {
            distributor: Address::generate(env),
            duration: WEEK,
            period_end,
            rate,
            last_update,
            accumulated_per_unit: 0,
        }
    }

    #[test]
    fn active_until_clamps_to_period_end() {
        assert_eq!(active_until(1_000, 500), 500);
        assert_eq!(active_until(1_000, 1_000), 1_000);
        assert_eq!(active_until(1_000, 5_000), 1_000);
    }

    #[test]
    fn reward_per_unit_frozen_on_empty_pool() {
        let env = Env::default();
        let mut s = stream(&env, 10, 0, WEEK);
        s.accumulated_per_unit = 42;

        assert_eq!(reward_per_unit(&env, &s, 0, false, WEEK / 2).unwrap(), 42);
        assert_eq!(reward_per_unit(&env, &s, 0, false, WEEK * 10).unwrap(), 42);
    }

    #[test]
    fn reward_per_unit_zero_once_retired() {
        let env = Env::default();
        let mut s = stream(&env, 10, 0, WEEK);
        s.accumulated_per_unit = 42;

        assert_eq!(reward_per_unit(&env, &s, 100, true, WEEK / 2).unwrap(), 0);
    }

    #[test]
    fn reward_per_unit_grows_linearly_then_stops() {
        let env = Env::default();
        let s = stream(&env, 10, 0, 100);

        // 50s × 10/s spread over 1000 units
        let mid = reward_per_unit(&env, &s, 1_000, false, 50).unwrap();
        assert_eq!(mid, 500 * PRECISION / 1_000);

        let end = reward_per_unit(&env, &s, 1_000, false, 100).unwrap();
        let later = reward_per_unit(&env, &s, 1_000, false, 10_000).unwrap();
        assert_eq!(end, 1_000 * PRECISION / 1_000);
        assert_eq!(later, end);
    }

    #[test]
    fn reward_per_unit_overflow_is_reported() {
        let env = Env::default();
        let s = stream(&env, i128::MAX / 2, 0, 100);

        assert_eq!(
            reward_per_unit(&env, &s, 1, false, 50),
            Err(ContractError::ArithmeticOverflow)
        );
    }

    #[test]
    fn large_emission_to_small_stake_fits() {
        let env = Env::default();
        // 10^21 base units emitted over a week to 100 staked units
        let rate = 1_000_000_000_000_000_000_000 / WEEK as i128;
        let s = stream(&env, rate, 0, WEEK);

        let per_unit = reward_per_unit(&env, &s, 100, false, WEEK).unwrap();
        assert_eq!(per_unit, rate * WEEK as i128 * (PRECISION / 100));

        let owed = earned(&env, 100, per_unit, &AccountCheckpoint::default(), false).unwrap();
        assert_eq!(owed, rate * WEEK as i128);
    }

    #[test]
    fn earned_rejects_checkpoint_ahead_of_figure() {
        let env = Env::default();
        let checkpoint = AccountCheckpoint {
            paid_per_unit: i128::MIN,
            accrued: 0,
        };

        assert_eq!(
            earned(&env, 1, i128::MAX, &checkpoint, false),
            Err(ContractError::ArithmeticOverflow)
        );
    }

    #[test]
    fn earned_adds_settled_amount() {
        let env = Env::default();
        let checkpoint = AccountCheckpoint {
            paid_per_unit: PRECISION,
            accrued: 7,
        };

        // 300 units × 2 per unit since the last checkpoint
        let owed = earned(&env, 300, 3 * PRECISION, &checkpoint, false).unwrap();
        assert_eq!(owed, 607);
    }

    #[test]
    fn earned_is_zero_when_retired() {
        let env = Env::default();
        let checkpoint = AccountCheckpoint {
            paid_per_unit: 0,
            accrued: 7,
        };
        assert_eq!(earned(&env, 300, 3 * PRECISION, &checkpoint, true).unwrap(), 0);
    }

    #[test]
    fn funded_rate_floors_fresh_period() {
        let env = Env::default();
        let s = stream(&env, 0, 0, 0);

        let rate = funded_rate(&s, 1_000_000, 10).unwrap();
        assert_eq!(rate, 1_000_000 / WEEK as i128);
        assert_eq!(rate, 1);
    }

    #[test]
    fn funded_rate_rolls_leftover_into_top_up() {
        let env = Env::default();
        // 2/s until t=WEEK, topped up half way through
        let s = stream(&env, 2, 0, WEEK);
        let now = WEEK / 2;

        let leftover = (WEEK / 2) as i128 * 2;
        let rate = funded_rate(&s, WEEK as i128, now).unwrap();
        assert_eq!(rate, (WEEK as i128 + leftover) / WEEK as i128);
        assert_eq!(rate, 2);
    }

    #[test]
    fn funded_rate_ignores_leftover_after_expiry() {
        let env = Env::default();
        let s = stream(&env, 2, 0, WEEK);

        let rate = funded_rate(&s, 3 * WEEK as i128, WEEK).unwrap();
        assert_eq!(rate, 3);
    }

    #[test]
    fn balance_guard() {
        assert!(covered_by_balance(1, WEEK as i128, WEEK));
        assert!(!covered_by_balance(2, 2 * WEEK as i128 - 1, WEEK));
        assert!(covered_by_balance(0, 0, WEEK));
    }

    #[test]
    fn reward_window_is_floor_truncated() {
        let env = Env::default();
        let mut s = stream(&env, 0, 0, 0);
        s.rate = funded_rate(&s, 1_000_000, 0).unwrap();

        let window = reward_window(&s).unwrap();
        assert_eq!(window, (1_000_000 / WEEK as i128) * WEEK as i128);
        assert!(window <= 1_000_000);
    }
}
