//! Agent variants: compensation formula and pseudo-random source.
//!
//! - [`Flat`]: gas cost times the job's percentage premium plus its fixed reward.
//! - [`Randao`]: gas cost times a global multiplier, a fixed floor and a stake-proportional
//!   term. Randomness comes from the parent hash.
//! - [`Vrf`]: [`Randao`] compensation with randomness from an injected [`Randomness`] source.
//!
//! The parent-hash source used by [`Flat`] and [`Randao`] is NOT secure: anyone who sees the
//! execution before inclusion can predict the next draw. Use [`Vrf`] with a verifiable source
//! where that matters.

use codec::Encode;
use core::marker::PhantomData;
use frame::deps::{frame_support::traits::Randomness, sp_core::U256};
use frame::prelude::*;
use keeper_primitives::{Balance, RandaoConfig, params};

/// Inputs of one compensation computation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompensationInput {
  pub success: bool,
  /// Measured gas plus the configured overhead.
  pub gas_used: u64,
  pub base_fee: Balance,
  pub reward_pct: u16,
  pub fixed_reward: u32,
  pub fixed_reward_unit: Balance,
  /// Executing keeper stake after the job and agent caps.
  pub limited_stake: Balance,
  pub randao: RandaoConfig,
}

impl CompensationInput {
  pub fn gas_cost(&self) -> Balance {
    (self.gas_used as Balance).saturating_mul(self.base_fee)
  }
}

pub trait AgentStrategy<T: frame_system::Config> {
  fn pseudo_random() -> U256;

  fn success_compensation(input: &CompensationInput) -> Balance;

  /// A failed call refunds its gas cost, nothing more.
  fn failure_compensation(input: &CompensationInput) -> Balance {
    input.gas_cost()
  }

  fn compensation(input: &CompensationInput) -> Balance {
    if input.success {
      Self::success_compensation(input)
    } else {
      Self::failure_compensation(input)
    }
  }
}

/// Seed mixed from the parent hash and the current block number.
pub fn block_seed<T: frame_system::Config>() -> U256 {
  let parent_hash = frame_system::Pallet::<T>::parent_hash();
  let number = frame_system::Pallet::<T>::block_number();
  U256::from_big_endian(&frame::hashing::blake2_256(&(parent_hash, number).encode()))
}

pub struct Flat;

impl<T: frame_system::Config> AgentStrategy<T> for Flat {
  fn pseudo_random() -> U256 {
    block_seed::<T>()
  }

  fn success_compensation(input: &CompensationInput) -> Balance {
    let premium = input
      .gas_cost()
      .saturating_mul(input.reward_pct as Balance)
      / params::PERCENT_DENOMINATOR as Balance;
    premium.saturating_add((input.fixed_reward as Balance).saturating_mul(input.fixed_reward_unit))
  }
}

pub struct Randao;

impl Randao {
  pub fn stake_proportional(input: &CompensationInput) -> Balance {
    let multiplied = input
      .gas_cost()
      .saturating_mul(input.randao.job_compensation_multiplier_bps as Balance)
      / params::BPS_DENOMINATOR as Balance;
    let stake_term = input.limited_stake / input.randao.stake_divisor.max(1) as Balance;
    multiplied
      .saturating_add(input.randao.job_fixed_reward)
      .saturating_add(stake_term)
  }
}

impl<T: frame_system::Config> AgentStrategy<T> for Randao {
  fn pseudo_random() -> U256 {
    block_seed::<T>()
  }

  fn success_compensation(input: &CompensationInput) -> Balance {
    Self::stake_proportional(input)
  }
}

pub struct Vrf<R>(PhantomData<R>);

impl<T, R> AgentStrategy<T> for Vrf<R>
where
  T: frame_system::Config,
  R: Randomness<T::Hash, BlockNumberFor<T>>,
{
  fn pseudo_random() -> U256 {
    let (output, _) = R::random(b"keeper-agent/assign");
    U256::from_big_endian(&frame::hashing::blake2_256(output.as_ref()))
  }

  fn success_compensation(input: &CompensationInput) -> Balance {
    Randao::stake_proportional(input)
  }
}
