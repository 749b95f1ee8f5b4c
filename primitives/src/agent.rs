//! Governance records and per-job scheduling state of the keeper agent.

use crate::ecosystem::{params, Balance, KeeperId, Timestamp};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};
use sp_arithmetic::Permill;

/// Agent-wide parameters set by governance.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct AgentConfig {
  /// Stake a keeper needs to register, execute and be drawn by the scheduler.
  pub min_keeper_stake: Balance,
  /// Cooldown between `initiate_redeem` and `finalize_redeem`, in seconds.
  pub pending_withdrawal_timeout: u32,
  /// Credit deposit fee in parts per million.
  pub fee_ppm: u32,
}

impl AgentConfig {
  pub fn deposit_fee(&self) -> Permill {
    Permill::from_parts(self.fee_ppm)
  }
}

impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      min_keeper_stake: 1_000,
      pending_withdrawal_timeout: 3 * 24 * 60 * 60,
      fee_ppm: 0,
    }
  }
}

/// Randomized assignment, slashing and compensation parameters.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct RandaoConfig {
  /// Blocks per slasher rotation epoch.
  pub slashing_epoch_blocks: u32,
  /// Seconds the assigned keeper keeps priority once a slashing window opens.
  pub period1: u32,
  /// Seconds after `period1` before an idle assignment may be force-released.
  pub period2: u32,
  pub slashing_fee_fixed: Balance,
  pub slashing_fee_bps: u16,
  /// Credits a job (or its owner) must hold to keep a keeper assigned.
  pub job_min_credits: Balance,
  /// Global stake cap for compensation and slashing. Zero disables the cap.
  pub agent_max_stake: Balance,
  /// Per-job stake cap for compensation and slashing. Zero disables the cap.
  pub job_max_stake: Balance,
  pub keeper_activation_timeout: u32,
  pub job_compensation_multiplier_bps: u32,
  /// Fixed reward floor added to every successful randomized execution.
  pub job_fixed_reward: Balance,
  pub stake_divisor: u32,
}

impl RandaoConfig {
  /// Applies the nonzero stake caps to `stake`.
  pub fn limit_stake(&self, stake: Balance) -> Balance {
    let mut limited = stake;
    if self.agent_max_stake != 0 {
      limited = limited.min(self.agent_max_stake);
    }
    if self.job_max_stake != 0 {
      limited = limited.min(self.job_max_stake);
    }
    limited
  }
}

impl Default for RandaoConfig {
  fn default() -> Self {
    Self {
      slashing_epoch_blocks: 10,
      period1: 15 * 60,
      period2: 30 * 60,
      slashing_fee_fixed: 0,
      slashing_fee_bps: 300,
      job_min_credits: 0,
      agent_max_stake: 0,
      job_max_stake: 0,
      keeper_activation_timeout: 60 * 60,
      job_compensation_multiplier_bps: params::BPS_DENOMINATOR,
      job_fixed_reward: 0,
      stake_divisor: 1_000,
    }
  }
}

/// Who is responsible for a job and where its slashing window stands.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct Assignment {
  pub keeper: KeeperId,
  pub reserved_slasher: KeeperId,
  pub slashing_possible_after: Timestamp,
}

impl Assignment {
  pub const fn is_assigned(&self) -> bool {
    self.keeper != 0
  }

  pub const fn slashing_initiated(&self) -> bool {
    self.slashing_possible_after != 0
  }
}

/// Stake on its way out of the keeper registry.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct PendingWithdrawal {
  pub amount: Balance,
  pub ends_at: Timestamp,
}

/// Per-call options supplied by the executing keeper.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct ExecuteConfig {
  /// Accrue the compensation on the keeper record instead of paying the worker.
  pub accrue_reward: bool,
  /// Settle at the job's base fee ceiling instead of rejecting when the current fee is above it.
  pub accept_max_base_fee_limit: bool,
}

/// Withdrawal amount selector.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub enum CreditAmount {
  Exact(Balance),
  All,
}

impl CreditAmount {
  pub fn resolve(self, available: Balance) -> Balance {
    match self {
      CreditAmount::Exact(amount) => amount,
      CreditAmount::All => available,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_caps_leave_stake_untouched() {
    let config = RandaoConfig::default();
    assert_eq!(config.limit_stake(123_456), 123_456);
  }

  #[test]
  fn tightest_cap_wins() {
    let config = RandaoConfig {
      agent_max_stake: 5_000,
      job_max_stake: 2_000,
      ..Default::default()
    };
    assert_eq!(config.limit_stake(10_000), 2_000);
    assert_eq!(config.limit_stake(1_500), 1_500);

    let config = RandaoConfig {
      agent_max_stake: 1_000,
      job_max_stake: 0,
      ..Default::default()
    };
    assert_eq!(config.limit_stake(10_000), 1_000);
  }

  #[test]
  fn all_resolves_to_available_balance() {
    assert_eq!(CreditAmount::All.resolve(77), 77);
    assert_eq!(CreditAmount::Exact(5).resolve(77), 5);
  }

  #[test]
  fn deposit_fee_converts_parts_per_million() {
    let config = AgentConfig {
      fee_ppm: 20_000,
      ..Default::default()
    };
    assert_eq!(config.deposit_fee() * 1_000_000u128, 20_000);
  }
}
