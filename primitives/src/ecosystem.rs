//! Ecosystem Constants for the Keeper Network
//!
//! Identifier aliases, the pallet account seed and the unit/denominator constants shared by
//! the keeper agent pallet and the runtimes that configure it.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Monotonic keeper identifier. `0` is reserved for "no keeper".
pub type KeeperId = u32;

/// Per-target job sequence number (24 bits wide).
pub type JobId = u32;

/// `blake2_256(target, job_id)`
pub type JobKey = [u8; 32];

/// Unix seconds, truncated to 32 bits.
pub type Timestamp = u32;

/// Pallet identifiers for deriving pallet-owned accounts.
pub mod pallet_ids {
  /// Keeper agent pallet ID (holds job credits, keeper stake and fees)
  pub const KEEPER_AGENT_PALLET_ID: &[u8; 8] = b"keepagnt";
}

/// Economic parameters and unit scalars.
pub mod params {
  use super::Balance;
  use sp_arithmetic::Permill;

  /// Basis-point denominator used by slashing and compensation multipliers.
  pub const BPS_DENOMINATOR: u32 = 10_000;

  /// Denominator of a job's `reward_pct` premium.
  pub const PERCENT_DENOMINATOR: u32 = 100;

  /// One gwei in base units (10^9). Job fee ceilings are expressed in gwei.
  pub const GWEI: Balance = 1_000_000_000;

  /// Scalar applied to a job's `fixed_reward` (10^15 base units, a finney).
  pub const FIXED_REWARD_UNIT: Balance = 1_000_000_000_000_000;

  /// Upper bound governance may set for the credit deposit fee (5%).
  pub const MAX_DEPOSIT_FEE: Permill = Permill::from_percent(5);

  /// Upper bound governance may set for the stake redeem cooldown (30 days).
  pub const MAX_PENDING_WITHDRAWAL_TIMEOUT: u32 = 30 * 24 * 60 * 60;

  /// Gas charged on top of the measured job call for the surrounding bookkeeping.
  pub const JOB_GAS_OVERHEAD: u64 = 40_000;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pallet_id_is_correct_length() {
    assert_eq!(pallet_ids::KEEPER_AGENT_PALLET_ID.len(), 8);
  }

  #[test]
  fn max_deposit_fee_is_five_percent() {
    assert_eq!(params::MAX_DEPOSIT_FEE.deconstruct(), 50_000);
  }
}
