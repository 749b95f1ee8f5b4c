//! Job record, flag set and the 256-bit packed layout.
//!
//! A job is persisted as a plain struct, but its fields keep the widths of the single-word
//! layout so that `pack`/`unpack` round-trip with any store that keeps the word form. Widths
//! are enforced with explicit range checks instead of truncation.

use crate::ecosystem::{Balance, JobId, Timestamp};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

/// Largest value storable in the 88-bit credits field.
pub const MAX_CREDITS: Balance = (1u128 << 88) - 1;

/// Largest keeper stake (the keeper record keeps an 88-bit stake as well).
pub const MAX_STAKE: Balance = (1u128 << 88) - 1;

/// Largest value of the 24-bit interval field (~194 days).
pub const MAX_INTERVAL_SECONDS: u32 = (1 << 24) - 1;

/// Largest per-target job id.
pub const MAX_JOB_ID: JobId = (1 << 24) - 1;

/// Configuration bits of a job.
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
pub struct JobFlags(pub u8);

impl JobFlags {
  pub const ACTIVE: u8 = 0x01;
  pub const USE_JOB_OWNER_CREDITS: u8 = 0x02;
  pub const ASSERT_RESOLVER_SELECTOR: u8 = 0x04;
  pub const CHECK_KEEPER_MIN_STAKE: u8 = 0x08;
  pub const CALL_RESOLVER_BEFORE_EXECUTE: u8 = 0x10;

  pub const fn bits(self) -> u8 {
    self.0
  }

  pub const fn contains(self, flag: u8) -> bool {
    self.0 & flag == flag
  }

  pub fn set(&mut self, flag: u8, on: bool) {
    if on {
      self.0 |= flag;
    } else {
      self.0 &= !flag;
    }
  }

  pub const fn is_active(self) -> bool {
    self.contains(Self::ACTIVE)
  }

  pub const fn uses_owner_credits(self) -> bool {
    self.contains(Self::USE_JOB_OWNER_CREDITS)
  }

  pub const fn asserts_selector(self) -> bool {
    self.contains(Self::ASSERT_RESOLVER_SELECTOR)
  }

  pub const fn checks_keeper_min_stake(self) -> bool {
    self.contains(Self::CHECK_KEEPER_MIN_STAKE)
  }

  pub const fn calls_resolver_first(self) -> bool {
    self.contains(Self::CALL_RESOLVER_BEFORE_EXECUTE)
  }
}

/// How the calldata of a job call is produced, which also decides the trigger style.
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
pub enum TriggerKind {
  /// Call the target with a fixed 4-byte selector every `interval_seconds`.
  #[default]
  FixedSelector,
  /// Call the target with owner-supplied bytes every `interval_seconds`.
  PreDefinedCalldata,
  /// Call when an on-chain resolver reports the job as executable.
  Resolver,
  /// Call with keeper-supplied bytes produced by an off-chain resolver.
  OffchainResolver,
}

impl TriggerKind {
  pub const fn as_u8(self) -> u8 {
    match self {
      TriggerKind::FixedSelector => 0,
      TriggerKind::PreDefinedCalldata => 1,
      TriggerKind::Resolver => 2,
      TriggerKind::OffchainResolver => 3,
    }
  }

  pub const fn from_u8(raw: u8) -> Option<Self> {
    match raw {
      0 => Some(TriggerKind::FixedSelector),
      1 => Some(TriggerKind::PreDefinedCalldata),
      2 => Some(TriggerKind::Resolver),
      3 => Some(TriggerKind::OffchainResolver),
      _ => None,
    }
  }

  /// Condition-triggered jobs carry no interval; time-triggered ones must.
  pub const fn is_condition_triggered(self) -> bool {
    matches!(self, TriggerKind::Resolver | TriggerKind::OffchainResolver)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutError {
  CreditsOutOfRange,
  IntervalOutOfRange,
  UnknownTriggerKind(u8),
}

/// The hot part of a job: everything an execution reads and writes.
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
pub struct Job {
  pub flags: JobFlags,
  pub selector: [u8; 4],
  /// Prepaid credits (88 bits). Unused while the owner-credit flag is on.
  pub credits: Balance,
  /// Base fee ceiling in gwei.
  pub max_base_fee: u16,
  pub reward_pct: u16,
  pub fixed_reward: u32,
  pub trigger: TriggerKind,
  /// 24 bits. Zero for condition-triggered jobs.
  pub interval_seconds: u32,
  pub last_execution_at: Timestamp,
}

impl Job {
  pub fn check_widths(&self) -> Result<(), LayoutError> {
    if self.credits > MAX_CREDITS {
      return Err(LayoutError::CreditsOutOfRange);
    }
    if self.interval_seconds > MAX_INTERVAL_SECONDS {
      return Err(LayoutError::IntervalOutOfRange);
    }
    Ok(())
  }

  /// Big-endian 256-bit word. From the least significant bit: config (8), selector (32),
  /// credits (88), max base fee (16), reward pct (16), fixed reward (32), calldata source (8),
  /// interval (24), last execution (32).
  pub fn pack(&self) -> Result<[u8; 32], LayoutError> {
    self.check_widths()?;

    let low: u128 = (self.flags.bits() as u128)
      | ((u32::from_be_bytes(self.selector) as u128) << 8)
      | (self.credits << 40);
    let high: u128 = (self.max_base_fee as u128)
      | ((self.reward_pct as u128) << 16)
      | ((self.fixed_reward as u128) << 32)
      | ((self.trigger.as_u8() as u128) << 64)
      | ((self.interval_seconds as u128) << 72)
      | ((self.last_execution_at as u128) << 96);

    let mut word = [0u8; 32];
    word[..16].copy_from_slice(&high.to_be_bytes());
    word[16..].copy_from_slice(&low.to_be_bytes());
    Ok(word)
  }

  pub fn unpack(word: &[u8; 32]) -> Result<Self, LayoutError> {
    let mut high_bytes = [0u8; 16];
    let mut low_bytes = [0u8; 16];
    high_bytes.copy_from_slice(&word[..16]);
    low_bytes.copy_from_slice(&word[16..]);
    let high = u128::from_be_bytes(high_bytes);
    let low = u128::from_be_bytes(low_bytes);

    let raw_trigger = ((high >> 64) & 0xff) as u8;
    let trigger =
      TriggerKind::from_u8(raw_trigger).ok_or(LayoutError::UnknownTriggerKind(raw_trigger))?;

    Ok(Job {
      flags: JobFlags((low & 0xff) as u8),
      selector: (((low >> 8) & 0xffff_ffff) as u32).to_be_bytes(),
      credits: low >> 40,
      max_base_fee: (high & 0xffff) as u16,
      reward_pct: ((high >> 16) & 0xffff) as u16,
      fixed_reward: ((high >> 32) & 0xffff_ffff) as u32,
      trigger,
      interval_seconds: ((high >> 72) & 0xff_ffff) as u32,
      last_execution_at: (high >> 96) as u32,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Job {
    Job {
      flags: JobFlags(JobFlags::ACTIVE | JobFlags::CHECK_KEEPER_MIN_STAKE),
      selector: [0xde, 0xad, 0xbe, 0xef],
      credits: 5_000_000_000_000_000_000,
      max_base_fee: 200,
      reward_pct: 35,
      fixed_reward: 12,
      trigger: TriggerKind::PreDefinedCalldata,
      interval_seconds: 3_600,
      last_execution_at: 1_700_000_000,
    }
  }

  #[test]
  fn layout_places_last_execution_in_top_word_and_config_in_lowest_byte() {
    let word = sample().pack().unwrap();
    assert_eq!(&word[..4], &1_700_000_000u32.to_be_bytes());
    assert_eq!(word[31], JobFlags::ACTIVE | JobFlags::CHECK_KEEPER_MIN_STAKE);
    // selector sits right above the config byte
    assert_eq!(&word[27..31], &[0xde, 0xad, 0xbe, 0xef]);
    // interval (24 bits) follows last execution
    assert_eq!(&word[4..7], &[0x00, 0x0e, 0x10]);
    assert_eq!(word[7], TriggerKind::PreDefinedCalldata.as_u8());
  }

  #[test]
  fn unpack_restores_every_field() {
    let job = sample();
    assert_eq!(Job::unpack(&job.pack().unwrap()), Ok(job));
  }

  #[test]
  fn max_width_values_survive_packing() {
    let job = Job {
      flags: JobFlags(0x1f),
      selector: [0xff; 4],
      credits: MAX_CREDITS,
      max_base_fee: u16::MAX,
      reward_pct: u16::MAX,
      fixed_reward: u32::MAX,
      trigger: TriggerKind::OffchainResolver,
      interval_seconds: MAX_INTERVAL_SECONDS,
      last_execution_at: u32::MAX,
    };
    assert_eq!(Job::unpack(&job.pack().unwrap()), Ok(job));
  }

  #[test]
  fn oversized_fields_are_rejected_instead_of_truncated() {
    let mut job = sample();
    job.credits = MAX_CREDITS + 1;
    assert_eq!(job.pack(), Err(LayoutError::CreditsOutOfRange));

    let mut job = sample();
    job.interval_seconds = MAX_INTERVAL_SECONDS + 1;
    assert_eq!(job.pack(), Err(LayoutError::IntervalOutOfRange));
  }

  #[test]
  fn unknown_calldata_source_fails_to_unpack() {
    let mut word = sample().pack().unwrap();
    word[7] = 9;
    assert_eq!(Job::unpack(&word), Err(LayoutError::UnknownTriggerKind(9)));
  }

  #[test]
  fn flags_toggle_independently() {
    let mut flags = JobFlags::default();
    flags.set(JobFlags::ACTIVE, true);
    flags.set(JobFlags::USE_JOB_OWNER_CREDITS, true);
    assert!(flags.is_active() && flags.uses_owner_credits());
    flags.set(JobFlags::ACTIVE, false);
    assert!(!flags.is_active());
    assert!(flags.uses_owner_credits());
    assert_eq!(flags.bits(), JobFlags::USE_JOB_OWNER_CREDITS);
  }

  #[test]
  fn only_resolver_kinds_are_condition_triggered() {
    assert!(!TriggerKind::FixedSelector.is_condition_triggered());
    assert!(!TriggerKind::PreDefinedCalldata.is_condition_triggered());
    assert!(TriggerKind::Resolver.is_condition_triggered());
    assert!(TriggerKind::OffchainResolver.is_condition_triggered());
  }
}
