#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn register_job() -> Weight;
  fn update_job() -> Weight;
  fn set_job_config() -> Weight;
  fn set_job_resolver() -> Weight;
  fn set_job_pre_defined_calldata() -> Weight;
  fn initiate_job_transfer() -> Weight;
  fn accept_job_transfer() -> Weight;
  fn deposit_job_credits() -> Weight;
  fn withdraw_job_credits() -> Weight;
  fn deposit_job_owner_credits() -> Weight;
  fn withdraw_job_owner_credits() -> Weight;
  fn register_as_keeper() -> Weight;
  fn set_worker_address() -> Weight;
  fn stake() -> Weight;
  fn initiate_redeem() -> Weight;
  fn finalize_redeem() -> Weight;
  fn withdraw_compensation() -> Weight;
  fn assign_keeper(jobs: u32) -> Weight;
  fn release_job() -> Weight;
  fn disable_keeper() -> Weight;
  fn initiate_keeper_activation() -> Weight;
  fn finalize_keeper_activation() -> Weight;
  fn initiate_keeper_slashing() -> Weight;
  /// Settlement only; job gas is added by the call.
  fn execute() -> Weight;
  fn set_agent_params() -> Weight;
  fn set_randao_config() -> Weight;
  fn owner_slash() -> Weight;
  fn withdraw_fees() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn register_job() -> Weight {
    // The draw walks the whole active set in the worst case.
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(40_000_000, 3500)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(8)))
      .saturating_add(T::DbWeight::get().writes(9))
  }

  fn update_job() -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(25_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(6)))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn set_job_config() -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(22_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(6)))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn set_job_resolver() -> Weight {
    Weight::from_parts(15_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn set_job_pre_defined_calldata() -> Weight {
    Weight::from_parts(15_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn initiate_job_transfer() -> Weight {
    Weight::from_parts(12_000_000, 900)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn accept_job_transfer() -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(20_000_000, 2000)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(6)))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn deposit_job_credits() -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(30_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(8)))
      .saturating_add(T::DbWeight::get().writes(6))
  }

  fn withdraw_job_credits() -> Weight {
    Weight::from_parts(30_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(6))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn deposit_job_owner_credits() -> Weight {
    Weight::from_parts(25_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn withdraw_job_owner_credits() -> Weight {
    Weight::from_parts(25_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn register_as_keeper() -> Weight {
    Weight::from_parts(35_000_000, 2500)
      .saturating_add(T::DbWeight::get().reads(6))
      .saturating_add(T::DbWeight::get().writes(6))
  }

  fn set_worker_address() -> Weight {
    Weight::from_parts(18_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn stake() -> Weight {
    Weight::from_parts(25_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn initiate_redeem() -> Weight {
    Weight::from_parts(22_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn finalize_redeem() -> Weight {
    Weight::from_parts(25_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn withdraw_compensation() -> Weight {
    Weight::from_parts(25_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn assign_keeper(jobs: u32) -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(10_000_000, 1000)
      .saturating_add(
        Weight::from_parts(20_000_000, 2500).saturating_mul(u64::from(jobs)),
      )
      .saturating_add(
        T::DbWeight::get().reads(draw_reads.saturating_add(6).saturating_mul(u64::from(jobs))),
      )
      .saturating_add(T::DbWeight::get().writes(3u64.saturating_mul(u64::from(jobs))))
  }

  fn release_job() -> Weight {
    Weight::from_parts(20_000_000, 2000)
      .saturating_add(T::DbWeight::get().reads(7))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn disable_keeper() -> Weight {
    Weight::from_parts(15_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn initiate_keeper_activation() -> Weight {
    Weight::from_parts(12_000_000, 900)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn finalize_keeper_activation() -> Weight {
    Weight::from_parts(18_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn initiate_keeper_slashing() -> Weight {
    // Excludes the probe call itself.
    Weight::from_parts(35_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads(9))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn execute() -> Weight {
    let draw_reads = u64::from(T::MaxActiveKeepers::get());
    Weight::from_parts(60_000_000, 4500)
      .saturating_add(T::DbWeight::get().reads(draw_reads.saturating_add(16)))
      .saturating_add(T::DbWeight::get().writes(10))
  }

  fn set_agent_params() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn set_randao_config() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn owner_slash() -> Weight {
    Weight::from_parts(28_000_000, 2000)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn withdraw_fees() -> Weight {
    Weight::from_parts(22_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(3))
  }
}

impl WeightInfo for () {
  fn register_job() -> Weight { Weight::from_parts(40_000_000, 3500) }
  fn update_job() -> Weight { Weight::from_parts(25_000_000, 2500) }
  fn set_job_config() -> Weight { Weight::from_parts(22_000_000, 2500) }
  fn set_job_resolver() -> Weight { Weight::from_parts(15_000_000, 1500) }
  fn set_job_pre_defined_calldata() -> Weight { Weight::from_parts(15_000_000, 1500) }
  fn initiate_job_transfer() -> Weight { Weight::from_parts(12_000_000, 900) }
  fn accept_job_transfer() -> Weight { Weight::from_parts(20_000_000, 2000) }
  fn deposit_job_credits() -> Weight { Weight::from_parts(30_000_000, 2500) }
  fn withdraw_job_credits() -> Weight { Weight::from_parts(30_000_000, 2500) }
  fn deposit_job_owner_credits() -> Weight { Weight::from_parts(25_000_000, 1800) }
  fn withdraw_job_owner_credits() -> Weight { Weight::from_parts(25_000_000, 1800) }
  fn register_as_keeper() -> Weight { Weight::from_parts(35_000_000, 2500) }
  fn set_worker_address() -> Weight { Weight::from_parts(18_000_000, 1500) }
  fn stake() -> Weight { Weight::from_parts(25_000_000, 1800) }
  fn initiate_redeem() -> Weight { Weight::from_parts(22_000_000, 1800) }
  fn finalize_redeem() -> Weight { Weight::from_parts(25_000_000, 1800) }
  fn withdraw_compensation() -> Weight { Weight::from_parts(25_000_000, 1800) }
  fn assign_keeper(jobs: u32) -> Weight {
    Weight::from_parts(10_000_000, 1000)
      .saturating_add(Weight::from_parts(20_000_000, 2500).saturating_mul(u64::from(jobs)))
  }
  fn release_job() -> Weight { Weight::from_parts(20_000_000, 2000) }
  fn disable_keeper() -> Weight { Weight::from_parts(15_000_000, 1500) }
  fn initiate_keeper_activation() -> Weight { Weight::from_parts(12_000_000, 900) }
  fn finalize_keeper_activation() -> Weight { Weight::from_parts(18_000_000, 1500) }
  fn initiate_keeper_slashing() -> Weight { Weight::from_parts(35_000_000, 3000) }
  fn execute() -> Weight { Weight::from_parts(60_000_000, 4500) }
  fn set_agent_params() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_randao_config() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn owner_slash() -> Weight { Weight::from_parts(28_000_000, 2000) }
  fn withdraw_fees() -> Weight { Weight::from_parts(22_000_000, 1500) }
}
