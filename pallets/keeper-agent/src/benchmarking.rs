#![cfg(feature = "runtime-benchmarks")]

use crate::*;
use alloc::{vec, vec::Vec};
use frame::deps::frame_support::traits::{EnsureOrigin, fungible::Mutate};
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::{account, v2::*};
use polkadot_sdk::frame_system::RawOrigin;

#[benchmarks]
mod benches {
  use super::*;

  const FUNDS: Balance = 1_000_000_000_000_000_000;
  const SELECTOR: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

  fn fund<T: Config>(who: &T::AccountId) {
    T::Currency::set_balance(who, FUNDS);
    T::StakeCurrency::set_balance(who, FUNDS);
  }

  fn funded<T: Config>(name: &'static str, index: u32) -> T::AccountId {
    let who: T::AccountId = account(name, index, 0);
    fund::<T>(&who);
    who
  }

  fn keeper_stake<T: Config>() -> Balance {
    AgentParams::<T>::get().min_keeper_stake.max(1).saturating_mul(10)
  }

  fn job_deposit<T: Config>() -> Balance {
    RdConfig::<T>::get()
      .job_min_credits
      .max(1)
      .saturating_mul(1_000)
      .max(1_000_000_000_000)
  }

  fn job_target<T: Config>() -> T::AccountId {
    account("job-target", 0, 0)
  }

  fn job_params<T: Config>(trigger: TriggerKind) -> JobParamsOf<T> {
    JobParams {
      target: job_target::<T>(),
      selector: SELECTOR,
      trigger,
      use_job_owner_credits: false,
      assert_resolver_selector: false,
      call_resolver_before_execute: false,
      max_base_fee: u16::MAX,
      reward_pct: 100,
      fixed_reward: 0,
      min_keeper_stake: 0,
      interval_seconds: if trigger.is_condition_triggered() { 0 } else { 3_600 },
    }
  }

  fn bench_calldata<T: Config>() -> CalldataOf<T> {
    BoundedVec::truncate_from(SELECTOR.to_vec())
  }

  fn bench_register_job<T: Config>(
    owner: &T::AccountId,
    trigger: TriggerKind,
    deposit: Balance,
  ) -> JobKey {
    let params = job_params::<T>(trigger);
    let job_key = Pallet::<T>::job_key(&params.target, JobLastIds::<T>::get(&params.target));
    let resolver = trigger.is_condition_triggered().then(|| Resolver {
      target: account("job-resolver", 0, 0),
      calldata: bench_calldata::<T>(),
    });
    Pallet::<T>::register_job(
      RawOrigin::Signed(owner.clone()).into(),
      params,
      resolver,
      bench_calldata::<T>(),
      deposit,
    )
    .unwrap();
    job_key
  }

  fn bench_register_keeper<T: Config>(index: u32) -> (T::AccountId, T::AccountId, KeeperId) {
    let admin = funded::<T>("keeper-admin", index);
    let worker: T::AccountId = account("keeper-worker", index, 0);
    Pallet::<T>::register_as_keeper(
      RawOrigin::Signed(admin.clone()).into(),
      worker.clone(),
      keeper_stake::<T>(),
    )
    .unwrap();
    (admin, worker, LastKeeperId::<T>::get())
  }

  /// Fills the active set so every draw walks the longest ring.
  fn fill_active_set<T: Config>() -> Vec<KeeperId> {
    let max = T::MaxActiveKeepers::get();
    let already = ActiveKeepers::<T>::get().len() as u32;
    (already..max)
      .map(|index| bench_register_keeper::<T>(index).2)
      .collect()
  }

  #[benchmark]
  fn register_job() {
    fill_active_set::<T>();
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let params = job_params::<T>(TriggerKind::FixedSelector);
    let job_key = Pallet::<T>::job_key(&params.target, 0);

    #[extrinsic_call]
    _(
      RawOrigin::Signed(caller),
      params,
      None,
      BoundedVec::default(),
      job_deposit::<T>(),
    );

    assert!(Jobs::<T>::contains_key(job_key));
    assert!(JobAssignments::<T>::get(job_key).is_assigned());
  }

  #[benchmark]
  fn update_job() {
    fill_active_set::<T>();
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, job_deposit::<T>());
    // A floor above every keeper forces a redraw.
    let floor = keeper_stake::<T>().saturating_add(1);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, 100, 150, 1, floor, 7_200);

    assert_eq!(Jobs::<T>::get(job_key).unwrap().interval_seconds, 7_200);
  }

  #[benchmark]
  fn set_job_config() {
    fill_active_set::<T>();
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, job_deposit::<T>());
    JobOwnerCredits::<T>::insert(&caller, job_deposit::<T>());

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, true, true, false, false);

    assert!(Jobs::<T>::get(job_key).unwrap().flags.uses_owner_credits());
  }

  #[benchmark]
  fn set_job_resolver() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::Resolver, 0);
    let resolver = Resolver {
      target: account("job-resolver", 1, 0),
      calldata: bench_calldata::<T>(),
    };

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, resolver.clone());

    assert_eq!(Resolvers::<T>::get(job_key), Some(resolver));
  }

  #[benchmark]
  fn set_job_pre_defined_calldata() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::PreDefinedCalldata, 0);
    let calldata: CalldataOf<T> =
      BoundedVec::truncate_from(vec![0xab; T::MaxCalldataLen::get() as usize]);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, calldata.clone());

    assert_eq!(PreDefinedCalldatas::<T>::get(job_key), Some(calldata));
  }

  #[benchmark]
  fn initiate_job_transfer() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, 0);
    let to: T::AccountId = account("new-owner", 0, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, to.clone());

    assert_eq!(JobMetadata::<T>::get(job_key).unwrap().pending_owner, Some(to));
  }

  #[benchmark]
  fn accept_job_transfer() {
    fill_active_set::<T>();
    let owner = funded::<T>("job-owner", 0);
    let job_key = bench_register_job::<T>(&owner, TriggerKind::FixedSelector, 0);
    let caller: T::AccountId = whitelisted_caller();
    Pallet::<T>::initiate_job_transfer(
      RawOrigin::Signed(owner).into(),
      job_key,
      caller.clone(),
    )
    .unwrap();

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), job_key);

    assert_eq!(JobMetadata::<T>::get(job_key).unwrap().owner, caller);
  }

  #[benchmark]
  fn deposit_job_credits() {
    fill_active_set::<T>();
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, 0);
    let amount = job_deposit::<T>();

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, amount);

    assert!(Jobs::<T>::get(job_key).unwrap().credits > 0);
    assert!(JobAssignments::<T>::get(job_key).is_assigned());
  }

  #[benchmark]
  fn withdraw_job_credits() {
    fill_active_set::<T>();
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, job_deposit::<T>());
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key, to, CreditAmount::All);

    assert_eq!(Jobs::<T>::get(job_key).unwrap().credits, 0);
    assert!(!JobAssignments::<T>::get(job_key).is_assigned());
  }

  #[benchmark]
  fn deposit_job_owner_credits() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let owner: T::AccountId = account("job-owner", 0, 0);
    let amount = job_deposit::<T>();

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), owner.clone(), amount);

    assert!(JobOwnerCredits::<T>::get(owner) > 0);
  }

  #[benchmark]
  fn withdraw_job_owner_credits() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    Pallet::<T>::deposit_job_owner_credits(
      RawOrigin::Signed(caller.clone()).into(),
      caller.clone(),
      job_deposit::<T>(),
    )
    .unwrap();
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), to, CreditAmount::All);

    assert_eq!(JobOwnerCredits::<T>::get(caller), 0);
  }

  #[benchmark]
  fn register_as_keeper() {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let worker: T::AccountId = account("keeper-worker", u32::MAX, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), worker.clone(), keeper_stake::<T>());

    assert!(WorkerKeeperIds::<T>::contains_key(worker));
  }

  #[benchmark]
  fn set_worker_address() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    let worker: T::AccountId = account("keeper-worker", u32::MAX, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id, worker.clone());

    assert_eq!(WorkerKeeperIds::<T>::get(worker), Some(keeper_id));
  }

  #[benchmark]
  fn stake() {
    let (_, _, keeper_id) = bench_register_keeper::<T>(0);
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let amount = keeper_stake::<T>();

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), keeper_id, amount);

    assert_eq!(
      Keepers::<T>::get(keeper_id).unwrap().stake,
      keeper_stake::<T>().saturating_mul(2)
    );
  }

  #[benchmark]
  fn initiate_redeem() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    // Burns the slashed stake and moves the rest of the amount into a pending withdrawal.
    SlashedStake::<T>::insert(keeper_id, 1);
    let amount = keeper_stake::<T>();

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id, amount);

    assert_eq!(SlashedStake::<T>::get(keeper_id), 0);
    assert!(PendingWithdrawals::<T>::get(keeper_id).amount > 0);
  }

  #[benchmark]
  fn finalize_redeem() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    AgentParams::<T>::mutate(|config| config.pending_withdrawal_timeout = 0);
    Pallet::<T>::initiate_redeem(
      RawOrigin::Signed(admin.clone()).into(),
      keeper_id,
      keeper_stake::<T>(),
    )
    .unwrap();
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id, to);

    assert_eq!(PendingWithdrawals::<T>::get(keeper_id).amount, 0);
  }

  #[benchmark]
  fn withdraw_compensation() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    let amount = job_deposit::<T>();
    Compensations::<T>::insert(keeper_id, amount);
    fund::<T>(&Pallet::<T>::account_id());
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id, to, amount);

    assert_eq!(Compensations::<T>::get(keeper_id), 0);
  }

  #[benchmark]
  fn assign_keeper(n: Linear<1, { T::MaxJobKeysPerCall::get() }>) {
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    // Registered with no keeper around, so every job starts unassigned.
    let job_keys: Vec<JobKey> = (0..n)
      .map(|_| bench_register_job::<T>(&caller, TriggerKind::FixedSelector, job_deposit::<T>()))
      .collect();
    fill_active_set::<T>();
    let bounded = BoundedVec::<JobKey, T::MaxJobKeysPerCall>::truncate_from(job_keys.clone());

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), bounded);

    assert!(
      job_keys
        .iter()
        .all(|job_key| JobAssignments::<T>::get(job_key).is_assigned())
    );
  }

  #[benchmark]
  fn release_job() {
    bench_register_keeper::<T>(0);
    let caller: T::AccountId = whitelisted_caller();
    fund::<T>(&caller);
    let job_key = bench_register_job::<T>(&caller, TriggerKind::FixedSelector, job_deposit::<T>());

    #[extrinsic_call]
    _(RawOrigin::Signed(caller), job_key);

    assert!(!JobAssignments::<T>::get(job_key).is_assigned());
  }

  #[benchmark]
  fn disable_keeper() {
    fill_active_set::<T>();
    let keeper_id = ActiveKeepers::<T>::get()[0];
    let admin = Keepers::<T>::get(keeper_id).unwrap().admin;

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id);

    assert!(!Keepers::<T>::get(keeper_id).unwrap().is_active);
  }

  #[benchmark]
  fn initiate_keeper_activation() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    Pallet::<T>::disable_keeper(RawOrigin::Signed(admin.clone()).into(), keeper_id).unwrap();

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id);

    assert!(KeeperActivationCanBeFinalizedAt::<T>::contains_key(keeper_id));
  }

  #[benchmark]
  fn finalize_keeper_activation() {
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    Pallet::<T>::disable_keeper(RawOrigin::Signed(admin.clone()).into(), keeper_id).unwrap();
    KeeperActivationCanBeFinalizedAt::<T>::insert(keeper_id, 0);

    #[extrinsic_call]
    _(RawOrigin::Signed(admin), keeper_id);

    assert!(Keepers::<T>::get(keeper_id).unwrap().is_active);
  }

  #[benchmark]
  fn initiate_keeper_slashing() {
    fill_active_set::<T>();
    let owner = funded::<T>("job-owner", 0);
    let job_key = bench_register_job::<T>(&owner, TriggerKind::Resolver, job_deposit::<T>());
    let assigned = JobAssignments::<T>::get(job_key).keeper;

    // Walk epochs until someone other than the assigned keeper rotates in.
    let epoch_blocks = RdConfig::<T>::get().slashing_epoch_blocks.max(1);
    let mut block = frame_system::Pallet::<T>::block_number();
    for _ in 0..T::MaxActiveKeepers::get() {
      if Pallet::<T>::slasher_id_by_block(block, &job_key) != Some(assigned) {
        break;
      }
      block = block.saturating_add(epoch_blocks.into());
    }
    frame_system::Pallet::<T>::set_block_number(block);
    let slasher_keeper_id = Pallet::<T>::slasher_id_by_block(block, &job_key).unwrap();
    assert_ne!(slasher_keeper_id, assigned, "needs at least two active keepers");
    let worker = Keepers::<T>::get(slasher_keeper_id).unwrap().worker;
    let details = JobMetadata::<T>::get(job_key).unwrap();

    #[extrinsic_call]
    _(
      RawOrigin::Signed(worker),
      details.target,
      details.job_id,
      slasher_keeper_id,
      SlashingProbe::Calldata(bench_calldata::<T>()),
    );

    assert_eq!(
      JobAssignments::<T>::get(job_key).reserved_slasher,
      slasher_keeper_id
    );
  }

  #[benchmark]
  fn execute() {
    fill_active_set::<T>();
    let owner = funded::<T>("job-owner", 0);
    let job_key = bench_register_job::<T>(&owner, TriggerKind::FixedSelector, job_deposit::<T>());
    let keeper_id = JobAssignments::<T>::get(job_key).keeper;
    let worker = Keepers::<T>::get(keeper_id).unwrap().worker;

    #[extrinsic_call]
    _(
      RawOrigin::Signed(worker),
      job_key,
      keeper_id,
      ExecuteConfig {
        accrue_reward: true,
        accept_max_base_fee_limit: true,
      },
      None,
    );

    assert_eq!(ExecutionLock::<T>::get(), LockState::Idle);
  }

  #[benchmark]
  fn set_agent_params() -> Result<(), BenchmarkError> {
    let origin = T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    let fee_ppm = T::MaxDepositFee::get().deconstruct();

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, 1_000, 3_600, fee_ppm);

    assert_eq!(AgentParams::<T>::get().fee_ppm, fee_ppm);
    Ok(())
  }

  #[benchmark]
  fn set_randao_config() -> Result<(), BenchmarkError> {
    let origin = T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    let config = RandaoConfig {
      period1: 60,
      ..RdConfig::<T>::get()
    };

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, config);

    assert_eq!(RdConfig::<T>::get(), config);
    Ok(())
  }

  #[benchmark]
  fn owner_slash() -> Result<(), BenchmarkError> {
    let origin = T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    let (admin, _, keeper_id) = bench_register_keeper::<T>(0);
    Pallet::<T>::initiate_redeem(RawOrigin::Signed(admin).into(), keeper_id, 2).unwrap();
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, keeper_id, to, 1, 1);

    assert_eq!(SlashedStake::<T>::get(keeper_id), 2);
    Ok(())
  }

  #[benchmark]
  fn withdraw_fees() -> Result<(), BenchmarkError> {
    let origin = T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    FeeTotal::<T>::put(job_deposit::<T>());
    fund::<T>(&Pallet::<T>::account_id());
    let to: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, to);

    assert_eq!(FeeTotal::<T>::get(), 0);
    Ok(())
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
