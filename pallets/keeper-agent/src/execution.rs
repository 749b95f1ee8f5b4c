//! Execution engine.
//!
//! One call walks `Idle -> Locked -> Validated -> Dispatched -> Settled -> Idle`. The global
//! lock is held across the job call, so the target cannot re-enter `execute` for any job.

use crate::*;
use alloc::vec::Vec;
use frame::deps::frame_support::storage;
use frame::prelude::*;

impl<T: Config> Pallet<T> {
  pub(crate) fn do_execute(
    worker: T::AccountId,
    job_key: JobKey,
    keeper_id: KeeperId,
    config: ExecuteConfig,
    calldata: Option<CalldataOf<T>>,
  ) -> Result<Weight, DispatchError> {
    // Locked
    ensure!(
      ExecutionLock::<T>::get() == LockState::Idle,
      Error::<T>::ExecutionReentrancyLocked
    );
    ensure!(
      WorkerKeeperIds::<T>::get(&worker) == Some(keeper_id),
      Error::<T>::KeeperWorkerNotAuthorized
    );
    let keeper = Keepers::<T>::get(keeper_id).ok_or(Error::<T>::KeeperNotFound)?;
    ensure!(
      keeper.stake >= AgentParams::<T>::get().min_keeper_stake,
      Error::<T>::InsufficientKeeperStake
    );
    ExecutionLock::<T>::put(LockState::Locked);

    // Validated
    let (mut job, details) = Self::job_of(&job_key).ok_or(Error::<T>::JobNotFound)?;
    ensure!(job.flags.is_active(), Error::<T>::InactiveJob);
    if job.flags.checks_keeper_min_stake() {
      ensure!(
        keeper.stake >= details.min_keeper_stake,
        Error::<T>::InsufficientJobScopedKeeperStake
      );
    }
    let assignment = JobAssignments::<T>::get(job_key);
    // Takeovers need a keeper still in the pool.
    if assignment.keeper != keeper_id {
      ensure!(keeper.is_active, Error::<T>::InactiveKeeper);
    }
    let now = Self::now();
    Self::authorize_executor(&job_key, &job, &details, &assignment, keeper_id, now)?;
    let base_fee = Self::effective_base_fee(&job, &config)?;

    // Dispatched
    let payload = Self::build_payload(&job_key, &job, calldata)?;
    if job.interval_seconds > 0 {
      job.last_execution_at = now;
      Jobs::<T>::insert(job_key, job);
    }
    let gas_limit = Self::job_gas_limit();
    let request = CallRequest {
      target: details.target.clone(),
      payload,
      gas_limit,
    };
    let response = storage::transactional::with_transaction(|| {
      let response = T::Dispatcher::dispatch(request);
      if response.success {
        storage::TransactionOutcome::Commit(Result::<_, DispatchError>::Ok(response))
      } else {
        storage::TransactionOutcome::Rollback(Ok(response))
      }
    })?;
    let gas_used = response.gas_used.min(gas_limit);

    // Settled. The job call may have touched the job through other entry points.
    let mut job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    let details = JobMetadata::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    let executor_stake = Keepers::<T>::get(keeper_id)
      .map(|keeper| keeper.stake)
      .unwrap_or_default();
    let rd = RdConfig::<T>::get();
    let input = CompensationInput {
      success: response.success,
      gas_used: gas_used.saturating_add(T::JobGasOverhead::get()),
      base_fee,
      reward_pct: job.reward_pct,
      fixed_reward: job.fixed_reward,
      fixed_reward_unit: T::FixedRewardUnit::get(),
      limited_stake: rd.limit_stake(executor_stake),
      randao: rd,
    };
    let computed = T::Strategy::compensation(&input);

    let available = Self::available_credits(&job, &details.owner);
    let compensation = if response.success {
      let shortage = if job.flags.uses_owner_credits() {
        Error::<T>::InsufficientJobOwnerCredits
      } else {
        Error::<T>::InsufficientJobCredits
      };
      ensure!(available >= computed, shortage);
      computed
    } else {
      // A reverted job still pays its caller, up to what it holds.
      computed.min(available)
    };

    if job.flags.uses_owner_credits() {
      JobOwnerCredits::<T>::mutate(&details.owner, |credits| {
        *credits = credits.saturating_sub(compensation)
      });
    } else {
      job.credits = job.credits.saturating_sub(compensation);
      Jobs::<T>::insert(job_key, job);
    }

    if config.accrue_reward {
      Compensations::<T>::mutate(keeper_id, |accrued| {
        *accrued = accrued.saturating_add(compensation)
      });
    } else {
      Self::pay_out(&worker, compensation)?;
    }

    log::trace!(
      target: LOG_TARGET,
      "job {:?} keeper {keeper_id}: gas {gas_used} at {base_fee}, paid {compensation}/{computed}",
      job_key
    );
    Self::deposit_event(Event::Executed {
      job_key,
      keeper_id,
      success: response.success,
      gas_used,
      base_fee,
      compensation,
      accrued: config.accrue_reward,
    });

    if response.success {
      if assignment.is_assigned() && assignment.keeper != keeper_id {
        Self::slash_assigned_keeper(&job_key, assignment.keeper, keeper_id);
      }
    } else {
      log::warn!(target: LOG_TARGET, "job {:?} reverted under keeper {keeper_id}", job_key);
      Self::deposit_event(Event::ExecutionReverted {
        job_key,
        keeper_id,
        return_data: BoundedVec::truncate_from(response.return_data),
      });
      Self::release_keeper(&job_key);
    }
    Self::assign_next_keeper(&job_key);

    ExecutionLock::<T>::put(LockState::Idle);
    Ok(T::WeightInfo::execute().saturating_add(Weight::from_parts(gas_used, 0)))
  }

  /// Interval jobs: the assigned keeper once the interval elapsed, or the rotation slasher
  /// once `interval + period1` elapsed. Resolver jobs: the assigned keeper, or the reserved
  /// slasher inside `[possible_after, possible_after + period2)`.
  fn authorize_executor(
    job_key: &JobKey,
    job: &Job,
    details: &JobDetailsOf<T>,
    assignment: &Assignment,
    keeper_id: KeeperId,
    now: Timestamp,
  ) -> DispatchResult {
    let rd = RdConfig::<T>::get();
    if job.interval_seconds > 0 {
      if assignment.keeper == keeper_id {
        ensure!(
          now >= job.last_execution_at.saturating_add(job.interval_seconds),
          Error::<T>::IntervalNotReached
        );
      } else {
        let base = if job.last_execution_at == 0 {
          details.created_at
        } else {
          job.last_execution_at
        };
        ensure!(
          now >= base.saturating_add(job.interval_seconds).saturating_add(rd.period1),
          Error::<T>::OnlyNextKeeper
        );
        ensure!(
          Self::current_slasher_id(job_key) == Some(keeper_id),
          Error::<T>::OnlyCurrentSlasher
        );
      }
      return Ok(());
    }

    if assignment.keeper == keeper_id {
      return Ok(());
    }
    ensure!(assignment.slashing_initiated(), Error::<T>::SlashingNotInitiated);
    ensure!(
      assignment.reserved_slasher == keeper_id,
      Error::<T>::OnlyReservedSlasher
    );
    ensure!(
      now >= assignment.slashing_possible_after,
      Error::<T>::TooEarlyForSlashing
    );
    ensure!(
      now < assignment.slashing_possible_after.saturating_add(rd.period2),
      Error::<T>::SlashingWindowExpired
    );
    Ok(())
  }

  fn effective_base_fee(job: &Job, config: &ExecuteConfig) -> Result<Balance, DispatchError> {
    let ceiling = (job.max_base_fee as Balance).saturating_mul(T::BaseFeeUnit::get());
    let current = T::BaseFee::get();
    if current <= ceiling {
      return Ok(current);
    }
    ensure!(
      config.accept_max_base_fee_limit,
      Error::<T>::BaseFeeGtGasPrice
    );
    Ok(ceiling)
  }

  fn build_payload(
    job_key: &JobKey,
    job: &Job,
    supplied: Option<CalldataOf<T>>,
  ) -> Result<Vec<u8>, DispatchError> {
    match job.trigger {
      TriggerKind::FixedSelector => Ok(job.selector.to_vec()),
      TriggerKind::PreDefinedCalldata => PreDefinedCalldatas::<T>::get(job_key)
        .map(|calldata| calldata.into_inner())
        .ok_or_else(|| Error::<T>::MissingPreDefinedCalldata.into()),
      TriggerKind::Resolver | TriggerKind::OffchainResolver => {
        let mut calldata = if job.flags.calls_resolver_first() {
          let resolved = Self::query_resolver(job_key)?;
          if let Some(supplied) = supplied {
            ensure!(
              frame::hashing::blake2_256(&supplied) == frame::hashing::blake2_256(&resolved),
              Error::<T>::CalldataHashMismatch
            );
          }
          resolved
        } else {
          supplied
            .ok_or(Error::<T>::MissingInputCalldata)?
            .into_inner()
        };
        if job.flags.asserts_selector() {
          ensure!(
            calldata.get(..4) == Some(&job.selector[..]),
            Error::<T>::SelectorCheckFailed
          );
        }
        calldata.extend_from_slice(job_key);
        Ok(calldata)
      }
    }
  }

  /// Compensation `keeper_id` would earn for `gas_used` at `base_fee`, before the credit cap.
  pub fn calculate_compensation(
    success: bool,
    job_key: &JobKey,
    keeper_id: KeeperId,
    base_fee: Balance,
    gas_used: u64,
  ) -> Option<Balance> {
    let job = Jobs::<T>::get(job_key)?;
    let stake = Keepers::<T>::get(keeper_id)?.stake;
    let rd = RdConfig::<T>::get();
    Some(T::Strategy::compensation(&CompensationInput {
      success,
      gas_used: gas_used.saturating_add(T::JobGasOverhead::get()),
      base_fee,
      reward_pct: job.reward_pct,
      fixed_reward: job.fixed_reward,
      fixed_reward_unit: T::FixedRewardUnit::get(),
      limited_stake: rd.limit_stake(stake),
      randao: rd,
    }))
  }

  /// Executing keeper's stake clipped by the job and agent caps.
  pub fn keeper_limited_stake(keeper_id: KeeperId) -> Balance {
    let stake = Keepers::<T>::get(keeper_id)
      .map(|keeper| keeper.stake)
      .unwrap_or_default();
    RdConfig::<T>::get().limit_stake(stake)
  }
}
