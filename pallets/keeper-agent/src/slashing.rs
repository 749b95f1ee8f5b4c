//! Slashing engine for overdue assignments.

use crate::*;
use alloc::vec::Vec;
use frame::deps::frame_support::storage;
use frame::prelude::*;
use keeper_primitives::params::BPS_DENOMINATOR;

impl<T: Config> Pallet<T> {
  pub(crate) fn job_gas_limit() -> u64 {
    T::MaxExecutionGas::get().saturating_sub(T::SettlementGasReserve::get())
  }

  /// Asks the job's resolver, without keeping any of its state changes.
  pub(crate) fn query_resolver(job_key: &JobKey) -> Result<Vec<u8>, DispatchError> {
    let resolver = Resolvers::<T>::get(job_key).ok_or(Error::<T>::MissingResolver)?;
    let request = CallRequest {
      target: resolver.target,
      payload: resolver.calldata.into_inner(),
      gas_limit: Self::job_gas_limit(),
    };
    let response = storage::transactional::with_transaction(|| {
      storage::TransactionOutcome::Rollback(T::Dispatcher::resolve(request))
    })
    .map_err(|_| Error::<T>::ResolverCallFailed)?;
    ensure!(
      response.can_execute,
      Error::<T>::JobCheckResolverReturnedFalse
    );
    Ok(response.calldata)
  }

  /// Dry-runs the job call with slasher-supplied calldata.
  fn simulate_job_call(
    target: T::AccountId,
    job_key: &JobKey,
    calldata: CalldataOf<T>,
  ) -> DispatchResult {
    let mut payload = calldata.into_inner();
    payload.extend_from_slice(job_key);
    let request = CallRequest {
      target,
      payload,
      gas_limit: Self::job_gas_limit(),
    };
    let response = storage::transactional::with_transaction(|| {
      storage::TransactionOutcome::Rollback(Result::<_, DispatchError>::Ok(
        T::Dispatcher::dispatch(request),
      ))
    })?;
    ensure!(response.success, Error::<T>::JobCheckCanNotBeExecuted);
    Ok(())
  }

  pub(crate) fn do_initiate_keeper_slashing(
    who: T::AccountId,
    target: T::AccountId,
    job_id: JobId,
    slasher_keeper_id: KeeperId,
    probe: SlashingProbeOf<T>,
  ) -> DispatchResult {
    let job_key = Self::job_key(&target, job_id);
    let (job, details) = Self::job_of(&job_key).ok_or(Error::<T>::JobNotFound)?;

    let slasher = Keepers::<T>::get(slasher_keeper_id).ok_or(Error::<T>::KeeperNotFound)?;
    ensure!(slasher.worker == who, Error::<T>::KeeperWorkerNotAuthorized);
    ensure!(
      slasher.stake >= AgentParams::<T>::get().min_keeper_stake,
      Error::<T>::InsufficientKeeperStake
    );
    ensure!(slasher.is_active, Error::<T>::InactiveKeeper);
    ensure!(job.flags.is_active(), Error::<T>::InactiveJob);
    if job.flags.checks_keeper_min_stake() {
      ensure!(
        slasher.stake >= details.min_keeper_stake,
        Error::<T>::InsufficientJobScopedKeeperStake
      );
    }
    ensure!(
      job.interval_seconds == 0,
      Error::<T>::SlashingOnlyForResolverJobs
    );

    let mut assignment = JobAssignments::<T>::get(job_key);
    ensure!(
      assignment.keeper != slasher_keeper_id,
      Error::<T>::KeeperCantSlash
    );
    ensure!(
      Self::current_slasher_id(&job_key) == Some(slasher_keeper_id),
      Error::<T>::OnlyCurrentSlasher
    );

    let rd = RdConfig::<T>::get();
    let now = Self::now();
    if assignment.slashing_initiated() {
      ensure!(
        now >= assignment.slashing_possible_after.saturating_add(rd.period2),
        Error::<T>::SlashingEpochAlreadyInitiated
      );
    }

    match probe {
      SlashingProbe::UseResolver => {
        Self::query_resolver(&job_key)?;
      }
      SlashingProbe::Calldata(calldata) => {
        Self::simulate_job_call(details.target, &job_key, calldata)?;
      }
    }

    let slashing_possible_after = now.saturating_add(rd.period1);
    assignment.reserved_slasher = slasher_keeper_id;
    assignment.slashing_possible_after = slashing_possible_after;
    JobAssignments::<T>::insert(job_key, assignment);

    Self::deposit_event(Event::KeeperSlashingInitiated {
      job_key,
      slasher_keeper_id,
      slashing_possible_after,
    });
    Ok(())
  }

  /// Moves `fixed + capped_stake * bps` from the assigned keeper to the slasher, never more
  /// than the assigned keeper still holds.
  pub(crate) fn slash_assigned_keeper(
    job_key: &JobKey,
    keeper_id: KeeperId,
    slasher_keeper_id: KeeperId,
  ) {
    let Some(mut keeper) = Keepers::<T>::get(keeper_id) else {
      return;
    };
    let rd = RdConfig::<T>::get();

    let dynamic = rd
      .limit_stake(keeper.stake)
      .saturating_mul(rd.slashing_fee_bps as Balance)
      / BPS_DENOMINATOR as Balance;
    let fixed = rd.slashing_fee_fixed;
    let total = dynamic.saturating_add(fixed);
    let slashed = total.min(keeper.stake);
    let shortfall = total.saturating_sub(slashed);

    keeper.stake = keeper.stake.saturating_sub(slashed);
    if slashed > 0 {
      Keepers::<T>::mutate(slasher_keeper_id, |maybe_slasher| {
        if let Some(slasher) = maybe_slasher {
          slasher.stake = slasher.stake.saturating_add(slashed);
        }
      });
    }

    if keeper.is_active && keeper.stake < AgentParams::<T>::get().min_keeper_stake {
      Self::deactivate_keeper(keeper_id, &mut keeper);
      Self::deposit_event(Event::KeeperDeactivated { keeper_id });
    }
    Keepers::<T>::insert(keeper_id, keeper);

    if shortfall > 0 {
      log::warn!(
        target: LOG_TARGET,
        "keeper {keeper_id} slash short by {shortfall} on job {:?}",
        job_key
      );
    }
    Self::deposit_event(Event::KeeperSlashed {
      job_key: *job_key,
      keeper_id,
      slasher_keeper_id,
      fixed,
      dynamic,
      slashed,
      shortfall,
    });
  }
}
