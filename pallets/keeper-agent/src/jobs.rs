//! Job registry: registration, updates, config flags and ownership transfer.

use crate::*;
use codec::Decode;
use frame::deps::sp_runtime::traits::TrailingZeroInput;
use frame::prelude::*;
use keeper_primitives::{MAX_INTERVAL_SECONDS, MAX_JOB_ID};

impl<T: Config> Pallet<T> {
  fn validate_job_terms(
    trigger: TriggerKind,
    max_base_fee: u16,
    reward_pct: u16,
    fixed_reward: u32,
    interval_seconds: u32,
  ) -> DispatchResult {
    ensure!(max_base_fee > 0, Error::<T>::MissingMaxBaseFee);
    ensure!(
      reward_pct > 0 || fixed_reward > 0,
      Error::<T>::MissingJobRewards
    );
    ensure!(
      interval_seconds <= MAX_INTERVAL_SECONDS,
      Error::<T>::IntervalOutOfRange
    );
    if trigger.is_condition_triggered() {
      ensure!(interval_seconds == 0, Error::<T>::ResolverJobCantHaveInterval);
    } else {
      ensure!(interval_seconds > 0, Error::<T>::JobShouldHaveInterval);
    }
    Ok(())
  }

  fn ensure_valid_target(target: &T::AccountId) -> DispatchResult {
    ensure!(*target != Self::account_id(), Error::<T>::InvalidJobTarget);
    if let Ok(zero) = T::AccountId::decode(&mut TrailingZeroInput::zeroes()) {
      ensure!(*target != zero, Error::<T>::InvalidJobTarget);
    }
    Ok(())
  }

  pub(crate) fn do_register_job(
    owner: T::AccountId,
    params: JobParamsOf<T>,
    resolver: Option<ResolverOf<T>>,
    pre_defined_calldata: CalldataOf<T>,
    deposit: Balance,
  ) -> Result<(JobKey, JobId), DispatchError> {
    Self::ensure_valid_target(&params.target)?;
    Self::validate_job_terms(
      params.trigger,
      params.max_base_fee,
      params.reward_pct,
      params.fixed_reward,
      params.interval_seconds,
    )?;
    match params.trigger {
      TriggerKind::Resolver => ensure!(resolver.is_some(), Error::<T>::MissingResolver),
      TriggerKind::PreDefinedCalldata => ensure!(
        !pre_defined_calldata.is_empty(),
        Error::<T>::MissingPreDefinedCalldata
      ),
      TriggerKind::FixedSelector | TriggerKind::OffchainResolver => {}
    }

    let job_id = JobLastIds::<T>::get(&params.target);
    ensure!(job_id <= MAX_JOB_ID, Error::<T>::JobIdOverflow);
    JobLastIds::<T>::insert(&params.target, job_id.saturating_add(1));
    let job_key = Self::job_key(&params.target, job_id);

    let mut flags = JobFlags(JobFlags::ACTIVE);
    flags.set(JobFlags::USE_JOB_OWNER_CREDITS, params.use_job_owner_credits);
    flags.set(JobFlags::ASSERT_RESOLVER_SELECTOR, params.assert_resolver_selector);
    flags.set(JobFlags::CHECK_KEEPER_MIN_STAKE, params.min_keeper_stake > 0);
    flags.set(
      JobFlags::CALL_RESOLVER_BEFORE_EXECUTE,
      params.call_resolver_before_execute,
    );

    let mut job = Job {
      flags,
      selector: params.selector,
      credits: 0,
      max_base_fee: params.max_base_fee,
      reward_pct: params.reward_pct,
      fixed_reward: params.fixed_reward,
      trigger: params.trigger,
      interval_seconds: params.interval_seconds,
      last_execution_at: 0,
    };

    if params.trigger.is_condition_triggered() {
      if let Some(resolver) = resolver {
        Resolvers::<T>::insert(job_key, resolver);
      }
    } else if params.trigger == TriggerKind::PreDefinedCalldata {
      PreDefinedCalldatas::<T>::insert(job_key, pre_defined_calldata);
    }

    JobMetadata::<T>::insert(
      job_key,
      JobDetails {
        target: params.target.clone(),
        job_id,
        owner: owner.clone(),
        pending_owner: None,
        min_keeper_stake: params.min_keeper_stake,
        created_at: Self::now(),
      },
    );

    Self::deposit_event(Event::JobRegistered {
      job_key,
      target: params.target,
      job_id,
      owner: owner.clone(),
    });

    if deposit > 0 {
      let (net, fee) = Self::take_deposit(&owner, deposit)?;
      if job.flags.uses_owner_credits() {
        JobOwnerCredits::<T>::mutate(&owner, |credits| *credits = credits.saturating_add(net));
        Self::deposit_event(Event::OwnerCreditsDeposited {
          owner: owner.clone(),
          depositor: owner,
          amount: net,
          fee,
        });
      } else {
        Self::add_job_credits(&mut job, net)?;
        Self::deposit_event(Event::JobCreditsDeposited {
          job_key,
          depositor: owner,
          amount: net,
          fee,
        });
      }
    }
    Jobs::<T>::insert(job_key, job);

    Self::assign_if_required(&job_key);
    Ok((job_key, job_id))
  }

  /// Target, selector and trigger kind are fixed at registration.
  pub(crate) fn do_update_job(
    who: T::AccountId,
    job_key: JobKey,
    max_base_fee: u16,
    reward_pct: u16,
    fixed_reward: u32,
    min_keeper_stake: Balance,
    interval_seconds: u32,
  ) -> DispatchResult {
    let mut details = Self::ensure_job_owner(&who, &job_key)?;
    let mut job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    Self::validate_job_terms(
      job.trigger,
      max_base_fee,
      reward_pct,
      fixed_reward,
      interval_seconds,
    )?;

    job.max_base_fee = max_base_fee;
    job.reward_pct = reward_pct;
    job.fixed_reward = fixed_reward;
    job.interval_seconds = interval_seconds;
    job
      .flags
      .set(JobFlags::CHECK_KEEPER_MIN_STAKE, min_keeper_stake > 0);
    details.min_keeper_stake = min_keeper_stake;
    Jobs::<T>::insert(job_key, job);
    JobMetadata::<T>::insert(job_key, details);

    Self::deposit_event(Event::JobUpdated {
      job_key,
      max_base_fee,
      reward_pct,
      fixed_reward,
      min_keeper_stake,
      interval_seconds,
    });

    // A raised floor may disqualify the current keeper.
    let assignment = JobAssignments::<T>::get(job_key);
    if assignment.is_assigned() {
      let floor = min_keeper_stake.max(AgentParams::<T>::get().min_keeper_stake);
      let stake = Keepers::<T>::get(assignment.keeper)
        .map(|keeper| keeper.stake)
        .unwrap_or_default();
      if stake < floor {
        Self::assign_next_keeper(&job_key);
      }
    }
    Ok(())
  }

  pub(crate) fn do_set_job_config(
    who: T::AccountId,
    job_key: JobKey,
    is_active: bool,
    use_job_owner_credits: bool,
    assert_resolver_selector: bool,
    call_resolver_before_execute: bool,
  ) -> DispatchResult {
    Self::ensure_job_owner(&who, &job_key)?;
    let mut job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    let was_active = job.flags.is_active();
    let used_owner_credits = job.flags.uses_owner_credits();

    job.flags.set(JobFlags::ACTIVE, is_active);
    job
      .flags
      .set(JobFlags::USE_JOB_OWNER_CREDITS, use_job_owner_credits);
    job
      .flags
      .set(JobFlags::ASSERT_RESOLVER_SELECTOR, assert_resolver_selector);
    job.flags.set(
      JobFlags::CALL_RESOLVER_BEFORE_EXECUTE,
      call_resolver_before_execute,
    );
    Jobs::<T>::insert(job_key, job);

    Self::deposit_event(Event::JobConfigSet {
      job_key,
      is_active,
      use_job_owner_credits,
      assert_resolver_selector,
      call_resolver_before_execute,
    });

    match (was_active, is_active) {
      (false, true) => Self::assign_if_required(&job_key),
      (true, false) => Self::release_keeper(&job_key),
      (true, true) if used_owner_credits != use_job_owner_credits => {
        Self::assign_if_required(&job_key)
      }
      _ => {}
    }
    Ok(())
  }

  pub(crate) fn do_set_job_resolver(
    who: T::AccountId,
    job_key: JobKey,
    resolver: ResolverOf<T>,
  ) -> DispatchResult {
    Self::ensure_job_owner(&who, &job_key)?;
    let job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    ensure!(
      job.trigger.is_condition_triggered(),
      Error::<T>::NotSupportedByJobCalldataSource
    );
    let target = resolver.target.clone();
    Resolvers::<T>::insert(job_key, resolver);
    Self::deposit_event(Event::JobResolverSet {
      job_key,
      resolver: target,
    });
    Ok(())
  }

  pub(crate) fn do_set_job_pre_defined_calldata(
    who: T::AccountId,
    job_key: JobKey,
    calldata: CalldataOf<T>,
  ) -> DispatchResult {
    Self::ensure_job_owner(&who, &job_key)?;
    let job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    ensure!(
      job.trigger == TriggerKind::PreDefinedCalldata,
      Error::<T>::NotSupportedByJobCalldataSource
    );
    ensure!(!calldata.is_empty(), Error::<T>::MissingPreDefinedCalldata);
    PreDefinedCalldatas::<T>::insert(job_key, calldata);
    Self::deposit_event(Event::JobPreDefinedCalldataSet { job_key });
    Ok(())
  }

  pub(crate) fn do_initiate_job_transfer(
    who: T::AccountId,
    job_key: JobKey,
    to: T::AccountId,
  ) -> DispatchResult {
    let mut details = Self::ensure_job_owner(&who, &job_key)?;
    details.pending_owner = Some(to.clone());
    JobMetadata::<T>::insert(job_key, details);
    Self::deposit_event(Event::JobTransferInitiated {
      job_key,
      from: who,
      to,
    });
    Ok(())
  }

  pub(crate) fn do_accept_job_transfer(who: T::AccountId, job_key: JobKey) -> DispatchResult {
    let mut details = JobMetadata::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    ensure!(
      details.pending_owner.as_ref() == Some(&who),
      Error::<T>::OnlyPendingJobOwner
    );
    details.owner = who.clone();
    details.pending_owner = None;
    JobMetadata::<T>::insert(job_key, details);
    Self::deposit_event(Event::JobTransferAccepted { job_key, to: who });

    // Owner credits now come from a different account.
    Self::assign_if_required(&job_key);
    Ok(())
  }
}
