//! Assignment scheduler: stake-aware pseudo-random keeper draw, release and the rotation
//! slasher.

use crate::*;
use frame::deps::{sp_core::U256, sp_runtime::SaturatedConversion};
use frame::prelude::*;

impl<T: Config> Pallet<T> {
  /// `(seed + job_key) mod len`, wrapping on overflow.
  pub(crate) fn ring_index(seed: U256, job_key: &JobKey, len: usize) -> usize {
    let (sum, _) = seed.overflowing_add(U256::from_big_endian(job_key));
    (sum % U256::from(len)).low_u64() as usize
  }

  pub fn slasher_id_by_block(block: BlockNumberFor<T>, job_key: &JobKey) -> Option<KeeperId> {
    let active = ActiveKeepers::<T>::get();
    if active.is_empty() {
      return None;
    }
    let epoch_blocks = RdConfig::<T>::get().slashing_epoch_blocks.max(1) as u64;
    let epoch = block.saturated_into::<u64>() / epoch_blocks;
    let index = Self::ring_index(U256::from(epoch), job_key, active.len());
    active.get(index).copied()
  }

  pub fn current_slasher_id(job_key: &JobKey) -> Option<KeeperId> {
    Self::slasher_id_by_block(frame_system::Pallet::<T>::block_number(), job_key)
  }

  /// Whether an active job holds at least the credits needed to keep a keeper assigned.
  /// A job with no credits at all never qualifies.
  pub(crate) fn job_qualifies(job: &Job, owner: &T::AccountId) -> bool {
    let min_credits = RdConfig::<T>::get().job_min_credits.max(1);
    job.flags.is_active() && Self::available_credits(job, owner) >= min_credits
  }

  /// Releases the job if it stopped qualifying. Returns `true` when it no longer qualifies.
  pub(crate) fn release_if_required(job_key: &JobKey) -> bool {
    let qualifies = match Self::job_of(job_key) {
      Some((job, details)) => Self::job_qualifies(&job, &details.owner),
      None => false,
    };
    if !qualifies {
      Self::release_keeper(job_key);
    }
    !qualifies
  }

  /// Draws a keeper only for qualifying jobs without one.
  pub(crate) fn assign_if_required(job_key: &JobKey) {
    if Self::release_if_required(job_key) {
      return;
    }
    if !JobAssignments::<T>::get(job_key).is_assigned() {
      Self::assign_next_keeper(job_key);
    }
  }

  /// Drops the assignment together with any slashing window.
  pub(crate) fn release_keeper(job_key: &JobKey) {
    let assignment = JobAssignments::<T>::take(job_key);
    if assignment.is_assigned() {
      KeeperJobLocks::<T>::mutate(assignment.keeper, |locks| *locks = locks.saturating_sub(1));
      log::debug!(
        target: LOG_TARGET,
        "job {:?} released by keeper {}",
        job_key,
        assignment.keeper
      );
      Self::deposit_event(Event::JobKeeperChanged {
        job_key: *job_key,
        from: assignment.keeper,
        to: 0,
      });
    }
  }

  /// Starts a fresh assignment; a new assignment never inherits a slashing window.
  fn set_assigned_keeper(job_key: &JobKey, keeper_id: KeeperId) {
    let previous = JobAssignments::<T>::get(job_key).keeper;
    if previous != keeper_id {
      if previous != 0 {
        KeeperJobLocks::<T>::mutate(previous, |locks| *locks = locks.saturating_sub(1));
      }
      KeeperJobLocks::<T>::mutate(keeper_id, |locks| *locks = locks.saturating_add(1));
      Self::deposit_event(Event::JobKeeperChanged {
        job_key: *job_key,
        from: previous,
        to: keeper_id,
      });
    }
    JobAssignments::<T>::insert(
      job_key,
      Assignment {
        keeper: keeper_id,
        ..Default::default()
      },
    );
  }

  /// Re-runs the draw for a job.
  ///
  /// Starting at `(random + job_key) mod n`, the active set is scanned in ring order for the
  /// first keeper meeting `max(job floor, agent minimum)`. Failing that, the richest keeper seen
  /// is taken if it is above the agent minimum; otherwise the job is left unassigned.
  pub(crate) fn assign_next_keeper(job_key: &JobKey) {
    if Self::release_if_required(job_key) {
      return;
    }
    let Some(details) = JobMetadata::<T>::get(job_key) else {
      return;
    };

    let active = ActiveKeepers::<T>::get();
    if active.is_empty() {
      Self::release_keeper(job_key);
      Self::deposit_event(Event::NoEligibleKeeper { job_key: *job_key });
      return;
    }

    let agent_min = AgentParams::<T>::get().min_keeper_stake;
    let floor = details.min_keeper_stake.max(agent_min);
    let start = Self::ring_index(T::Strategy::pseudo_random(), job_key, active.len());

    let mut richest: Option<(KeeperId, Balance)> = None;
    for offset in 0..active.len() {
      let keeper_id = active[(start + offset) % active.len()];
      let Some(keeper) = Keepers::<T>::get(keeper_id) else {
        continue;
      };
      if keeper.stake >= floor {
        Self::set_assigned_keeper(job_key, keeper_id);
        return;
      }
      if richest.map_or(true, |(_, stake)| keeper.stake > stake) {
        richest = Some((keeper_id, keeper.stake));
      }
    }

    match richest {
      Some((keeper_id, stake)) if stake > agent_min => {
        log::debug!(
          target: LOG_TARGET,
          "job {:?}: no keeper meets floor {}, falling back to keeper {}",
          job_key,
          floor,
          keeper_id
        );
        Self::set_assigned_keeper(job_key, keeper_id);
      }
      _ => {
        Self::release_keeper(job_key);
        log::debug!(target: LOG_TARGET, "job {:?}: no eligible keeper", job_key);
        Self::deposit_event(Event::NoEligibleKeeper { job_key: *job_key });
      }
    }
  }

  pub(crate) fn do_assign_keeper(
    caller: Option<T::AccountId>,
    job_keys: alloc::vec::Vec<JobKey>,
  ) -> DispatchResult {
    for job_key in job_keys.iter() {
      let details = JobMetadata::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
      if let Some(who) = &caller {
        ensure!(details.owner == *who, Error::<T>::OnlyJobOwner);
      }
      Self::assign_if_required(job_key);
    }
    Ok(())
  }

  /// The owner may always release. The assigned keeper (admin or worker) may release a job
  /// that stopped qualifying, any job once it left the active set, or otherwise once the job's
  /// takeover windows have passed.
  pub(crate) fn do_release_job(who: T::AccountId, job_key: JobKey) -> DispatchResult {
    let (job, details) = Self::job_of(&job_key).ok_or(Error::<T>::JobNotFound)?;
    if details.owner == who {
      Self::release_keeper(&job_key);
      return Ok(());
    }

    let assignment = JobAssignments::<T>::get(job_key);
    let keeper = Keepers::<T>::get(assignment.keeper).ok_or(Error::<T>::NotAuthorizedToRelease)?;
    ensure!(
      keeper.admin == who || keeper.worker == who,
      Error::<T>::NotAuthorizedToRelease
    );

    if Self::release_if_required(&job_key) {
      return Ok(());
    }
    // A keeper deactivated by a slash cannot execute its remaining jobs.
    if !keeper.is_active {
      Self::release_keeper(&job_key);
      return Ok(());
    }

    let rd = RdConfig::<T>::get();
    let now = Self::now();
    if job.interval_seconds > 0 {
      let base = if job.last_execution_at == 0 {
        details.created_at
      } else {
        job.last_execution_at
      };
      let releasable_at = base
        .saturating_add(job.interval_seconds)
        .saturating_add(rd.period1)
        .saturating_add(rd.period2);
      ensure!(now >= releasable_at, Error::<T>::TooEarlyToRelease);
    } else if assignment.slashing_initiated() {
      ensure!(
        now >= assignment.slashing_possible_after.saturating_add(rd.period2),
        Error::<T>::TooEarlyToRelease
      );
    }

    Self::release_keeper(&job_key);
    Ok(())
  }
}
