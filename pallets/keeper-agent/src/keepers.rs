//! Keeper registry: identities, stake, two-phase redeem and activation.

use crate::*;
use frame::deps::frame_support::traits::{fungible::Mutate, tokens::Preservation};
use frame::prelude::*;
use keeper_primitives::MAX_STAKE;

impl<T: Config> Pallet<T> {
  pub(crate) fn do_register_as_keeper(
    admin: T::AccountId,
    worker: T::AccountId,
    initial_stake: Balance,
  ) -> Result<KeeperId, DispatchError> {
    ensure!(
      !WorkerKeeperIds::<T>::contains_key(&worker),
      Error::<T>::WorkerAlreadyAssigned
    );
    ensure!(
      initial_stake >= AgentParams::<T>::get().min_keeper_stake,
      Error::<T>::InsufficientKeeperStake
    );
    ensure!(initial_stake <= MAX_STAKE, Error::<T>::StakeAmountOverflow);

    T::StakeCurrency::transfer(
      &admin,
      &Self::account_id(),
      initial_stake,
      Preservation::Preserve,
    )?;

    let keeper_id = LastKeeperId::<T>::mutate(|last| {
      *last = last.saturating_add(1);
      *last
    });

    // The first activation skips the activation cooldown.
    let mut keeper = Keeper {
      admin: admin.clone(),
      worker: worker.clone(),
      stake: initial_stake,
      is_active: false,
    };
    Self::activate_keeper(keeper_id, &mut keeper)?;
    Keepers::<T>::insert(keeper_id, keeper);
    WorkerKeeperIds::<T>::insert(&worker, keeper_id);

    Self::deposit_event(Event::KeeperRegistered {
      keeper_id,
      admin,
      worker,
      stake: initial_stake,
    });
    Ok(keeper_id)
  }

  pub(crate) fn activate_keeper(keeper_id: KeeperId, keeper: &mut KeeperOf<T>) -> DispatchResult {
    ActiveKeepers::<T>::try_mutate(|active| -> DispatchResult {
      if !active.contains(&keeper_id) {
        active
          .try_push(keeper_id)
          .map_err(|_| Error::<T>::TooManyActiveKeepers)?;
      }
      Ok(())
    })?;
    keeper.is_active = true;
    Ok(())
  }

  pub(crate) fn deactivate_keeper(keeper_id: KeeperId, keeper: &mut KeeperOf<T>) {
    ActiveKeepers::<T>::mutate(|active| {
      if let Some(position) = active.iter().position(|id| *id == keeper_id) {
        active.swap_remove(position);
      }
    });
    keeper.is_active = false;
  }

  pub(crate) fn do_set_worker_address(
    who: T::AccountId,
    keeper_id: KeeperId,
    worker: T::AccountId,
  ) -> DispatchResult {
    let mut keeper = Self::ensure_keeper_admin(&who, keeper_id)?;
    ensure!(
      !WorkerKeeperIds::<T>::contains_key(&worker),
      Error::<T>::WorkerAlreadyAssigned
    );

    let previous = core::mem::replace(&mut keeper.worker, worker.clone());
    WorkerKeeperIds::<T>::remove(&previous);
    WorkerKeeperIds::<T>::insert(&worker, keeper_id);
    Keepers::<T>::insert(keeper_id, keeper);

    Self::deposit_event(Event::WorkerAddressSet {
      keeper_id,
      previous,
      worker,
    });
    Ok(())
  }

  pub(crate) fn do_stake(
    who: T::AccountId,
    keeper_id: KeeperId,
    amount: Balance,
  ) -> DispatchResult {
    ensure!(amount > 0, Error::<T>::ZeroAmount);
    Keepers::<T>::try_mutate(keeper_id, |maybe_keeper| -> DispatchResult {
      let keeper = maybe_keeper.as_mut().ok_or(Error::<T>::KeeperNotFound)?;
      keeper.stake = keeper
        .stake
        .checked_add(amount)
        .filter(|stake| *stake <= MAX_STAKE)
        .ok_or(Error::<T>::StakeAmountOverflow)?;
      Ok(())
    })?;
    T::StakeCurrency::transfer(&who, &Self::account_id(), amount, Preservation::Preserve)?;

    Self::deposit_event(Event::Staked {
      keeper_id,
      staker: who,
      amount,
    });
    Ok(())
  }

  /// Slashed stake is burned down first; only the rest leaves live stake and enters the
  /// pending withdrawal, whose cooldown restarts.
  pub(crate) fn do_initiate_redeem(
    who: T::AccountId,
    keeper_id: KeeperId,
    amount: Balance,
  ) -> DispatchResult {
    let mut keeper = Self::ensure_keeper_admin(&who, keeper_id)?;
    ensure!(amount > 0, Error::<T>::ZeroAmount);
    ensure!(
      KeeperJobLocks::<T>::get(keeper_id) == 0,
      Error::<T>::KeeperIsAssignedToJobs
    );

    let slashed = SlashedStake::<T>::get(keeper_id);
    ensure!(
      amount <= keeper.stake.saturating_add(slashed),
      Error::<T>::AmountGtStake
    );

    let slashed_stake_decrement = amount.min(slashed);
    let stake_decrement = amount.saturating_sub(slashed_stake_decrement);

    SlashedStake::<T>::insert(keeper_id, slashed.saturating_sub(slashed_stake_decrement));
    keeper.stake = keeper.stake.saturating_sub(stake_decrement);
    Keepers::<T>::insert(keeper_id, keeper);

    let ends_at = Self::now().saturating_add(AgentParams::<T>::get().pending_withdrawal_timeout);
    PendingWithdrawals::<T>::mutate(keeper_id, |pending| {
      pending.amount = pending.amount.saturating_add(stake_decrement);
      pending.ends_at = ends_at;
    });

    Self::deposit_event(Event::RedeemInitiated {
      keeper_id,
      amount,
      stake_decrement,
      slashed_stake_decrement,
      ends_at,
    });
    Ok(())
  }

  pub(crate) fn do_finalize_redeem(
    who: T::AccountId,
    keeper_id: KeeperId,
    to: T::AccountId,
  ) -> DispatchResult {
    Self::ensure_keeper_admin(&who, keeper_id)?;
    let pending = PendingWithdrawals::<T>::get(keeper_id);
    ensure!(pending.amount > 0, Error::<T>::NoPendingWithdrawal);
    ensure!(
      Self::now() >= pending.ends_at,
      Error::<T>::WithdrawalTimeoutNotReached
    );

    PendingWithdrawals::<T>::remove(keeper_id);
    T::StakeCurrency::transfer(
      &Self::account_id(),
      &to,
      pending.amount,
      Preservation::Expendable,
    )?;

    Self::deposit_event(Event::RedeemFinalized {
      keeper_id,
      to,
      amount: pending.amount,
    });
    Ok(())
  }

  pub(crate) fn do_withdraw_compensation(
    who: T::AccountId,
    keeper_id: KeeperId,
    to: T::AccountId,
    amount: Balance,
  ) -> DispatchResult {
    let keeper = Keepers::<T>::get(keeper_id).ok_or(Error::<T>::KeeperNotFound)?;
    ensure!(
      keeper.admin == who || keeper.worker == who,
      Error::<T>::OnlyKeeperAdminOrWorker
    );
    ensure!(amount > 0, Error::<T>::ZeroAmount);

    Compensations::<T>::try_mutate(keeper_id, |available| -> DispatchResult {
      *available = available
        .checked_sub(amount)
        .ok_or(Error::<T>::WithdrawAmountExceedsCompensation)?;
      Ok(())
    })?;
    Self::pay_out(&to, amount)?;

    Self::deposit_event(Event::CompensationWithdrawn {
      keeper_id,
      to,
      amount,
    });
    Ok(())
  }

  pub(crate) fn do_disable_keeper(who: T::AccountId, keeper_id: KeeperId) -> DispatchResult {
    let mut keeper = Self::ensure_keeper_admin(&who, keeper_id)?;
    ensure!(keeper.is_active, Error::<T>::KeeperAlreadyInactive);
    ensure!(
      KeeperJobLocks::<T>::get(keeper_id) == 0,
      Error::<T>::KeeperIsAssignedToJobs
    );

    Self::deactivate_keeper(keeper_id, &mut keeper);
    Keepers::<T>::insert(keeper_id, keeper);
    Self::deposit_event(Event::KeeperDisabled { keeper_id });
    Ok(())
  }

  pub(crate) fn do_initiate_keeper_activation(
    who: T::AccountId,
    keeper_id: KeeperId,
  ) -> DispatchResult {
    let keeper = Self::ensure_keeper_admin(&who, keeper_id)?;
    ensure!(!keeper.is_active, Error::<T>::KeeperAlreadyActive);

    let can_be_finalized_at =
      Self::now().saturating_add(RdConfig::<T>::get().keeper_activation_timeout);
    KeeperActivationCanBeFinalizedAt::<T>::insert(keeper_id, can_be_finalized_at);

    Self::deposit_event(Event::KeeperActivationInitiated {
      keeper_id,
      can_be_finalized_at,
    });
    Ok(())
  }

  pub(crate) fn do_finalize_keeper_activation(
    who: T::AccountId,
    keeper_id: KeeperId,
  ) -> DispatchResult {
    let mut keeper = Self::ensure_keeper_admin(&who, keeper_id)?;
    ensure!(!keeper.is_active, Error::<T>::KeeperAlreadyActive);
    let finalizable_at = KeeperActivationCanBeFinalizedAt::<T>::get(keeper_id)
      .ok_or(Error::<T>::ActivationNotInitiated)?;
    ensure!(
      Self::now() >= finalizable_at,
      Error::<T>::TooEarlyForActivationFinalization
    );
    ensure!(
      keeper.stake >= AgentParams::<T>::get().min_keeper_stake,
      Error::<T>::InsufficientKeeperStake
    );

    KeeperActivationCanBeFinalizedAt::<T>::remove(keeper_id);
    Self::activate_keeper(keeper_id, &mut keeper)?;
    Keepers::<T>::insert(keeper_id, keeper);

    Self::deposit_event(Event::KeeperActivated { keeper_id });
    Ok(())
  }

  pub(crate) fn do_owner_slash(
    keeper_id: KeeperId,
    to: T::AccountId,
    current_amount: Balance,
    pending_amount: Balance,
  ) -> DispatchResult {
    let total = current_amount.saturating_add(pending_amount);
    ensure!(total > 0, Error::<T>::ZeroAmount);
    let mut keeper = Keepers::<T>::get(keeper_id).ok_or(Error::<T>::KeeperNotFound)?;
    keeper.stake = keeper
      .stake
      .checked_sub(current_amount)
      .ok_or(Error::<T>::SlashAmountGtStake)?;
    PendingWithdrawals::<T>::try_mutate(keeper_id, |pending| -> DispatchResult {
      pending.amount = pending
        .amount
        .checked_sub(pending_amount)
        .ok_or(Error::<T>::SlashAmountGtPending)?;
      Ok(())
    })?;
    Keepers::<T>::insert(keeper_id, keeper);
    SlashedStake::<T>::mutate(keeper_id, |slashed| *slashed = slashed.saturating_add(total));

    T::StakeCurrency::transfer(&Self::account_id(), &to, total, Preservation::Expendable)?;

    log::debug!(
      target: LOG_TARGET,
      "owner slashed keeper {keeper_id}: {current_amount} live, {pending_amount} pending"
    );
    Self::deposit_event(Event::OwnerSlashed {
      keeper_id,
      to,
      current_amount,
      pending_amount,
    });
    Ok(())
  }
}
