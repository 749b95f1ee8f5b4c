//! Credit ledger: job and owner credits, the deposit fee and native payouts.

use crate::*;
use frame::deps::frame_support::traits::{fungible::Mutate, tokens::Preservation};
use frame::deps::sp_runtime::PerThing;
use frame::prelude::*;
use keeper_primitives::MAX_CREDITS;

impl<T: Config> Pallet<T> {
  /// Pulls `amount` into the pallet account. Returns `(net, fee)`.
  pub(crate) fn take_deposit(
    from: &T::AccountId,
    amount: Balance,
  ) -> Result<(Balance, Balance), DispatchError> {
    ensure!(amount > 0, Error::<T>::ZeroAmount);
    T::Currency::transfer(from, &Self::account_id(), amount, Preservation::Preserve)?;
    let fee = AgentParams::<T>::get().deposit_fee().mul_floor(amount);
    FeeTotal::<T>::mutate(|total| *total = total.saturating_add(fee));
    Ok((amount.saturating_sub(fee), fee))
  }

  pub(crate) fn pay_out(to: &T::AccountId, amount: Balance) -> DispatchResult {
    if amount == 0 {
      return Ok(());
    }
    T::Currency::transfer(&Self::account_id(), to, amount, Preservation::Expendable)?;
    Ok(())
  }

  pub(crate) fn add_job_credits(job: &mut Job, amount: Balance) -> DispatchResult {
    job.credits = job
      .credits
      .checked_add(amount)
      .filter(|credits| *credits <= MAX_CREDITS)
      .ok_or(Error::<T>::CreditsDepositOverflow)?;
    Ok(())
  }

  /// Credits the job draws from: its own, or its owner's.
  pub(crate) fn available_credits(job: &Job, owner: &T::AccountId) -> Balance {
    if job.flags.uses_owner_credits() {
      JobOwnerCredits::<T>::get(owner)
    } else {
      job.credits
    }
  }

  pub fn job_credits_source_balance(job_key: &JobKey) -> Balance {
    match Self::job_of(job_key) {
      Some((job, details)) => Self::available_credits(&job, &details.owner),
      None => 0,
    }
  }

  pub(crate) fn do_deposit_job_credits(
    who: T::AccountId,
    job_key: JobKey,
    amount: Balance,
  ) -> DispatchResult {
    let mut job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    let (net, fee) = Self::take_deposit(&who, amount)?;
    Self::add_job_credits(&mut job, net)?;
    Jobs::<T>::insert(job_key, job);

    Self::deposit_event(Event::JobCreditsDeposited {
      job_key,
      depositor: who,
      amount: net,
      fee,
    });

    Self::assign_if_required(&job_key);
    Ok(())
  }

  pub(crate) fn do_withdraw_job_credits(
    who: T::AccountId,
    job_key: JobKey,
    to: T::AccountId,
    amount: CreditAmount,
  ) -> DispatchResult {
    Self::ensure_job_owner(&who, &job_key)?;
    let mut job = Jobs::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
    let amount = amount.resolve(job.credits);
    ensure!(amount > 0, Error::<T>::ZeroAmount);
    job.credits = job
      .credits
      .checked_sub(amount)
      .ok_or(Error::<T>::CreditsWithdrawalUnderflow)?;
    Jobs::<T>::insert(job_key, job);
    Self::pay_out(&to, amount)?;

    Self::deposit_event(Event::JobCreditsWithdrawn { job_key, to, amount });

    Self::release_if_required(&job_key);
    Ok(())
  }

  pub(crate) fn do_deposit_owner_credits(
    who: T::AccountId,
    owner: T::AccountId,
    amount: Balance,
  ) -> DispatchResult {
    let (net, fee) = Self::take_deposit(&who, amount)?;
    JobOwnerCredits::<T>::mutate(&owner, |credits| *credits = credits.saturating_add(net));
    Self::deposit_event(Event::OwnerCreditsDeposited {
      owner,
      depositor: who,
      amount: net,
      fee,
    });
    Ok(())
  }

  /// Jobs of the owner that run on owner credits are re-evaluated lazily, at their next
  /// execution or assignment.
  pub(crate) fn do_withdraw_owner_credits(
    who: T::AccountId,
    to: T::AccountId,
    amount: CreditAmount,
  ) -> DispatchResult {
    JobOwnerCredits::<T>::try_mutate(&who, |credits| -> DispatchResult {
      let amount = amount.resolve(*credits);
      ensure!(amount > 0, Error::<T>::ZeroAmount);
      *credits = credits
        .checked_sub(amount)
        .ok_or(Error::<T>::CreditsWithdrawalUnderflow)?;
      Self::pay_out(&to, amount)?;
      Self::deposit_event(Event::OwnerCreditsWithdrawn {
        owner: who.clone(),
        to: to.clone(),
        amount,
      });
      Ok(())
    })
  }
}
