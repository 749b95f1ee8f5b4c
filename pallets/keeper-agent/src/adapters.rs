//! Adapters for the external-call collaborator.
//!
//! The pallet never decodes call frames itself: a job call is a typed request (target, payload,
//! gas budget) and the runtime decides how to deliver it (EVM, contracts, XCM, ...).

use alloc::vec::Vec;
use codec::{Decode, Encode};
use frame::deps::sp_runtime::DispatchError;
use scale_info::TypeInfo;

#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct CallRequest<AccountId> {
  pub target: AccountId,
  pub payload: Vec<u8>,
  pub gas_limit: u64,
}

#[derive(Clone, Debug, Default, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct CallResponse {
  pub success: bool,
  /// Raw return data; the failure payload when `success` is false.
  pub return_data: Vec<u8>,
  pub gas_used: u64,
}

#[derive(Clone, Debug, Default, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct ResolverResponse {
  pub can_execute: bool,
  pub calldata: Vec<u8>,
}

/// Delivery of job and resolver calls.
///
/// `dispatch` must not panic on a misbehaving target; it reports failure through
/// `CallResponse::success`. The pallet wraps both calls in storage layers: a failed job call
/// and every resolver call are rolled back.
pub trait JobDispatcher<AccountId> {
  fn dispatch(request: CallRequest<AccountId>) -> CallResponse;

  fn resolve(request: CallRequest<AccountId>) -> Result<ResolverResponse, DispatchError>;
}

impl<AccountId> JobDispatcher<AccountId> for () {
  fn dispatch(_request: CallRequest<AccountId>) -> CallResponse {
    CallResponse::default()
  }

  fn resolve(_request: CallRequest<AccountId>) -> Result<ResolverResponse, DispatchError> {
    Err(DispatchError::Other("no resolver backend"))
  }
}
