//! Keeper Agent Pallet
//!
//! Keeper network job scheduler. Job owners register recurring or condition-triggered jobs
//! funded with prepaid credits; staked keepers are rotated across jobs by a stake-aware
//! pseudo-random draw, compensated per execution and slashed when they let an assignment lapse.
//!
//! The pallet is split by concern:
//! - `credits`: job and owner credit ledger, deposit fee
//! - `keepers`: keeper registry, stake, redeem and activation lifecycles
//! - `jobs`: job registry and ownership transfer
//! - `assignment`: keeper selection, release and rotation slasher
//! - `slashing`: slashing windows and stake transfer to the slasher
//! - `execution`: the `execute` hot path

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub mod strategy;
pub mod weights;

pub use adapters::{CallRequest, CallResponse, JobDispatcher, ResolverResponse};
pub use keeper_primitives::{
  AgentConfig, Assignment, Balance, CreditAmount, ExecuteConfig, Job, JobFlags, JobId, JobKey,
  KeeperId, PendingWithdrawal, RandaoConfig, Timestamp, TriggerKind,
};
pub use strategy::{AgentStrategy, CompensationInput, Flat, Randao, Vrf};
pub use weights::WeightInfo;

mod assignment;
mod credits;
mod execution;
mod jobs;
mod keepers;
mod slashing;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub const LOG_TARGET: &str = "runtime::keeper-agent";

#[frame::pallet]
pub mod pallet {
  use super::{AgentStrategy, JobDispatcher, WeightInfo};
  use frame::deps::{
    frame_support::{
      PalletId,
      traits::{
        UnixTime,
        fungible::{Inspect, Mutate},
      },
    },
    sp_runtime::{
      Permill, SaturatedConversion,
      traits::AccountIdConversion,
    },
  };
  use frame::prelude::*;
  use keeper_primitives::{
    AgentConfig, Assignment, Balance, CreditAmount, ExecuteConfig, Job, JobId, JobKey, KeeperId,
    PendingWithdrawal, RandaoConfig, Timestamp, TriggerKind,
  };

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Native currency: job credits, owner credits, fees and keeper compensation
    type Currency: Inspect<Self::AccountId, Balance = Balance>
      + Mutate<Self::AccountId, Balance = Balance>;

    /// Keeper collateral currency
    type StakeCurrency: Inspect<Self::AccountId, Balance = Balance>
      + Mutate<Self::AccountId, Balance = Balance>;

    /// Current base fee per gas unit, in base units
    type BaseFee: Get<Balance>;

    type UnixTime: UnixTime;

    /// Outgoing job and resolver calls
    type Dispatcher: JobDispatcher<Self::AccountId>;

    /// Compensation formula and pseudo-random source
    type Strategy: AgentStrategy<Self>;

    /// Origin for agent-wide parameters, owner slashing and fee withdrawal
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin allowed to submit executions; yields the worker account
    type ExecutorOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

    /// The pallet ID for the credit, stake and fee account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    #[pallet::constant]
    type MaxActiveKeepers: Get<u32>;

    #[pallet::constant]
    type MaxCalldataLen: Get<u32>;

    /// Failure payload kept in `ExecutionReverted`
    #[pallet::constant]
    type MaxReturnDataLen: Get<u32>;

    #[pallet::constant]
    type MaxJobKeysPerCall: Get<u32>;

    /// Gas available to one execution, settlement included
    #[pallet::constant]
    type MaxExecutionGas: Get<u64>;

    /// Gas withheld from the job call for post-dispatch bookkeeping
    #[pallet::constant]
    type SettlementGasReserve: Get<u64>;

    /// Gas added to the measured call when computing compensation
    #[pallet::constant]
    type JobGasOverhead: Get<u64>;

    /// Scalar turning a job's `max_base_fee` into base units
    #[pallet::constant]
    type BaseFeeUnit: Get<Balance>;

    /// Scalar turning a job's `fixed_reward` into base units
    #[pallet::constant]
    type FixedRewardUnit: Get<Balance>;

    #[pallet::constant]
    type MaxDepositFee: Get<Permill>;

    #[pallet::constant]
    type MaxPendingWithdrawalTimeout: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
  }

  pub type CalldataOf<T> = BoundedVec<u8, <T as Config>::MaxCalldataLen>;
  pub type ReturnDataOf<T> = BoundedVec<u8, <T as Config>::MaxReturnDataLen>;
  pub type KeeperOf<T> = Keeper<<T as frame_system::Config>::AccountId>;
  pub type JobDetailsOf<T> = JobDetails<<T as frame_system::Config>::AccountId>;
  pub type JobParamsOf<T> = JobParams<<T as frame_system::Config>::AccountId>;
  pub type ResolverOf<T> = Resolver<<T as frame_system::Config>::AccountId, CalldataOf<T>>;
  pub type SlashingProbeOf<T> = SlashingProbe<CalldataOf<T>>;

  #[derive(
    Clone,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct Keeper<AccountId> {
    pub admin: AccountId,
    pub worker: AccountId,
    pub stake: Balance,
    pub is_active: bool,
  }

  /// Ownership side of a job. Rarely touched by executions.
  #[derive(
    Clone,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct JobDetails<AccountId> {
    pub target: AccountId,
    pub job_id: JobId,
    pub owner: AccountId,
    pub pending_owner: Option<AccountId>,
    pub min_keeper_stake: Balance,
    pub created_at: Timestamp,
  }

  #[derive(
    Clone,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct Resolver<AccountId, Calldata> {
    pub target: AccountId,
    pub calldata: Calldata,
  }

  #[derive(
    Clone,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub struct JobParams<AccountId> {
    pub target: AccountId,
    pub selector: [u8; 4],
    pub trigger: TriggerKind,
    pub use_job_owner_credits: bool,
    pub assert_resolver_selector: bool,
    pub call_resolver_before_execute: bool,
    pub max_base_fee: u16,
    pub reward_pct: u16,
    pub fixed_reward: u32,
    pub min_keeper_stake: Balance,
    pub interval_seconds: u32,
  }

  /// Evidence a slasher offers that a condition-triggered job is executable.
  #[derive(
    Clone,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub enum SlashingProbe<Calldata> {
    UseResolver,
    Calldata(Calldata),
  }

  #[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Decode,
    DecodeWithMemTracking,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub enum LockState {
    #[default]
    Idle,
    Locked,
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::storage]
  pub type AgentParams<T> = StorageValue<_, AgentConfig, ValueQuery>;

  #[pallet::storage]
  pub type RdConfig<T> = StorageValue<_, RandaoConfig, ValueQuery>;

  /// Global reentrancy guard of `execute`.
  #[pallet::storage]
  pub type ExecutionLock<T> = StorageValue<_, LockState, ValueQuery>;

  /// Deposit fees collected and not yet withdrawn.
  #[pallet::storage]
  pub type FeeTotal<T> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::storage]
  pub type Jobs<T: Config> = StorageMap<_, Blake2_128Concat, JobKey, Job, OptionQuery>;

  #[pallet::storage]
  pub type JobMetadata<T: Config> =
    StorageMap<_, Blake2_128Concat, JobKey, JobDetailsOf<T>, OptionQuery>;

  /// Next job id per target.
  #[pallet::storage]
  pub type JobLastIds<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, JobId, ValueQuery>;

  #[pallet::storage]
  pub type PreDefinedCalldatas<T: Config> =
    StorageMap<_, Blake2_128Concat, JobKey, CalldataOf<T>, OptionQuery>;

  #[pallet::storage]
  pub type Resolvers<T: Config> =
    StorageMap<_, Blake2_128Concat, JobKey, ResolverOf<T>, OptionQuery>;

  #[pallet::storage]
  pub type JobOwnerCredits<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, Balance, ValueQuery>;

  #[pallet::storage]
  pub type JobAssignments<T: Config> =
    StorageMap<_, Blake2_128Concat, JobKey, Assignment, ValueQuery>;

  #[pallet::storage]
  pub type LastKeeperId<T> = StorageValue<_, KeeperId, ValueQuery>;

  #[pallet::storage]
  pub type Keepers<T: Config> = StorageMap<_, Blake2_128Concat, KeeperId, KeeperOf<T>, OptionQuery>;

  #[pallet::storage]
  pub type WorkerKeeperIds<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, KeeperId, OptionQuery>;

  /// Accrued, withdrawable compensation per keeper.
  #[pallet::storage]
  pub type Compensations<T: Config> =
    StorageMap<_, Blake2_128Concat, KeeperId, Balance, ValueQuery>;

  /// Stake taken by `owner_slash` that must be burned down before stake can be redeemed.
  #[pallet::storage]
  pub type SlashedStake<T: Config> = StorageMap<_, Blake2_128Concat, KeeperId, Balance, ValueQuery>;

  #[pallet::storage]
  pub type PendingWithdrawals<T: Config> =
    StorageMap<_, Blake2_128Concat, KeeperId, PendingWithdrawal, ValueQuery>;

  #[pallet::storage]
  pub type KeeperActivationCanBeFinalizedAt<T: Config> =
    StorageMap<_, Blake2_128Concat, KeeperId, Timestamp, OptionQuery>;

  /// Number of jobs currently assigned to a keeper.
  #[pallet::storage]
  pub type KeeperJobLocks<T: Config> = StorageMap<_, Blake2_128Concat, KeeperId, u32, ValueQuery>;

  /// Keepers taking part in the draw, in insertion order (removal swaps the last entry in).
  #[pallet::storage]
  pub type ActiveKeepers<T: Config> =
    StorageValue<_, BoundedVec<KeeperId, T::MaxActiveKeepers>, ValueQuery>;

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::MaxExecutionGas::get() > T::SettlementGasReserve::get(),
        "execution gas must leave room for the settlement reserve"
      );
      assert!(T::MaxActiveKeepers::get() > 0, "at least one keeper must be able to be active");
    }
  }

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    JobRegistered {
      job_key: JobKey,
      target: T::AccountId,
      job_id: JobId,
      owner: T::AccountId,
    },
    JobUpdated {
      job_key: JobKey,
      max_base_fee: u16,
      reward_pct: u16,
      fixed_reward: u32,
      min_keeper_stake: Balance,
      interval_seconds: u32,
    },
    JobConfigSet {
      job_key: JobKey,
      is_active: bool,
      use_job_owner_credits: bool,
      assert_resolver_selector: bool,
      call_resolver_before_execute: bool,
    },
    JobResolverSet {
      job_key: JobKey,
      resolver: T::AccountId,
    },
    JobPreDefinedCalldataSet {
      job_key: JobKey,
    },
    JobTransferInitiated {
      job_key: JobKey,
      from: T::AccountId,
      to: T::AccountId,
    },
    JobTransferAccepted {
      job_key: JobKey,
      to: T::AccountId,
    },
    JobCreditsDeposited {
      job_key: JobKey,
      depositor: T::AccountId,
      amount: Balance,
      fee: Balance,
    },
    JobCreditsWithdrawn {
      job_key: JobKey,
      to: T::AccountId,
      amount: Balance,
    },
    OwnerCreditsDeposited {
      owner: T::AccountId,
      depositor: T::AccountId,
      amount: Balance,
      fee: Balance,
    },
    OwnerCreditsWithdrawn {
      owner: T::AccountId,
      to: T::AccountId,
      amount: Balance,
    },
    KeeperRegistered {
      keeper_id: KeeperId,
      admin: T::AccountId,
      worker: T::AccountId,
      stake: Balance,
    },
    WorkerAddressSet {
      keeper_id: KeeperId,
      previous: T::AccountId,
      worker: T::AccountId,
    },
    Staked {
      keeper_id: KeeperId,
      staker: T::AccountId,
      amount: Balance,
    },
    RedeemInitiated {
      keeper_id: KeeperId,
      amount: Balance,
      stake_decrement: Balance,
      slashed_stake_decrement: Balance,
      ends_at: Timestamp,
    },
    RedeemFinalized {
      keeper_id: KeeperId,
      to: T::AccountId,
      amount: Balance,
    },
    CompensationWithdrawn {
      keeper_id: KeeperId,
      to: T::AccountId,
      amount: Balance,
    },
    KeeperDisabled {
      keeper_id: KeeperId,
    },
    KeeperActivationInitiated {
      keeper_id: KeeperId,
      can_be_finalized_at: Timestamp,
    },
    KeeperActivated {
      keeper_id: KeeperId,
    },
    /// Stake fell under the agent minimum after a slash.
    KeeperDeactivated {
      keeper_id: KeeperId,
    },
    /// `to == 0` means the job was released.
    JobKeeperChanged {
      job_key: JobKey,
      from: KeeperId,
      to: KeeperId,
    },
    /// The draw found no keeper for an active, funded job.
    NoEligibleKeeper {
      job_key: JobKey,
    },
    KeeperSlashingInitiated {
      job_key: JobKey,
      slasher_keeper_id: KeeperId,
      slashing_possible_after: Timestamp,
    },
    KeeperSlashed {
      job_key: JobKey,
      keeper_id: KeeperId,
      slasher_keeper_id: KeeperId,
      fixed: Balance,
      dynamic: Balance,
      slashed: Balance,
      shortfall: Balance,
    },
    Executed {
      job_key: JobKey,
      keeper_id: KeeperId,
      success: bool,
      gas_used: u64,
      base_fee: Balance,
      compensation: Balance,
      accrued: bool,
    },
    ExecutionReverted {
      job_key: JobKey,
      keeper_id: KeeperId,
      return_data: ReturnDataOf<T>,
    },
    AgentParamsSet {
      config: AgentConfig,
    },
    RandaoConfigSet {
      config: RandaoConfig,
    },
    OwnerSlashed {
      keeper_id: KeeperId,
      to: T::AccountId,
      current_amount: Balance,
      pending_amount: Balance,
    },
    FeesWithdrawn {
      to: T::AccountId,
      amount: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    JobNotFound,
    KeeperNotFound,
    OnlyJobOwner,
    OnlyPendingJobOwner,
    OnlyKeeperAdmin,
    OnlyKeeperAdminOrWorker,
    /// Caller is neither the job owner nor the assigned keeper
    NotAuthorizedToRelease,
    ZeroAmount,
    /// Target is the pallet account or the zero account
    InvalidJobTarget,
    /// Both reward components are zero
    MissingJobRewards,
    MissingMaxBaseFee,
    JobShouldHaveInterval,
    ResolverJobCantHaveInterval,
    IntervalOutOfRange,
    MissingResolver,
    MissingPreDefinedCalldata,
    NotSupportedByJobCalldataSource,
    JobIdOverflow,
    /// Credits would exceed their 88-bit width
    CreditsDepositOverflow,
    CreditsWithdrawalUnderflow,
    InsufficientJobCredits,
    InsufficientJobOwnerCredits,
    WorkerAlreadyAssigned,
    InsufficientKeeperStake,
    /// Stake would exceed its 88-bit width
    StakeAmountOverflow,
    AmountGtStake,
    KeeperIsAssignedToJobs,
    NoPendingWithdrawal,
    WithdrawalTimeoutNotReached,
    WithdrawAmountExceedsCompensation,
    KeeperAlreadyActive,
    KeeperAlreadyInactive,
    ActivationNotInitiated,
    TooEarlyForActivationFinalization,
    TooManyActiveKeepers,
    InactiveKeeper,
    ExecutionReentrancyLocked,
    KeeperWorkerNotAuthorized,
    InsufficientJobScopedKeeperStake,
    NonTopLevelCaller,
    InactiveJob,
    IntervalNotReached,
    /// Someone else holds the assignment and no takeover is allowed yet
    OnlyNextKeeper,
    OnlyCurrentSlasher,
    SlashingNotInitiated,
    OnlyReservedSlasher,
    TooEarlyForSlashing,
    SlashingWindowExpired,
    BaseFeeGtGasPrice,
    MissingInputCalldata,
    SelectorCheckFailed,
    /// Keeper-supplied calldata differs from the resolver output
    CalldataHashMismatch,
    SlashingOnlyForResolverJobs,
    KeeperCantSlash,
    SlashingEpochAlreadyInitiated,
    ResolverCallFailed,
    JobCheckResolverReturnedFalse,
    JobCheckCanNotBeExecuted,
    TooEarlyToRelease,
    InvalidMinKeeperStake,
    TimeoutTooLong,
    FeeTooHigh,
    InvalidSlashingEpochBlocks,
    InvalidSlashingPeriod,
    InvalidSlashingFeeBps,
    InvalidStakeDivisor,
    SlashAmountGtStake,
    SlashAmountGtPending,
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub agent_config: AgentConfig,
    pub randao_config: RandaoConfig,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      AgentParams::<T>::put(self.agent_config);
      RdConfig::<T>::put(self.randao_config);
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Register a job for `params.target`. An optional deposit funds the job (or the owner,
    /// when the job uses owner credits).
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::register_job())]
    pub fn register_job(
      origin: OriginFor<T>,
      params: JobParamsOf<T>,
      resolver: Option<ResolverOf<T>>,
      pre_defined_calldata: CalldataOf<T>,
      deposit: Balance,
    ) -> DispatchResult {
      let owner = ensure_signed(origin)?;
      Self::do_register_job(owner, params, resolver, pre_defined_calldata, deposit)?;
      Ok(())
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::update_job())]
    pub fn update_job(
      origin: OriginFor<T>,
      job_key: JobKey,
      max_base_fee: u16,
      reward_pct: u16,
      fixed_reward: u32,
      min_keeper_stake: Balance,
      interval_seconds: u32,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_update_job(
        who,
        job_key,
        max_base_fee,
        reward_pct,
        fixed_reward,
        min_keeper_stake,
        interval_seconds,
      )
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_job_config())]
    pub fn set_job_config(
      origin: OriginFor<T>,
      job_key: JobKey,
      is_active: bool,
      use_job_owner_credits: bool,
      assert_resolver_selector: bool,
      call_resolver_before_execute: bool,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_job_config(
        who,
        job_key,
        is_active,
        use_job_owner_credits,
        assert_resolver_selector,
        call_resolver_before_execute,
      )
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_job_resolver())]
    pub fn set_job_resolver(
      origin: OriginFor<T>,
      job_key: JobKey,
      resolver: ResolverOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_job_resolver(who, job_key, resolver)
    }

    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_job_pre_defined_calldata())]
    pub fn set_job_pre_defined_calldata(
      origin: OriginFor<T>,
      job_key: JobKey,
      calldata: CalldataOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_job_pre_defined_calldata(who, job_key, calldata)
    }

    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::initiate_job_transfer())]
    pub fn initiate_job_transfer(
      origin: OriginFor<T>,
      job_key: JobKey,
      to: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_initiate_job_transfer(who, job_key, to)
    }

    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::accept_job_transfer())]
    pub fn accept_job_transfer(origin: OriginFor<T>, job_key: JobKey) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_accept_job_transfer(who, job_key)
    }

    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::deposit_job_credits())]
    pub fn deposit_job_credits(
      origin: OriginFor<T>,
      job_key: JobKey,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_deposit_job_credits(who, job_key, amount)
    }

    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::withdraw_job_credits())]
    pub fn withdraw_job_credits(
      origin: OriginFor<T>,
      job_key: JobKey,
      to: T::AccountId,
      amount: CreditAmount,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw_job_credits(who, job_key, to, amount)
    }

    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::deposit_job_owner_credits())]
    pub fn deposit_job_owner_credits(
      origin: OriginFor<T>,
      owner: T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_deposit_owner_credits(who, owner, amount)
    }

    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::withdraw_job_owner_credits())]
    pub fn withdraw_job_owner_credits(
      origin: OriginFor<T>,
      to: T::AccountId,
      amount: CreditAmount,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw_owner_credits(who, to, amount)
    }

    /// The caller becomes the keeper admin; `worker` submits executions.
    #[pallet::call_index(11)]
    #[pallet::weight(T::WeightInfo::register_as_keeper())]
    pub fn register_as_keeper(
      origin: OriginFor<T>,
      worker: T::AccountId,
      initial_stake: Balance,
    ) -> DispatchResult {
      let admin = ensure_signed(origin)?;
      Self::do_register_as_keeper(admin, worker, initial_stake)?;
      Ok(())
    }

    #[pallet::call_index(12)]
    #[pallet::weight(T::WeightInfo::set_worker_address())]
    pub fn set_worker_address(
      origin: OriginFor<T>,
      keeper_id: KeeperId,
      worker: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_worker_address(who, keeper_id, worker)
    }

    #[pallet::call_index(13)]
    #[pallet::weight(T::WeightInfo::stake())]
    pub fn stake(origin: OriginFor<T>, keeper_id: KeeperId, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_stake(who, keeper_id, amount)
    }

    #[pallet::call_index(14)]
    #[pallet::weight(T::WeightInfo::initiate_redeem())]
    pub fn initiate_redeem(
      origin: OriginFor<T>,
      keeper_id: KeeperId,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_initiate_redeem(who, keeper_id, amount)
    }

    #[pallet::call_index(15)]
    #[pallet::weight(T::WeightInfo::finalize_redeem())]
    pub fn finalize_redeem(
      origin: OriginFor<T>,
      keeper_id: KeeperId,
      to: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_finalize_redeem(who, keeper_id, to)
    }

    #[pallet::call_index(16)]
    #[pallet::weight(T::WeightInfo::withdraw_compensation())]
    pub fn withdraw_compensation(
      origin: OriginFor<T>,
      keeper_id: KeeperId,
      to: T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw_compensation(who, keeper_id, to, amount)
    }

    /// Assign keepers to unassigned jobs. Open to `AdminOrigin` or to the owner of every
    /// listed job.
    #[pallet::call_index(17)]
    #[pallet::weight(T::WeightInfo::assign_keeper(job_keys.len() as u32))]
    pub fn assign_keeper(
      origin: OriginFor<T>,
      job_keys: BoundedVec<JobKey, T::MaxJobKeysPerCall>,
    ) -> DispatchResult {
      let caller = match T::AdminOrigin::try_origin(origin) {
        Ok(_) => None,
        Err(origin) => Some(ensure_signed(origin)?),
      };
      Self::do_assign_keeper(caller, job_keys.into_inner())
    }

    #[pallet::call_index(18)]
    #[pallet::weight(T::WeightInfo::release_job())]
    pub fn release_job(origin: OriginFor<T>, job_key: JobKey) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_release_job(who, job_key)
    }

    #[pallet::call_index(19)]
    #[pallet::weight(T::WeightInfo::disable_keeper())]
    pub fn disable_keeper(origin: OriginFor<T>, keeper_id: KeeperId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_disable_keeper(who, keeper_id)
    }

    #[pallet::call_index(20)]
    #[pallet::weight(T::WeightInfo::initiate_keeper_activation())]
    pub fn initiate_keeper_activation(origin: OriginFor<T>, keeper_id: KeeperId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_initiate_keeper_activation(who, keeper_id)
    }

    #[pallet::call_index(21)]
    #[pallet::weight(T::WeightInfo::finalize_keeper_activation())]
    pub fn finalize_keeper_activation(origin: OriginFor<T>, keeper_id: KeeperId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_finalize_keeper_activation(who, keeper_id)
    }

    /// Reserve the right to execute, and slash, an overdue condition-triggered job.
    #[pallet::call_index(22)]
    #[pallet::weight(T::WeightInfo::initiate_keeper_slashing())]
    pub fn initiate_keeper_slashing(
      origin: OriginFor<T>,
      target: T::AccountId,
      job_id: JobId,
      slasher_keeper_id: KeeperId,
      probe: SlashingProbeOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_initiate_keeper_slashing(who, target, job_id, slasher_keeper_id, probe)
    }

    /// Execute a job as `keeper_id`. Returns the consumed weight, job gas included.
    #[pallet::call_index(23)]
    #[pallet::weight(
      T::WeightInfo::execute().saturating_add(Weight::from_parts(T::MaxExecutionGas::get(), 0))
    )]
    pub fn execute(
      origin: OriginFor<T>,
      job_key: JobKey,
      keeper_id: KeeperId,
      config: ExecuteConfig,
      calldata: Option<CalldataOf<T>>,
    ) -> DispatchResultWithPostInfo {
      let worker =
        T::ExecutorOrigin::ensure_origin(origin).map_err(|_| Error::<T>::NonTopLevelCaller)?;
      let actual = Self::do_execute(worker, job_key, keeper_id, config, calldata)?;
      Ok(Some(actual).into())
    }

    #[pallet::call_index(24)]
    #[pallet::weight(T::WeightInfo::set_agent_params())]
    pub fn set_agent_params(
      origin: OriginFor<T>,
      min_keeper_stake: Balance,
      pending_withdrawal_timeout: u32,
      fee_ppm: u32,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(min_keeper_stake > 0, Error::<T>::InvalidMinKeeperStake);
      ensure!(
        pending_withdrawal_timeout <= T::MaxPendingWithdrawalTimeout::get(),
        Error::<T>::TimeoutTooLong
      );
      ensure!(fee_ppm <= T::MaxDepositFee::get().deconstruct(), Error::<T>::FeeTooHigh);

      let config = AgentConfig {
        min_keeper_stake,
        pending_withdrawal_timeout,
        fee_ppm,
      };
      AgentParams::<T>::put(config);
      Self::deposit_event(Event::AgentParamsSet { config });
      Ok(())
    }

    #[pallet::call_index(25)]
    #[pallet::weight(T::WeightInfo::set_randao_config())]
    pub fn set_randao_config(origin: OriginFor<T>, config: RandaoConfig) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(config.slashing_epoch_blocks > 0, Error::<T>::InvalidSlashingEpochBlocks);
      ensure!(config.period1 > 0 && config.period2 > 0, Error::<T>::InvalidSlashingPeriod);
      ensure!(
        config.slashing_fee_bps as u32 <= keeper_primitives::params::BPS_DENOMINATOR,
        Error::<T>::InvalidSlashingFeeBps
      );
      ensure!(config.stake_divisor > 0, Error::<T>::InvalidStakeDivisor);

      RdConfig::<T>::put(config);
      Self::deposit_event(Event::RandaoConfigSet { config });
      Ok(())
    }

    /// Take live and pending stake from a keeper. The total is recorded as slashed stake.
    #[pallet::call_index(26)]
    #[pallet::weight(T::WeightInfo::owner_slash())]
    pub fn owner_slash(
      origin: OriginFor<T>,
      keeper_id: KeeperId,
      to: T::AccountId,
      current_amount: Balance,
      pending_amount: Balance,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_owner_slash(keeper_id, to, current_amount, pending_amount)
    }

    #[pallet::call_index(27)]
    #[pallet::weight(T::WeightInfo::withdraw_fees())]
    pub fn withdraw_fees(origin: OriginFor<T>, to: T::AccountId) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let amount = FeeTotal::<T>::take();
      ensure!(amount > 0, Error::<T>::ZeroAmount);
      Self::pay_out(&to, amount)?;
      Self::deposit_event(Event::FeesWithdrawn { to, amount });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn now() -> Timestamp {
      T::UnixTime::now().as_secs().saturated_into()
    }

    pub fn job_key(target: &T::AccountId, job_id: JobId) -> JobKey {
      frame::hashing::blake2_256(&(target, job_id).encode())
    }

    pub(crate) fn ensure_job_owner(
      who: &T::AccountId,
      job_key: &JobKey,
    ) -> Result<JobDetailsOf<T>, DispatchError> {
      let details = JobMetadata::<T>::get(job_key).ok_or(Error::<T>::JobNotFound)?;
      ensure!(details.owner == *who, Error::<T>::OnlyJobOwner);
      Ok(details)
    }

    pub(crate) fn ensure_keeper_admin(
      who: &T::AccountId,
      keeper_id: KeeperId,
    ) -> Result<KeeperOf<T>, DispatchError> {
      let keeper = Keepers::<T>::get(keeper_id).ok_or(Error::<T>::KeeperNotFound)?;
      ensure!(keeper.admin == *who, Error::<T>::OnlyKeeperAdmin);
      Ok(keeper)
    }

    pub fn job_of(job_key: &JobKey) -> Option<(Job, JobDetailsOf<T>)> {
      Some((Jobs::<T>::get(job_key)?, JobMetadata::<T>::get(job_key)?))
    }

    /// The job record in its 256-bit word form.
    pub fn packed_job(job_key: &JobKey) -> Option<[u8; 32]> {
      Jobs::<T>::get(job_key).and_then(|job| job.pack().ok())
    }

    pub fn keeper_of(keeper_id: KeeperId) -> Option<KeeperOf<T>> {
      Keepers::<T>::get(keeper_id)
    }

    pub fn assignment_of(job_key: &JobKey) -> Assignment {
      JobAssignments::<T>::get(job_key)
    }

    pub fn active_keeper_ids() -> alloc::vec::Vec<KeeperId> {
      ActiveKeepers::<T>::get().into_inner()
    }

    pub fn pending_withdrawal_of(keeper_id: KeeperId) -> PendingWithdrawal {
      PendingWithdrawals::<T>::get(keeper_id)
    }
  }
}
