use crate as pallet_keeper_agent;
use crate::{
  AgentConfig, AgentStrategy, CallRequest, CallResponse, CompensationInput, ExecuteConfig, Flat,
  JobDispatcher, JobKey, KeeperId, Randao, RandaoConfig, ResolverResponse, strategy::block_seed,
};
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::{
    PalletId, construct_runtime,
    traits::{ConstU32, ConstU64, ConstU128, Get, StorageMapShim, UnixTime},
  },
  frame_system::{EnsureRoot, EnsureSigned},
  pallet_balances::{AccountData, Instance2},
  sp_core::U256,
  sp_runtime::{
    BuildStorage,
    traits::{BlakeTwo256, IdentityLookup},
  },
};

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

type Block = polkadot_sdk::frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;
pub type Balance = u128;

/// Job owner.
pub const ALICE: AccountId = 1;
/// Keeper admins.
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
pub const DAVE: AccountId = 4;
pub const EVE: AccountId = 5;
/// Keeper workers.
pub const BOB_WORKER: AccountId = 12;
pub const CHARLIE_WORKER: AccountId = 13;
pub const DAVE_WORKER: AccountId = 14;
/// Job targets and resolvers.
pub const TARGET: AccountId = 100;
pub const RESOLVER: AccountId = 101;
pub const OTHER_TARGET: AccountId = 102;

pub const TEST_INITIAL_BALANCE: Balance = 1_000_000_000;
pub const GENESIS_NOW: u64 = 1_000_000;
pub const DEFAULT_JOB_GAS: u64 = 9_000;

construct_runtime!(
  pub enum Test {
    System: polkadot_sdk::frame_system,
    Balances: polkadot_sdk::pallet_balances,
    StakeBalances: polkadot_sdk::pallet_balances::<Instance2>,
    KeeperAgent: pallet_keeper_agent,
  }
);

impl polkadot_sdk::frame_system::Config for Test {
  type BaseCallFilter = polkadot_sdk::frame_support::traits::Everything;
  type BlockWeights = ();
  type BlockLength = ();
  type DbWeight = ();
  type RuntimeOrigin = RuntimeOrigin;
  type RuntimeCall = RuntimeCall;
  type Nonce = u64;
  type Hash = polkadot_sdk::sp_core::H256;
  type Hashing = BlakeTwo256;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Block = Block;
  type RuntimeEvent = RuntimeEvent;
  type BlockHashCount = ConstU64<250>;
  type Version = ();
  type PalletInfo = PalletInfo;
  type AccountData = AccountData<Balance>;
  type OnNewAccount = ();
  type OnKilledAccount = ();
  type SystemWeightInfo = ();
  type SS58Prefix = ();
  type OnSetCode = ();
  type MaxConsumers = ConstU32<16>;
  type RuntimeTask = ();
  type ExtensionsWeightInfo = ();
  type SingleBlockMigrations = ();
  type MultiBlockMigrator = ();
  type PreInherents = ();
  type PostInherents = ();
  type PostTransactions = ();
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ConstU32<50>;
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type RuntimeEvent = RuntimeEvent;
  type DustRemoval = ();
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = RuntimeHoldReason;
  type RuntimeFreezeReason = RuntimeFreezeReason;
  type DoneSlashHandler = ();
}

/// Keeper collateral, kept apart from the native balances.
impl polkadot_sdk::pallet_balances::Config<Instance2> for Test {
  type MaxLocks = ConstU32<50>;
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type RuntimeEvent = RuntimeEvent;
  type DustRemoval = ();
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = StorageMapShim<
    polkadot_sdk::pallet_balances::Account<Test, Instance2>,
    AccountId,
    AccountData<Balance>,
  >;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = RuntimeHoldReason;
  type RuntimeFreezeReason = RuntimeFreezeReason;
  type DoneSlashHandler = ();
}

pub struct KeeperAgentPalletId;
impl Get<PalletId> for KeeperAgentPalletId {
  fn get() -> PalletId {
    PalletId(*keeper_primitives::pallet_ids::KEEPER_AGENT_PALLET_ID)
  }
}

pub struct MaxDepositFee;
impl Get<frame::prelude::Permill> for MaxDepositFee {
  fn get() -> frame::prelude::Permill {
    keeper_primitives::params::MAX_DEPOSIT_FEE
  }
}

/// What a mocked job target does when called.
#[derive(Clone, Debug)]
pub enum TargetBehavior {
  Succeed { gas: u64 },
  Revert { gas: u64, data: Vec<u8> },
  /// Writes a marker into storage, then reports `success`.
  Touch { gas: u64, success: bool },
  /// Calls back into `execute` and records the outcome.
  Reenter {
    worker: AccountId,
    keeper_id: KeeperId,
    job_key: JobKey,
  },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StrategyVariant {
  #[default]
  Flat,
  Randao,
}

pub const TOUCHED_KEY: &[u8] = b":mock:touched";

thread_local! {
  static NOW: Cell<u64> = const { Cell::new(GENESIS_NOW) };
  static BASE_FEE: Cell<Balance> = const { Cell::new(1) };
  static RANDOM: Cell<Option<U256>> = const { Cell::new(None) };
  static VARIANT: Cell<StrategyVariant> = const { Cell::new(StrategyVariant::Flat) };

  static TARGETS: RefCell<BTreeMap<AccountId, TargetBehavior>> = RefCell::new(BTreeMap::new());
  static RESOLVERS: RefCell<BTreeMap<AccountId, ResolverResponse>> = RefCell::new(BTreeMap::new());
  static DISPATCHED: RefCell<Vec<(AccountId, Vec<u8>)>> = RefCell::new(Vec::new());
  static REENTRY: RefCell<Option<DispatchResultWithPostInfo>> = RefCell::new(None);
}

pub fn reset_mock_adapters() {
  NOW.with(|n| n.set(GENESIS_NOW));
  BASE_FEE.with(|f| f.set(1));
  RANDOM.with(|r| r.set(None));
  VARIANT.with(|v| v.set(StrategyVariant::Flat));
  TARGETS.with(|t| t.borrow_mut().clear());
  RESOLVERS.with(|r| r.borrow_mut().clear());
  DISPATCHED.with(|d| d.borrow_mut().clear());
  REENTRY.with(|r| *r.borrow_mut() = None);
}

pub fn now() -> u64 {
  NOW.with(|n| n.get())
}

pub fn set_now(secs: u64) {
  NOW.with(|n| n.set(secs));
}

pub fn advance_time(secs: u64) {
  NOW.with(|n| n.set(n.get() + secs));
}

pub fn set_base_fee(fee: Balance) {
  BASE_FEE.with(|f| f.set(fee));
}

pub fn set_random(value: U256) {
  RANDOM.with(|r| r.set(Some(value)));
}

pub fn set_strategy(variant: StrategyVariant) {
  VARIANT.with(|v| v.set(variant));
}

pub fn set_target(target: AccountId, behavior: TargetBehavior) {
  TARGETS.with(|t| {
    t.borrow_mut().insert(target, behavior);
  });
}

pub fn set_resolver_output(resolver: AccountId, can_execute: bool, calldata: Vec<u8>) {
  RESOLVERS.with(|r| {
    r.borrow_mut().insert(
      resolver,
      ResolverResponse {
        can_execute,
        calldata,
      },
    );
  });
}

pub fn dispatched() -> Vec<(AccountId, Vec<u8>)> {
  DISPATCHED.with(|d| d.borrow().clone())
}

pub fn reentry_result() -> Option<DispatchResultWithPostInfo> {
  REENTRY.with(|r| r.borrow().clone())
}

pub fn touched() -> bool {
  polkadot_sdk::sp_io::storage::get(TOUCHED_KEY).is_some()
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(now())
  }
}

pub struct MockBaseFee;
impl Get<Balance> for MockBaseFee {
  fn get() -> Balance {
    BASE_FEE.with(|f| f.get())
  }
}

pub struct MockDispatcher;

impl JobDispatcher<AccountId> for MockDispatcher {
  fn dispatch(request: CallRequest<AccountId>) -> CallResponse {
    DISPATCHED.with(|d| d.borrow_mut().push((request.target, request.payload.clone())));
    let behavior = TARGETS
      .with(|t| t.borrow().get(&request.target).cloned())
      .unwrap_or(TargetBehavior::Succeed {
        gas: DEFAULT_JOB_GAS,
      });
    match behavior {
      TargetBehavior::Succeed { gas } => CallResponse {
        success: true,
        return_data: Vec::new(),
        gas_used: gas,
      },
      TargetBehavior::Revert { gas, data } => CallResponse {
        success: false,
        return_data: data,
        gas_used: gas,
      },
      TargetBehavior::Touch { gas, success } => {
        polkadot_sdk::sp_io::storage::set(TOUCHED_KEY, b"1");
        CallResponse {
          success,
          return_data: Vec::new(),
          gas_used: gas,
        }
      }
      TargetBehavior::Reenter {
        worker,
        keeper_id,
        job_key,
      } => {
        let result = KeeperAgent::execute(
          RuntimeOrigin::signed(worker),
          job_key,
          keeper_id,
          ExecuteConfig::default(),
          None,
        );
        REENTRY.with(|r| *r.borrow_mut() = Some(result));
        CallResponse {
          success: true,
          return_data: Vec::new(),
          gas_used: DEFAULT_JOB_GAS,
        }
      }
    }
  }

  fn resolve(request: CallRequest<AccountId>) -> Result<ResolverResponse, DispatchError> {
    RESOLVERS
      .with(|r| r.borrow().get(&request.target).cloned())
      .ok_or(DispatchError::Other("resolver reverted"))
  }
}

/// Flat or Randao compensation, switchable per test, with an overridable draw seed.
pub struct TestStrategy;

impl AgentStrategy<Test> for TestStrategy {
  fn pseudo_random() -> U256 {
    RANDOM
      .with(|r| r.get())
      .unwrap_or_else(block_seed::<Test>)
  }

  fn success_compensation(input: &CompensationInput) -> Balance {
    match VARIANT.with(|v| v.get()) {
      StrategyVariant::Flat => <Flat as AgentStrategy<Test>>::success_compensation(input),
      StrategyVariant::Randao => Randao::stake_proportional(input),
    }
  }
}

impl pallet_keeper_agent::Config for Test {
  type Currency = Balances;
  type StakeCurrency = StakeBalances;
  type BaseFee = MockBaseFee;
  type UnixTime = MockTime;
  type Dispatcher = MockDispatcher;
  type Strategy = TestStrategy;
  type AdminOrigin = EnsureRoot<AccountId>;
  type ExecutorOrigin = EnsureSigned<AccountId>;
  type PalletId = KeeperAgentPalletId;
  type MaxActiveKeepers = ConstU32<8>;
  type MaxCalldataLen = ConstU32<256>;
  type MaxReturnDataLen = ConstU32<16>;
  type MaxJobKeysPerCall = ConstU32<16>;
  type MaxExecutionGas = ConstU64<1_000_000>;
  type SettlementGasReserve = ConstU64<50_000>;
  type JobGasOverhead = ConstU64<1_000>;
  type BaseFeeUnit = ConstU128<1>;
  type FixedRewardUnit = ConstU128<1>;
  type MaxDepositFee = MaxDepositFee;
  type MaxPendingWithdrawalTimeout =
    ConstU32<{ keeper_primitives::params::MAX_PENDING_WITHDRAWAL_TIMEOUT }>;
  type WeightInfo = ();
}

pub fn test_agent_config() -> AgentConfig {
  AgentConfig {
    min_keeper_stake: 500,
    pending_withdrawal_timeout: 3_600,
    fee_ppm: 0,
  }
}

pub fn test_randao_config() -> RandaoConfig {
  RandaoConfig {
    slashing_epoch_blocks: 10,
    period1: 600,
    period2: 1_200,
    slashing_fee_fixed: 50,
    slashing_fee_bps: 500,
    job_min_credits: 10,
    agent_max_stake: 0,
    job_max_stake: 0,
    keeper_activation_timeout: 3_600,
    job_compensation_multiplier_bps: 10_000,
    job_fixed_reward: 0,
    stake_divisor: 100,
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = polkadot_sdk::frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  let funded: Vec<(AccountId, Balance)> = [
    ALICE,
    BOB,
    CHARLIE,
    DAVE,
    EVE,
    BOB_WORKER,
    CHARLIE_WORKER,
    DAVE_WORKER,
  ]
  .into_iter()
  .map(|who| (who, TEST_INITIAL_BALANCE))
  .collect();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: funded.clone(),
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test, Instance2> {
    balances: funded,
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_keeper_agent::GenesisConfig::<Test> {
    agent_config: test_agent_config(),
    randao_config: test_randao_config(),
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    reset_mock_adapters();
    System::set_block_number(1);
  });
  ext
}
