extern crate alloc;

use crate as pallet_mining_controller;
use crate::types::MiningConfig;
use polkadot_sdk::frame_support::traits::fungible::Mutate as NativeMutate;
use polkadot_sdk::frame_support::traits::fungibles::Mutate;
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get, UnixTime},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetKind, Balance, EpochId};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const OWNER: u64 = 1;
pub const MANAGER: u64 = 2;
pub const STRANGER: u64 = 3;
pub const RIG: u64 = 100;
pub const RIG_B: u64 = 101;
pub const PAYMENT_ASSET: u32 = 1;

/// Baseline wall-clock for tests, seconds
pub const START_TIME: u64 = 1_700_000_000;
/// Rig price at genesis, below the default ceiling
pub const DEFAULT_PRICE: Balance = 500;

#[derive(Clone, Copy)]
pub struct RigState {
  pub price: Balance,
  pub epoch: EpochId,
  pub payment_asset: AssetKind,
}

/// One observed purchase, recorded for assertions
#[derive(Clone, Copy)]
pub struct PurchaseRecord {
  pub rig: u64,
  pub payer: u64,
  pub recipient: u64,
  pub expected_epoch: EpochId,
  pub deadline: u64,
  pub max_price: Balance,
  pub price_paid: Balance,
}

// State containers for stateful mocks
thread_local! {
    pub static RIGS: RefCell<BTreeMap<u64, RigState>> = const { RefCell::new(BTreeMap::new()) };

    static NOW: RefCell<u64> = const { RefCell::new(START_TIME) };

    static FEE_PRICE: RefCell<Balance> = const { RefCell::new(10) };

    static PURCHASES: RefCell<Vec<PurchaseRecord>> = const { RefCell::new(Vec::new()) };

    // Fault injection for the mock rig
    static REENTER_ON_PURCHASE: RefCell<bool> = const { RefCell::new(false) };
    static ADVANCE_EPOCH_BEFORE_PURCHASE: RefCell<bool> = const { RefCell::new(false) };
    static SETTLEMENT_DELAY: RefCell<u64> = const { RefCell::new(0) };
}

// Helper methods to setup state
pub fn register_rig(rig: u64, price: Balance, epoch: EpochId, payment_asset: AssetKind) {
  RIGS.with(|r| {
    r.borrow_mut().insert(
      rig,
      RigState {
        price,
        epoch,
        payment_asset,
      },
    )
  });
}

pub fn set_rig_price(rig: u64, price: Balance) {
  RIGS.with(|r| {
    if let Some(state) = r.borrow_mut().get_mut(&rig) {
      state.price = price;
    }
  });
}

pub fn rig_epoch(rig: u64) -> EpochId {
  RIGS.with(|r| r.borrow().get(&rig).map(|s| s.epoch).unwrap_or(0))
}

pub fn set_fee_price(price: Balance) {
  FEE_PRICE.with(|f| *f.borrow_mut() = price);
}

pub fn set_now(secs: u64) {
  NOW.with(|n| *n.borrow_mut() = secs);
}

pub fn advance_time(secs: u64) {
  NOW.with(|n| *n.borrow_mut() += secs);
}

pub fn current_time() -> u64 {
  NOW.with(|n| *n.borrow())
}

/// Arm the rig to call back into `execute_mine` from inside `purchase`
pub fn arm_reentrancy() {
  REENTER_ON_PURCHASE.with(|f| *f.borrow_mut() = true);
}

/// Arm the rig to advance its epoch just before settling, as if a competing
/// purchase had landed between the controller's read and its execution
pub fn arm_epoch_advance() {
  ADVANCE_EPOCH_BEFORE_PURCHASE.with(|f| *f.borrow_mut() = true);
}

/// Arm the rig to settle `secs` later than the controller submitted
pub fn arm_settlement_delay(secs: u64) {
  SETTLEMENT_DELAY.with(|d| *d.borrow_mut() = secs);
}

pub fn last_purchase() -> Option<PurchaseRecord> {
  PURCHASES.with(|p| p.borrow().last().copied())
}

pub fn purchase_count() -> usize {
  PURCHASES.with(|p| p.borrow().len())
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    MiningController: pallet_mining_controller,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

/// Wall-clock controlled by the test, not by block production
pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(current_time())
  }
}

pub struct MockFeeOracle;
impl pallet_mining_controller::FeeOracle<Balance> for MockFeeOracle {
  fn current_fee_price() -> Balance {
    FEE_PRICE.with(|f| *f.borrow())
  }
}

pub struct MockRig;
impl pallet_mining_controller::RigInterface<u64> for MockRig {
  fn exists(rig: &u64) -> bool {
    RIGS.with(|r| r.borrow().contains_key(rig))
  }

  fn current_price(rig: &u64) -> Result<Balance, DispatchError> {
    RIGS.with(|r| r.borrow().get(rig).map(|s| s.price))
      .ok_or(DispatchError::Other("unknown rig"))
  }

  fn epoch_id(rig: &u64) -> Result<EpochId, DispatchError> {
    RIGS.with(|r| r.borrow().get(rig).map(|s| s.epoch))
      .ok_or(DispatchError::Other("unknown rig"))
  }

  fn payment_asset(rig: &u64) -> Result<AssetKind, DispatchError> {
    RIGS.with(|r| r.borrow().get(rig).map(|s| s.payment_asset))
      .ok_or(DispatchError::Other("unknown rig"))
  }

  fn purchase(
    rig: &u64,
    payer: &u64,
    recipient: &u64,
    expected_epoch: EpochId,
    deadline: u64,
    max_price: Balance,
    _metadata: &[u8],
  ) -> Result<Balance, DispatchError> {
    // Fault injection: a malicious rig calling back into the controller
    if REENTER_ON_PURCHASE.with(|f| *f.borrow()) {
      MiningController::execute_mine(
        RuntimeOrigin::signed(MANAGER),
        *recipient,
        Default::default(),
      )?;
    }

    // Fault injection: a competing purchase landed first
    if ADVANCE_EPOCH_BEFORE_PURCHASE.with(|f| *f.borrow()) {
      RIGS.with(|r| {
        if let Some(state) = r.borrow_mut().get_mut(rig) {
          state.epoch += 1;
        }
      });
    }

    let settle_at = current_time() + SETTLEMENT_DELAY.with(|d| *d.borrow());

    let state = RIGS
      .with(|r| r.borrow().get(rig).copied())
      .ok_or(DispatchError::Other("unknown rig"))?;

    if expected_epoch != state.epoch {
      return Err(DispatchError::Other("epoch advanced"));
    }
    if settle_at > deadline {
      return Err(DispatchError::Other("deadline passed"));
    }
    if state.price > max_price {
      return Err(DispatchError::Other("price above ceiling"));
    }

    match state.payment_asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::transfer(payer, rig, state.price, Preservation::Expendable)?;
      }
      AssetKind::Local(id) => {
        <Assets as Mutate<u64>>::transfer(id, payer, rig, state.price, Preservation::Expendable)?;
      }
    }

    // Every successful purchase advances the epoch
    RIGS.with(|r| {
      if let Some(s) = r.borrow_mut().get_mut(rig) {
        s.epoch += 1;
      }
    });

    PURCHASES.with(|p| {
      p.borrow_mut().push(PurchaseRecord {
        rig: *rig,
        payer: *payer,
        recipient: *recipient,
        expected_epoch,
        deadline,
        max_price,
        price_paid: state.price,
      })
    });

    Ok(state.price)
  }
}

pub struct ControllerPalletId;
impl Get<PalletId> for ControllerPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::MINING_CONTROLLER_PALLET_ID)
  }
}

impl pallet_mining_controller::Config for Test {
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ControllerBenchmarkHelper;
  type Assets = Assets;
  type Currency = Balances;
  type Rig = MockRig;
  type FeeOracle = MockFeeOracle;
  type TimeProvider = MockTime;
  type PalletId = ControllerPalletId;
  type PurchaseDeadline = ConstU64<{ primitives::params::PURCHASE_DEADLINE_SECS }>;
  type WeightInfo = ();
}

#[cfg(feature = "runtime-benchmarks")]
pub struct ControllerBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for ControllerBenchmarkHelper {
  fn register_rig(
    rig: &u64,
    price: Balance,
    epoch: EpochId,
    asset: AssetKind,
  ) -> polkadot_sdk::sp_runtime::DispatchResult {
    register_rig(*rig, price, epoch, asset);
    Ok(())
  }

  fn fund(
    asset: AssetKind,
    who: &u64,
    amount: Balance,
  ) -> polkadot_sdk::sp_runtime::DispatchResult {
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::mint_into(who, amount)?;
      }
      AssetKind::Local(id) => {
        <Assets as Mutate<u64>>::mint_into(id, who, amount)?;
      }
    }
    Ok(())
  }
}

/// Configuration record every test starts from
pub fn default_config() -> MiningConfig {
  MiningConfig {
    max_mining_price: 1_000,
    min_profit_margin_bps: primitives::params::DEFAULT_MIN_PROFIT_MARGIN_BPS,
    max_mint_amount: 10,
    min_mint_amount: 1,
    auto_mining_enabled: true,
    cooldown_period: 300,
    max_fee_price: 1_000_000,
    time_based_mint_period: 3_600,
  }
}

/// Custody account of the controller
pub fn controller_account() -> u64 {
  MiningController::account_id()
}

/// Mint payment tokens into the custody account
pub fn fund_controller(amount: Balance) {
  <Assets as Mutate<u64>>::mint_into(PAYMENT_ASSET, &controller_account(), amount)
    .expect("funding the controller should work");
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  // Reset collaborator state before genesis runs against it
  RIGS.with(|r| r.borrow_mut().clear());
  PURCHASES.with(|p| p.borrow_mut().clear());
  REENTER_ON_PURCHASE.with(|f| *f.borrow_mut() = false);
  ADVANCE_EPOCH_BEFORE_PURCHASE.with(|f| *f.borrow_mut() = false);
  SETTLEMENT_DELAY.with(|d| *d.borrow_mut() = 0);
  set_now(START_TIME);
  set_fee_price(10);

  register_rig(RIG, DEFAULT_PRICE, 1, AssetKind::Local(PAYMENT_ASSET));

  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![(PAYMENT_ASSET, 1, true, 1)],
    metadata: alloc::vec![],
    accounts: alloc::vec![],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_mining_controller::GenesisConfig::<Test> {
    initial_owner: Some(OWNER),
    initial_manager: Some(MANAGER),
    target_rig: Some(RIG),
    config: default_config(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
