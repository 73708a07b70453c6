//! Mining Controller Pallet
//!
//! Autonomous custody-and-trigger controller: holds payment funds in its
//! sovereign account, watches a priced, epoch-gated external rig, and executes
//! the privileged purchase ("mine") only while the configured safety and
//! profitability guards hold.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::{
  ControllerStatus, Eligibility, EligibilityReason, FeeOracle, GuardedOp, MiningConfig,
  RigInterface, Role,
};

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

use frame::deps::{
  frame_support::{
    PalletId,
    traits::{
      UnixTime,
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect, Mutate},
      tokens::Preservation,
    },
  },
  sp_runtime::traits::{AccountIdConversion, Zero},
};

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn register_rig(
    rig: &AccountId,
    price: primitives::Balance,
    epoch: primitives::EpochId,
    asset: primitives::AssetKind,
  ) -> frame::deps::sp_runtime::DispatchResult;

  fn fund(
    asset: primitives::AssetKind,
    who: &AccountId,
    amount: primitives::Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::WeightInfo;
  use super::*;
  use frame::prelude::*;
  use primitives::{AssetKind, Balance, EpochId, params};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Asset management interface for local payment/reward tokens
    type Assets: Inspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + Mutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Currency interface for the native asset
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Interface to external mining rigs (price, epoch, purchase entry point)
    type Rig: RigInterface<Self::AccountId>;

    /// Source of the network fee price the current execution would pay
    type FeeOracle: FeeOracle<Balance>;

    /// Wall-clock time source
    type TimeProvider: UnixTime;

    /// Pallet ID deriving the custody account that holds payment funds
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Seconds added to the current time to form the absolute purchase deadline
    #[pallet::constant]
    type PurchaseDeadline: Get<u64>;

    /// Weight information
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  #[pallet::storage_version(STORAGE_VERSION)]
  pub struct Pallet<T>(_);

  /// The current storage version.
  const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

  /// Role membership, checked independently per capability
  #[pallet::storage]
  pub type Roles<T: Config> =
    StorageDoubleMap<_, Twox64Concat, Role, Blake2_128Concat, T::AccountId, (), OptionQuery>;

  /// Number of accounts currently holding the Owner role
  #[pallet::storage]
  #[pallet::getter(fn owner_count)]
  pub type OwnerCount<T: Config> = StorageValue<_, u32, ValueQuery>;

  /// The active tunable-limits record, replaced as a whole by `update_config`
  #[pallet::storage]
  #[pallet::getter(fn active_config)]
  pub type ActiveConfig<T: Config> = StorageValue<_, MiningConfig, ValueQuery>;

  /// The rig the controller currently monitors and purchases from
  #[pallet::storage]
  #[pallet::getter(fn target_rig)]
  pub type TargetRig<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Timestamp (seconds) of the most recent successful mint; 0 if none yet
  #[pallet::storage]
  #[pallet::getter(fn last_mint_timestamp)]
  pub type LastMintTimestamp<T: Config> = StorageValue<_, u64, ValueQuery>;

  /// Call-in-progress markers, one per guarded operation
  #[pallet::storage]
  pub type InFlight<T: Config> = StorageMap<_, Twox64Concat, GuardedOp, (), OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Configuration record replaced
    ConfigUpdated { new_config: MiningConfig },
    /// Automated mining halted by the owner
    EmergencyStopped,
    /// A mint completed against the target rig
    MintExecuted {
      recipient: T::AccountId,
      price_paid: Balance,
      epoch_id: EpochId,
    },
    /// Funds withdrawn from the custody account
    Withdrawal {
      asset: AssetKind,
      to: T::AccountId,
      amount: Balance,
    },
    /// Target rig reference swapped
    TargetRigUpdated {
      old_rig: T::AccountId,
      new_rig: T::AccountId,
    },
    /// Role granted to an account
    RoleGranted { role: Role, who: T::AccountId },
    /// Role revoked from an account
    RoleRevoked { role: Role, who: T::AccountId },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller does not hold the role required for this operation
    NotAuthorized,
    /// `max_mint_amount` is below `min_mint_amount`
    InvalidMintBounds,
    /// Profit margin exceeds 100% in basis points
    InvalidProfitMargin,
    /// Cooldown period exceeds the one-day bound
    CooldownTooLong,
    /// Fee-price ceiling must be non-zero
    ZeroFeeCeiling,
    /// Time-based mint period must be non-zero
    ZeroTimeBasedPeriod,
    /// The account is not a registered rig
    UnknownRig,
    /// No target rig is configured
    NoTargetRig,
    /// The final Owner cannot be removed
    CannotRemoveLastOwner,
    /// Account already holds this role
    RoleAlreadyHeld,
    /// Account does not hold this role
    RoleNotHeld,
    /// Automated mining is disabled
    AutoMiningDisabled,
    /// Cooldown window since the last mint has not elapsed
    CooldownActive,
    /// Network fee price exceeds the configured ceiling
    FeePriceTooHigh,
    /// Price exceeds the ceiling and the time-based override is not due
    PriceTooHigh,
    /// Custody account does not hold enough of the payment asset
    InsufficientBalance,
    /// Operation re-entered while already in flight
    ReentrantCall,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Replace the tunable-limits record (Owner only).
    ///
    /// The record is validated and swapped as a whole; on any validation
    /// failure the previous configuration stays untouched.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::update_config())]
    pub fn update_config(origin: OriginFor<T>, new_config: MiningConfig) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;
      Self::validate_config(&new_config)?;

      ActiveConfig::<T>::put(new_config);

      Self::deposit_event(Event::ConfigUpdated { new_config });
      Ok(())
    }

    /// Unconditionally disable automated mining (Owner only). Idempotent.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::emergency_stop())]
    pub fn emergency_stop(origin: OriginFor<T>) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;

      ActiveConfig::<T>::mutate(|config| config.auto_mining_enabled = false);

      Self::deposit_event(Event::EmergencyStopped);
      Ok(())
    }

    /// Execute a mint against the target rig (Manager only, non-reentrant).
    ///
    /// Re-derives every eligibility condition from fresh rig reads; values
    /// observed through `check_eligibility` are never trusted here.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::execute_mine())]
    pub fn execute_mine(
      origin: OriginFor<T>,
      recipient: T::AccountId,
      metadata: BoundedVec<u8, ConstU32<256>>,
    ) -> DispatchResult {
      Self::ensure_role(origin, Role::Manager)?;
      let metadata = metadata.into_inner();

      Self::enter(GuardedOp::Mint)?;
      let result = Self::do_execute_mine(&recipient, &metadata);
      Self::exit(GuardedOp::Mint);
      result
    }

    /// Withdraw holdings from the custody account (Owner only, non-reentrant).
    ///
    /// `amount == 0` withdraws everything available for the given asset.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::withdraw())]
    pub fn withdraw(
      origin: OriginFor<T>,
      asset: AssetKind,
      to: T::AccountId,
      amount: Balance,
    ) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;

      Self::enter(GuardedOp::Withdraw)?;
      let result = Self::do_withdraw(asset, &to, amount);
      Self::exit(GuardedOp::Withdraw);
      result
    }

    /// Point the controller at a different registered rig (Owner only).
    ///
    /// All subsequent eligibility and mint decisions read the new rig;
    /// eligibility snapshots taken against the old rig are void.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::update_target_rig())]
    pub fn update_target_rig(origin: OriginFor<T>, new_rig: T::AccountId) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;
      ensure!(T::Rig::exists(&new_rig), Error::<T>::UnknownRig);

      let old_rig = TargetRig::<T>::get().ok_or(Error::<T>::NoTargetRig)?;
      TargetRig::<T>::put(&new_rig);

      Self::deposit_event(Event::TargetRigUpdated { old_rig, new_rig });
      Ok(())
    }

    /// Grant a role to an account (Owner only).
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::grant_role())]
    pub fn grant_role(origin: OriginFor<T>, role: Role, who: T::AccountId) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;
      ensure!(
        !Roles::<T>::contains_key(role, &who),
        Error::<T>::RoleAlreadyHeld
      );

      Roles::<T>::insert(role, &who, ());
      if role == Role::Owner {
        OwnerCount::<T>::mutate(|count| *count = count.saturating_add(1));
      }

      Self::deposit_event(Event::RoleGranted { role, who });
      Ok(())
    }

    /// Revoke a role from an account (Owner only).
    ///
    /// The final Owner cannot be removed; an unownable controller would
    /// strand the funds it holds.
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::revoke_role())]
    pub fn revoke_role(origin: OriginFor<T>, role: Role, who: T::AccountId) -> DispatchResult {
      Self::ensure_role(origin, Role::Owner)?;
      ensure!(
        Roles::<T>::contains_key(role, &who),
        Error::<T>::RoleNotHeld
      );

      if role == Role::Owner {
        ensure!(OwnerCount::<T>::get() > 1, Error::<T>::CannotRemoveLastOwner);
        OwnerCount::<T>::mutate(|count| *count = count.saturating_sub(1));
      }
      Roles::<T>::remove(role, &who);

      Self::deposit_event(Event::RoleRevoked { role, who });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Custody account holding the controller's payment funds
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Membership query backing every capability guard
    pub fn has_role(role: Role, who: &T::AccountId) -> bool {
      Roles::<T>::contains_key(role, who)
    }

    fn ensure_role(origin: OriginFor<T>, role: Role) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      ensure!(Self::has_role(role, &who), Error::<T>::NotAuthorized);
      Ok(who)
    }

    fn now() -> u64 {
      T::TimeProvider::now().as_secs()
    }

    fn asset_balance(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset {
        AssetKind::Native => T::Currency::balance(who),
        AssetKind::Local(id) => T::Assets::balance(id, who),
      }
    }

    fn validate_config(config: &MiningConfig) -> DispatchResult {
      ensure!(
        config.max_mint_amount >= config.min_mint_amount,
        Error::<T>::InvalidMintBounds
      );
      ensure!(
        config.min_profit_margin_bps <= params::HUNDRED_PERCENT_BPS,
        Error::<T>::InvalidProfitMargin
      );
      ensure!(
        config.cooldown_period <= params::MAX_COOLDOWN_PERIOD,
        Error::<T>::CooldownTooLong
      );
      ensure!(!config.max_fee_price.is_zero(), Error::<T>::ZeroFeeCeiling);
      ensure!(
        config.time_based_mint_period > 0,
        Error::<T>::ZeroTimeBasedPeriod
      );
      Ok(())
    }

    /// Take the call-in-progress marker for `op`; a nested call fails here.
    fn enter(op: GuardedOp) -> DispatchResult {
      ensure!(!InFlight::<T>::contains_key(op), Error::<T>::ReentrantCall);
      InFlight::<T>::insert(op, ());
      Ok(())
    }

    /// Release the marker. Error paths release through transactional rollback.
    fn exit(op: GuardedOp) {
      InFlight::<T>::remove(op);
    }

    fn do_execute_mine(recipient: &T::AccountId, metadata: &[u8]) -> DispatchResult {
      let config = ActiveConfig::<T>::get();
      ensure!(config.auto_mining_enabled, Error::<T>::AutoMiningDisabled);

      let now = Self::now();
      let last_mint = LastMintTimestamp::<T>::get();
      ensure!(
        now >= last_mint.saturating_add(config.cooldown_period),
        Error::<T>::CooldownActive
      );

      ensure!(
        T::FeeOracle::current_fee_price() <= config.max_fee_price,
        Error::<T>::FeePriceTooHigh
      );

      // Fresh price and epoch reads; eligibility snapshots may be arbitrarily
      // stale by the time the monitor's transaction lands.
      let rig = TargetRig::<T>::get().ok_or(Error::<T>::NoTargetRig)?;
      let current_price = T::Rig::current_price(&rig)?;
      let epoch = T::Rig::epoch_id(&rig)?;

      let price_ok = current_price <= config.max_mining_price;
      let time_ok = now >= last_mint.saturating_add(config.time_based_mint_period);
      ensure!(price_ok || time_ok, Error::<T>::PriceTooHigh);

      let controller = Self::account_id();
      let payment_asset = T::Rig::payment_asset(&rig)?;
      ensure!(
        Self::asset_balance(payment_asset, &controller) >= current_price,
        Error::<T>::InsufficientBalance
      );

      // The time-based override accepts whatever the rig currently charges;
      // the normal path keeps the configured ceiling as the rig-side bound.
      let ceiling = if price_ok {
        config.max_mining_price
      } else {
        current_price
      };
      let deadline = now.saturating_add(T::PurchaseDeadline::get());

      let price_paid = T::Rig::purchase(
        &rig,
        &controller,
        recipient,
        epoch,
        deadline,
        ceiling,
        metadata,
      )?;

      // Commit only after the rig reports success
      LastMintTimestamp::<T>::put(now);

      Self::deposit_event(Event::MintExecuted {
        recipient: recipient.clone(),
        price_paid,
        epoch_id: epoch,
      });
      Ok(())
    }

    fn do_withdraw(asset: AssetKind, to: &T::AccountId, amount: Balance) -> DispatchResult {
      let controller = Self::account_id();
      let held = Self::asset_balance(asset, &controller);

      let amount = if amount.is_zero() { held } else { amount };
      ensure!(amount <= held, Error::<T>::InsufficientBalance);

      match asset {
        AssetKind::Native => {
          T::Currency::transfer(&controller, to, amount, Preservation::Expendable)?;
        }
        AssetKind::Local(id) => {
          T::Assets::transfer(id, &controller, to, amount, Preservation::Expendable)?;
        }
      }

      Self::deposit_event(Event::Withdrawal {
        asset,
        to: to.clone(),
        amount,
      });
      Ok(())
    }

    /// Read-only eligibility decision for the external monitor.
    ///
    /// The result is a snapshot at call time and carries no freshness
    /// guarantee; `execute_mine` re-derives every condition before paying.
    pub fn check_eligibility() -> Result<Eligibility, DispatchError> {
      let config = ActiveConfig::<T>::get();
      let rig = TargetRig::<T>::get().ok_or(Error::<T>::NoTargetRig)?;
      let current_price = T::Rig::current_price(&rig)?;

      let now = Self::now();
      let last_mint = LastMintTimestamp::<T>::get();
      let price_ok = current_price <= config.max_mining_price;
      let time_ok = now >= last_mint.saturating_add(config.time_based_mint_period);

      // Price-based classification wins when both conditions hold
      let reason = if price_ok {
        EligibilityReason::PriceBased
      } else if time_ok {
        EligibilityReason::TimeBased
      } else {
        EligibilityReason::Ineligible
      };
      let eligible = price_ok || time_ok;

      Ok(Eligibility {
        eligible,
        current_price,
        recommended_amount: if eligible { config.max_mint_amount } else { 0 },
        reason,
      })
    }

    /// Read-only state aggregation for the external monitor
    pub fn status() -> Result<ControllerStatus, DispatchError> {
      let config = ActiveConfig::<T>::get();
      let rig = TargetRig::<T>::get().ok_or(Error::<T>::NoTargetRig)?;
      let current_price = T::Rig::current_price(&rig)?;
      let epoch_id = T::Rig::epoch_id(&rig)?;
      let payment_asset = T::Rig::payment_asset(&rig)?;

      let now = Self::now();
      let last_mint = LastMintTimestamp::<T>::get();

      Ok(ControllerStatus {
        auto_mining_enabled: config.auto_mining_enabled,
        current_price,
        next_cooldown_mint_at: last_mint.saturating_add(config.cooldown_period),
        next_time_based_mint_at: last_mint.saturating_add(config.time_based_mint_period),
        payment_balance: Self::asset_balance(payment_asset, &Self::account_id()),
        epoch_id,
        price_ok: current_price <= config.max_mining_price,
        time_ok: now >= last_mint.saturating_add(config.time_based_mint_period),
      })
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Account seeded with the Owner role
    pub initial_owner: Option<T::AccountId>,
    /// Account seeded with the Manager role
    pub initial_manager: Option<T::AccountId>,
    /// Rig the controller starts out monitoring
    pub target_rig: Option<T::AccountId>,
    /// Initial tunable-limits record
    pub config: MiningConfig,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Custody account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());

      let owner = self
        .initial_owner
        .clone()
        .expect("an initial owner is required");
      Roles::<T>::insert(Role::Owner, &owner, ());
      OwnerCount::<T>::put(1);

      if let Some(manager) = self.initial_manager.clone() {
        Roles::<T>::insert(Role::Manager, &manager, ());
      }

      let rig = self.target_rig.clone().expect("a target rig is required");
      assert!(T::Rig::exists(&rig), "target rig must be registered");
      TargetRig::<T>::put(rig);

      Pallet::<T>::validate_config(&self.config).expect("genesis mining config is invalid");
      ActiveConfig::<T>::put(self.config);
    }
  }
}
