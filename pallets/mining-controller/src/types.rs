use codec::DecodeWithMemTracking;
use polkadot_sdk::frame_support::pallet_prelude::*;
use serde::{Deserialize, Serialize};

// Re-export the shared asset and unit types as the single source of truth
pub use primitives::{AssetKind, Balance, EpochId};

/// Interface to an external priced, epoch-gated mining rig.
///
/// Rigs are addressed by account; the controller only ever talks to the rig
/// currently stored as its target reference. `purchase` pulls the paid price
/// from `payer` and must reject when `expected_epoch` has advanced, `deadline`
/// has passed, or the charged price exceeds `max_price`.
pub trait RigInterface<AccountId> {
  /// Whether `rig` is a registered rig this controller may be pointed at
  fn exists(rig: &AccountId) -> bool;

  /// Current total price of one mint, in smallest payment-asset units
  fn current_price(rig: &AccountId) -> Result<Balance, DispatchError>;

  /// Current epoch identifier; advances by one on every successful purchase
  fn epoch_id(rig: &AccountId) -> Result<EpochId, DispatchError>;

  /// Asset the rig charges in
  fn payment_asset(rig: &AccountId) -> Result<AssetKind, DispatchError>;

  /// Execute a purchase. Returns the price actually paid.
  fn purchase(
    rig: &AccountId,
    payer: &AccountId,
    recipient: &AccountId,
    expected_epoch: EpochId,
    deadline: u64,
    max_price: Balance,
    metadata: &[u8],
  ) -> Result<Balance, DispatchError>;
}

/// Source of the network fee price the current execution would pay
pub trait FeeOracle<Balance> {
  fn current_fee_price() -> Balance;
}

/// Capabilities checked independently at the top of every mutating operation
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub enum Role {
  /// Governs configuration, custody, the target rig, and role administration
  Owner,
  /// May trigger mint execution only
  Manager,
}

/// Operations protected by a call-in-progress reentrancy guard
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo)]
pub enum GuardedOp {
  Mint,
  Withdraw,
}

/// The controller's tunable limits, replaced atomically as one record.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct MiningConfig {
  /// Ceiling on the total payment for one mint, in smallest payment-asset units
  pub max_mining_price: Balance,
  /// Informational profitability threshold, basis points (0..=10_000)
  pub min_profit_margin_bps: u16,
  /// Informational upper bound on mint size; `>= min_mint_amount` always
  pub max_mint_amount: Balance,
  /// Informational lower bound on mint size
  pub min_mint_amount: Balance,
  /// Global kill switch for automated mining
  pub auto_mining_enabled: bool,
  /// Minimum spacing between successful mints, seconds (`<= MAX_COOLDOWN_PERIOD`)
  pub cooldown_period: u64,
  /// Ceiling on the network fee price the controller is willing to pay
  pub max_fee_price: Balance,
  /// Staleness window after which the price ceiling is waived, seconds (`> 0`)
  pub time_based_mint_period: u64,
}

/// Why a mint currently is (or is not) allowed
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub enum EligibilityReason {
  /// Current price is at or below the configured ceiling
  PriceBased,
  /// The staleness window since the last mint has elapsed
  TimeBased,
  /// Neither condition holds
  Ineligible,
}

/// Outcome of the read-only eligibility decision
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct Eligibility {
  pub eligible: bool,
  pub current_price: Balance,
  /// `max_mint_amount` when eligible, zero otherwise
  pub recommended_amount: Balance,
  pub reason: EligibilityReason,
}

/// Read-only aggregate polled by the external monitor
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct ControllerStatus {
  pub auto_mining_enabled: bool,
  pub current_price: Balance,
  /// Earliest timestamp at which the cooldown guard passes
  pub next_cooldown_mint_at: u64,
  /// Timestamp at which the time-based override becomes due
  pub next_time_based_mint_at: u64,
  /// Controller's holdings of the rig's payment asset
  pub payment_balance: Balance,
  pub epoch_id: EpochId,
  /// Whether the price condition individually holds
  pub price_ok: bool,
  /// Whether the time condition individually holds
  pub time_ok: bool,
}
