//! Ecosystem Constants for the Mining Controller Workspace
//!
//! This module centralizes all system-level constants: pallet IDs for
//! deriving sovereign accounts and the operational limits of the
//! controller. These constants are the single source of truth and are
//! re-used across pallet logic, mock runtimes, and (eventually) runtime
//! configuration via the primitives crate.

/// Balance type alias for consistency across the workspace
pub type Balance = u128;

/// Epoch identifier owned by external mining rigs.
///
/// Monotonically increasing; each successful purchase advances it by one.
pub type EpochId = u64;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// Mining Controller pallet ID (custody account for payment funds)
  pub const MINING_CONTROLLER_PALLET_ID: &[u8; 8] = b"mincntrl";
}

/// Operational parameters of the controller.
pub mod params {
  /// Upper bound on the configurable cooldown between mints (one day, seconds).
  pub const MAX_COOLDOWN_PERIOD: u64 = 86_400;

  /// Full scale of basis-point ratios (100%).
  pub const HUNDRED_PERCENT_BPS: u16 = 10_000;

  /// Default informational profitability threshold for new deployments (5%).
  pub const DEFAULT_MIN_PROFIT_MARGIN_BPS: u16 = 500;

  /// Window added to the current time to form the absolute purchase
  /// deadline handed to the rig (seconds). A transaction delayed past
  /// this point is rejected rig-side instead of settling at a stale
  /// epoch or price.
  pub const PURCHASE_DEADLINE_SECS: u64 = 120;
}
