#![cfg(feature = "runtime-benchmarks")]

use super::*;
use frame::prelude::BoundedVec;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::AssetKind;

fn bench_config() -> MiningConfig {
  MiningConfig {
    max_mining_price: 1_000_000,
    min_profit_margin_bps: 500,
    max_mint_amount: 10,
    min_mint_amount: 1,
    auto_mining_enabled: true,
    cooldown_period: 0,
    max_fee_price: 1_000_000_000,
    time_based_mint_period: 3_600,
  }
}

/// Seed roles, an active config, and a registered target rig
fn setup_controller<T: Config>() -> (T::AccountId, T::AccountId, T::AccountId) {
  let owner: T::AccountId = account("owner", 0, 0);
  let manager: T::AccountId = account("manager", 0, 0);
  let rig: T::AccountId = account("rig", 0, 0);

  Roles::<T>::insert(Role::Owner, &owner, ());
  OwnerCount::<T>::put(1);
  Roles::<T>::insert(Role::Manager, &manager, ());

  T::BenchmarkHelper::register_rig(&rig, 1_000, 1, AssetKind::Native).unwrap();
  TargetRig::<T>::put(&rig);
  ActiveConfig::<T>::put(bench_config());

  (owner, manager, rig)
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn update_config() {
    let (owner, _, _) = setup_controller::<T>();
    let mut new_config = bench_config();
    new_config.cooldown_period = 600;

    #[extrinsic_call]
    update_config(RawOrigin::Signed(owner), new_config);

    assert_eq!(ActiveConfig::<T>::get().cooldown_period, 600);
  }

  #[benchmark]
  fn emergency_stop() {
    let (owner, _, _) = setup_controller::<T>();

    #[extrinsic_call]
    emergency_stop(RawOrigin::Signed(owner));

    assert!(!ActiveConfig::<T>::get().auto_mining_enabled);
  }

  #[benchmark]
  fn execute_mine() {
    let (_, manager, _) = setup_controller::<T>();
    let recipient: T::AccountId = account("recipient", 0, 0);
    T::BenchmarkHelper::fund(AssetKind::Native, &Pallet::<T>::account_id(), 1_000_000).unwrap();

    #[extrinsic_call]
    execute_mine(RawOrigin::Signed(manager), recipient, BoundedVec::default());
  }

  #[benchmark]
  fn withdraw() {
    let (owner, _, _) = setup_controller::<T>();
    let to: T::AccountId = account("receiver", 0, 0);
    T::BenchmarkHelper::fund(AssetKind::Native, &Pallet::<T>::account_id(), 1_000_000).unwrap();

    #[extrinsic_call]
    withdraw(RawOrigin::Signed(owner), AssetKind::Native, to, 500_000);
  }

  #[benchmark]
  fn update_target_rig() {
    let (owner, _, _) = setup_controller::<T>();
    let new_rig: T::AccountId = account("rig", 1, 1);
    T::BenchmarkHelper::register_rig(&new_rig, 2_000, 1, AssetKind::Native).unwrap();

    #[extrinsic_call]
    update_target_rig(RawOrigin::Signed(owner), new_rig.clone());

    assert_eq!(TargetRig::<T>::get(), Some(new_rig));
  }

  #[benchmark]
  fn grant_role() {
    let (owner, _, _) = setup_controller::<T>();
    let who: T::AccountId = account("operator", 0, 0);

    #[extrinsic_call]
    grant_role(RawOrigin::Signed(owner), Role::Manager, who.clone());

    assert!(Pallet::<T>::has_role(Role::Manager, &who));
  }

  #[benchmark]
  fn revoke_role() {
    let (owner, manager, _) = setup_controller::<T>();

    #[extrinsic_call]
    revoke_role(RawOrigin::Signed(owner), Role::Manager, manager.clone());

    assert!(!Pallet::<T>::has_role(Role::Manager, &manager));
  }

  impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Test);
}
