#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn update_config() -> Weight;
	fn emergency_stop() -> Weight;
	fn execute_mine() -> Weight;
	fn withdraw() -> Weight;
	fn update_target_rig() -> Weight;
	fn grant_role() -> Weight;
	fn revoke_role() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn update_config() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn emergency_stop() -> Weight {
		Weight::from_parts(15_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn execute_mine() -> Weight {
		Weight::from_parts(80_000_000, 5000)
			.saturating_add(T::DbWeight::get().reads(7))
			.saturating_add(T::DbWeight::get().writes(4))
	}
	fn withdraw() -> Weight {
		Weight::from_parts(60_000_000, 4000)
			.saturating_add(T::DbWeight::get().reads(4))
			.saturating_add(T::DbWeight::get().writes(3))
	}
	fn update_target_rig() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn grant_role() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn revoke_role() -> Weight {
		Weight::from_parts(20_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(2))
	}
}

impl WeightInfo for () {
	fn update_config() -> Weight {
		Weight::from_parts(20_000_000, 2000)
	}
	fn emergency_stop() -> Weight {
		Weight::from_parts(15_000_000, 2000)
	}
	fn execute_mine() -> Weight {
		Weight::from_parts(80_000_000, 5000)
	}
	fn withdraw() -> Weight {
		Weight::from_parts(60_000_000, 4000)
	}
	fn update_target_rig() -> Weight {
		Weight::from_parts(20_000_000, 2000)
	}
	fn grant_role() -> Weight {
		Weight::from_parts(20_000_000, 2000)
	}
	fn revoke_role() -> Weight {
		Weight::from_parts(20_000_000, 2000)
	}
}
