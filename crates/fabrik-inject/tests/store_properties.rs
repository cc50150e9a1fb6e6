//! Store and consumption property tests
//!
//! Property-based tests for the dependency stores and the consumption
//! save/restore protocol.

mod support;

use fabrik_inject::{
	ClassRegistry, DependencyKey, DependencyStore, GlobalDependencies, Injectable, Instance,
	TypeRef,
};
use proptest::prelude::*;
use rstest::*;
use std::collections::HashMap;
use std::sync::Arc;
use support::{new_state, test_instance};

fn key(class: &str, qualifier: Option<&str>) -> DependencyKey {
	let ty = TypeRef::class(format!("shop::{class}"));
	match qualifier {
		Some(qualifier) => DependencyKey::qualified(ty, qualifier),
		None => DependencyKey::of(ty),
	}
}

// ============================================================================
// Property-Based Tests: stores
// ============================================================================

proptest! {
	/// Test: run store keeps the last binding per key
	///
	/// Category: Property
	/// Verifies that later inserts replace earlier ones and distinct keys never collide.
	#[rstest]
	fn prop_run_store_last_insert_wins(
		entries in prop::collection::vec(("[A-C]", prop::option::of("[xy]"), any::<u32>()), 0..32)
	) {
		let mut store = DependencyStore::new();
		let mut expected = HashMap::new();

		for (class, qualifier, value) in &entries {
			let key = key(class, qualifier.as_deref());
			store.insert(key.clone(), Instance::new(key.ty().to_string(), *value));
			expected.insert(key, *value);
		}

		prop_assert_eq!(store.len(), expected.len());
		for (key, value) in &expected {
			let stored = store.get(key).and_then(|instance| instance.downcast::<u32>());
			prop_assert_eq!(stored.as_deref(), Some(value));
		}
	}

	/// Test: global store keeps the first binding per key
	///
	/// Category: Property
	/// Verifies that get_or_insert never replaces an existing binding.
	#[rstest]
	fn prop_global_store_first_insert_wins(
		entries in prop::collection::vec(("[A-C]", any::<u32>()), 1..32)
	) {
		let store = GlobalDependencies::new();
		let mut expected = HashMap::new();

		for (class, value) in &entries {
			let key = key(class, None);
			let bound = store.get_or_insert(key.clone(), Instance::new("shop::Value", *value));
			let first = *expected.entry(key).or_insert(*value);
			let bound = bound.downcast::<u32>();
			prop_assert_eq!(bound.as_deref(), Some(&first));
		}
	}

	/// Test: consumption save/restore
	///
	/// Category: Property
	/// Verifies that whatever a nested pass consumes, the outer set comes back unchanged.
	#[rstest]
	fn prop_nested_pass_restores_outer_consumption(
		outer in prop::collection::vec(any::<bool>(), 1..12),
		inner in prop::collection::vec(any::<bool>(), 1..12),
	) {
		let registry = Arc::new(ClassRegistry::new());
		let mut state = new_state(&registry);
		let injectables: Vec<Arc<Injectable>> = (0..outer.len().max(inner.len()))
			.map(|_| {
				Arc::new(Injectable::with_value(
					TypeRef::class("shop::Clock"),
					Instance::new("shop::Clock", ()),
				))
			})
			.collect();
		state.build_lists_of_injectables(test_instance(), &injectables, None);

		for (injectable, consume) in injectables.iter().zip(&outer) {
			if *consume {
				state.get_value_to_inject(injectable);
			}
		}
		let before = state.consumed_injectables().clone();

		let saved = state.save_consumed_injectables();
		prop_assert!(state.consumed_injectables().is_empty());
		for (injectable, consume) in injectables.iter().zip(&inner) {
			if *consume {
				prop_assert!(state.get_value_to_inject(injectable).is_some());
			}
		}
		state.restore_consumed_injectables(saved);

		prop_assert_eq!(state.consumed_injectables(), &before);
	}
}
