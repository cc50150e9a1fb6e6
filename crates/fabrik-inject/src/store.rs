//! Dependency stores
//!
//! [`DependencyStore`] backs the per-run maps (tested objects and fabricated
//! dependencies) and is owned by a single injection pass. [`GlobalDependencies`]
//! lives for the whole process and may be touched by tests running in
//! parallel, so every operation takes its lock for exactly one key.

use crate::class::Instance;
use crate::key::DependencyKey;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-run store; not shared between threads.
#[derive(Debug, Default)]
pub struct DependencyStore {
	entries: HashMap<DependencyKey, Instance>,
}

impl DependencyStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &DependencyKey) -> Option<Instance> {
		self.entries.get(key).cloned()
	}

	pub fn insert(&mut self, key: DependencyKey, instance: Instance) {
		self.entries.insert(key, instance);
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

static SHARED: Lazy<Arc<GlobalDependencies>> = Lazy::new(|| Arc::new(GlobalDependencies::new()));

/// Process-wide store for dependencies shared across test runs.
///
/// Values are handed out as clones of the stored [`Instance`] handle; no
/// reference into the map escapes.
///
/// # Examples
///
/// ```
/// use fabrik_inject::{DependencyKey, GlobalDependencies, Instance, TypeRef};
///
/// let store = GlobalDependencies::new();
/// let key = DependencyKey::of(TypeRef::class("app::Clock"));
///
/// let first = store.get_or_insert(key.clone(), Instance::new("app::Clock", 1u8));
/// let second = store.get_or_insert(key.clone(), Instance::new("app::Clock", 2u8));
///
/// assert!(first.ptr_eq(&second));
/// ```
#[derive(Debug, Default)]
pub struct GlobalDependencies {
	entries: RwLock<HashMap<DependencyKey, Instance>>,
}

impl GlobalDependencies {
	pub fn new() -> Self {
		Self::default()
	}

	/// The store shared by every injection state of this process.
	pub fn shared() -> Arc<GlobalDependencies> {
		Arc::clone(&SHARED)
	}

	pub fn get(&self, key: &DependencyKey) -> Option<Instance> {
		self.entries.read().get(key).cloned()
	}

	pub fn insert(&self, key: DependencyKey, instance: Instance) {
		self.entries.write().insert(key, instance);
	}

	/// Stores `instance` unless the key is already bound; returns the bound instance.
	pub fn get_or_insert(&self, key: DependencyKey, instance: Instance) -> Instance {
		self.entries.write().entry(key).or_insert(instance).clone()
	}

	pub fn contains(&self, key: &DependencyKey) -> bool {
		self.entries.read().contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
