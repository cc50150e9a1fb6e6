//! Injectables and their per-pass consumption

use crate::class::Instance;
use crate::types::{ClassName, TypeRef};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an injectable, stable across clones of its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InjectableId(u64);

pub type ValueSource = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// A named, typed candidate value supplied by the test.
///
/// The value is read lazily from the test instance so an injectable that
/// the test has not assigned yet yields `None` and can be retried later.
pub struct Injectable {
	id: InjectableId,
	declared_type: TypeRef,
	name: Option<String>,
	declaring_class: Option<ClassName>,
	source: ValueSource,
}

impl Injectable {
	pub fn new<F>(declared_type: TypeRef, source: F) -> Self
	where
		F: Fn(&Instance) -> Option<Instance> + Send + Sync + 'static,
	{
		Self {
			id: InjectableId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
			declared_type,
			name: None,
			declaring_class: None,
			source: Arc::new(source),
		}
	}

	/// Injectable whose value is fixed up front.
	pub fn with_value(declared_type: TypeRef, value: Instance) -> Self {
		Self::new(declared_type, move |_| Some(value.clone()))
	}

	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Test class whose field declares this injectable.
	///
	/// Injectables without a declaring class come from test parameters.
	pub fn declared_by(mut self, class: impl Into<ClassName>) -> Self {
		self.declaring_class = Some(class.into());
		self
	}

	pub fn id(&self) -> InjectableId {
		self.id
	}

	pub fn declared_type(&self) -> &TypeRef {
		&self.declared_type
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn declaring_class(&self) -> Option<&ClassName> {
		self.declaring_class.as_ref()
	}

	pub fn value_to_inject(&self, test_instance: &Instance) -> Option<Instance> {
		(self.source)(test_instance)
	}
}

impl fmt::Debug for Injectable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Injectable")
			.field("id", &self.id)
			.field("declared_type", &self.declared_type)
			.field("name", &self.name)
			.field("declaring_class", &self.declaring_class)
			.finish_non_exhaustive()
	}
}

/// Injectables already assigned during the current pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedInjectables {
	ids: HashSet<InjectableId>,
}

impl ConsumedInjectables {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, injectable: &Injectable) -> bool {
		self.ids.contains(&injectable.id)
	}

	pub fn insert(&mut self, injectable: &Injectable) {
		self.ids.insert(injectable.id);
	}

	pub fn clear(&mut self) {
		self.ids.clear();
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

/// Source of extra injectables contributed by the executing test, e.g. mocked parameters.
pub trait ParameterRedefinitions {
	fn injectable_parameters(&self) -> Vec<Arc<Injectable>>;
}

impl ParameterRedefinitions for Vec<Arc<Injectable>> {
	fn injectable_parameters(&self) -> Vec<Arc<Injectable>> {
		self.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_ids_are_unique() {
		// Arrange
		let first = Injectable::with_value(TypeRef::class("a::X"), Instance::new("a::X", 1u8));
		let second = Injectable::with_value(TypeRef::class("a::X"), Instance::new("a::X", 1u8));

		// Assert
		assert_ne!(first.id(), second.id());
	}

	#[rstest]
	fn test_consumption_tracks_identity() {
		// Arrange
		let injectable = Arc::new(Injectable::with_value(
			TypeRef::class("a::X"),
			Instance::new("a::X", 1u8),
		));
		let other = Injectable::with_value(TypeRef::class("a::X"), Instance::new("a::X", 1u8));
		let mut consumed = ConsumedInjectables::new();

		// Act
		consumed.insert(&injectable);

		// Assert
		assert!(consumed.contains(&injectable));
		assert!(!consumed.contains(&other));
	}

	#[rstest]
	fn test_lazy_source_reads_test_instance() {
		// Arrange
		let injectable = Injectable::new(TypeRef::class("std::u32"), |test: &Instance| {
			test.downcast::<u32>()
				.filter(|value| **value > 0)
				.map(|value| Instance::from_arc("std::u32", value))
		});

		// Act & Assert
		assert!(injectable.value_to_inject(&Instance::new("a::Test", 0u32)).is_none());
		assert!(injectable.value_to_inject(&Instance::new("a::Test", 3u32)).is_some());
	}
}
