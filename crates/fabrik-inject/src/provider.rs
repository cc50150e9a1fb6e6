//! Lazy providers
//!
//! A field declared as a provider of `T` receives a [`Provider`] that builds
//! `T` on each call to [`Provider::get`]. When `T` is singleton-scoped the
//! first successful construction is cached and shared; concurrent first
//! calls construct exactly once.

use crate::class::{ClassDescriptor, Instance};
use crate::error::{InjectionError, InjectionResult};
use crate::factory::InstanceFactory;
use crate::key::DependencyKey;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

pub struct Provider {
	provided_class: Arc<ClassDescriptor>,
	dependency_key: DependencyKey,
	factory: InstanceFactory,
	singleton: Option<OnceCell<Instance>>,
}

/// Outcome of a construction attempt that did not produce a cacheable value.
enum Uncached {
	Unsatisfied,
	Failed(InjectionError),
}

impl Provider {
	pub(crate) fn new(
		provided_class: Arc<ClassDescriptor>,
		dependency_key: DependencyKey,
		factory: InstanceFactory,
	) -> Self {
		let singleton = provided_class.is_singleton().then(OnceCell::new);
		Self {
			provided_class,
			dependency_key,
			factory,
			singleton,
		}
	}

	pub fn provided_class(&self) -> &ClassDescriptor {
		&self.provided_class
	}

	pub fn is_singleton(&self) -> bool {
		self.singleton.is_some()
	}

	/// Builds (or, for singletons, returns the cached) provided instance.
	///
	/// `Ok(None)` means the provided type cannot be instantiated; nothing is
	/// cached in that case.
	pub fn get(&self) -> InjectionResult<Option<Instance>> {
		let Some(cell) = &self.singleton else {
			return self.create();
		};

		let result = cell.get_or_try_init(|| match self.create() {
			Ok(Some(instance)) => Ok(instance),
			Ok(None) => Err(Uncached::Unsatisfied),
			Err(error) => Err(Uncached::Failed(error)),
		});

		match result {
			Ok(instance) => Ok(Some(instance.clone())),
			Err(Uncached::Unsatisfied) => Ok(None),
			Err(Uncached::Failed(error)) => Err(error),
		}
	}

	fn create(&self) -> InjectionResult<Option<Instance>> {
		tracing::debug!(
			class = %self.provided_class.name(),
			key = %self.dependency_key,
			"provider constructing instance"
		);
		self.factory
			.create_new_instance(&self.provided_class, &self.dependency_key)
	}
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Provider")
			.field("provided_class", self.provided_class.name())
			.field("dependency_key", &self.dependency_key)
			.field("singleton", &self.is_singleton())
			.finish()
	}
}
