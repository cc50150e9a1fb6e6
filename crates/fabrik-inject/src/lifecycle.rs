//! Initialization methods of fabricated instances

use crate::class::{ClassDescriptor, Instance, LifecycleHook};
use crate::error::{InjectionError, InjectionResult};
use crate::types::ClassName;
use std::collections::HashMap;

/// Finds and runs the initialization methods of classes instantiated during injection.
#[derive(Default)]
pub struct LifecycleMethods {
	initialization_methods: HashMap<ClassName, Vec<LifecycleHook>>,
	servlet_config: Option<Instance>,
}

impl LifecycleMethods {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the initialization methods of `class`; later calls for the same class are no-ops.
	pub fn find_lifecycle_methods(&mut self, class: &ClassDescriptor) {
		self.initialization_methods
			.entry(class.name().clone())
			.or_insert_with(|| class.initialization_methods().to_vec());
	}

	pub fn has_lifecycle_methods(&self, class: &ClassName) -> bool {
		self.initialization_methods
			.get(class)
			.is_some_and(|methods| !methods.is_empty())
	}

	/// Runs the initialization methods found for `class` on `instance`.
	pub fn execute_initialization_methods_if_any(
		&self,
		class: &ClassName,
		instance: &Instance,
	) -> InjectionResult<()> {
		let Some(methods) = self.initialization_methods.get(class) else {
			return Ok(());
		};

		for method in methods {
			method(instance, self.servlet_config.as_ref()).map_err(|source| {
				InjectionError::Lifecycle {
					class: class.clone(),
					source,
				}
			})?;
		}

		if !methods.is_empty() {
			tracing::debug!(%class, count = methods.len(), "ran initialization methods");
		}
		Ok(())
	}

	/// Configuration handed to initialization methods of web components.
	pub fn set_servlet_config(&mut self, config: Option<Instance>) {
		self.servlet_config = config;
	}

	pub fn servlet_config(&self) -> Option<&Instance> {
		self.servlet_config.as_ref()
	}
}
