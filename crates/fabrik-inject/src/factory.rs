//! Instantiation of a resolved class

use crate::class::{ClassDescriptor, Instance};
use crate::collaborators::PersistenceDependencies;
use crate::error::{InjectionError, InjectionResult};
use crate::key::DependencyKey;
use crate::registry::ClassRegistry;
use std::sync::Arc;

/// Creates instances of classes, picking an implementation for interfaces.
///
/// Cheap to clone so providers can keep one for deferred construction.
#[derive(Clone)]
pub(crate) struct InstanceFactory {
	registry: Arc<ClassRegistry>,
	persistence: Option<Arc<dyn PersistenceDependencies>>,
}

impl InstanceFactory {
	pub(crate) fn new(
		registry: Arc<ClassRegistry>,
		persistence: Option<Arc<dyn PersistenceDependencies>>,
	) -> Self {
		Self {
			registry,
			persistence,
		}
	}

	/// Concrete classes use their default constructor. Interfaces go to the
	/// persistence collaborator first, then to the unique implementation.
	pub(crate) fn create_new_instance(
		&self,
		class: &ClassDescriptor,
		dependency_key: &DependencyKey,
	) -> InjectionResult<Option<Instance>> {
		if !class.is_interface() {
			return Self::new_instance_using_default_constructor_if_available(class);
		}

		if let Some(persistence) = &self.persistence
			&& let Some(instance) = persistence.new_instance_if_applicable(class, dependency_key)?
		{
			return Ok(Some(instance));
		}

		match self.registry.find_implementation_class_if_unique(class.name()) {
			Some(implementation) => {
				Self::new_instance_using_default_constructor_if_available(&implementation)
			}
			None => {
				tracing::debug!(interface = %class.name(), "no unique implementation available");
				Ok(None)
			}
		}
	}

	fn new_instance_using_default_constructor_if_available(
		class: &ClassDescriptor,
	) -> InjectionResult<Option<Instance>> {
		match class.new_instance_using_default_constructor_if_available() {
			Some(Ok(instance)) => Ok(Some(instance)),
			Some(Err(source)) => Err(InjectionError::construction(class.name(), source)),
			None => {
				tracing::debug!(class = %class.name(), "no default constructor available");
				Ok(None)
			}
		}
	}
}
