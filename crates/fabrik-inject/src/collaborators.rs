//! Optional facility-specific collaborators
//!
//! The engine only dispatches to these when one has been installed on the
//! [`FullInjection`](crate::FullInjection) builder.

use crate::class::{ClassDescriptor, FieldMetadata, Instance};
use crate::error::InjectionResult;
use crate::key::DependencyKey;
use crate::state::InjectionState;

/// Builds persistence-layer dependencies such as entity managers and their factories.
pub trait PersistenceDependencies: Send + Sync {
	/// Whether `class` belongs to the persistence facility.
	fn is_applicable(&self, class: &ClassDescriptor) -> bool;

	/// Creates an instance of the interface `class` if the facility knows how to.
	fn new_instance_if_applicable(
		&self,
		class: &ClassDescriptor,
		dependency_key: &DependencyKey,
	) -> InjectionResult<Option<Instance>>;

	/// Persistence unit id declared by a field metadata item, if any.
	fn dependency_id_if_available(&self, metadata: &FieldMetadata) -> Option<String>;
}

/// Builds web-container scoped dependencies (requests, sessions, contexts).
pub trait WebContainerDependencies: Send + Sync {
	fn is_applicable(&self, class: &ClassDescriptor) -> bool;

	/// Creates the dependency and registers it in `state` under the appropriate key.
	fn create_and_register_dependency(
		&self,
		state: &mut InjectionState,
		class: &ClassDescriptor,
	) -> InjectionResult<Option<Instance>>;
}
