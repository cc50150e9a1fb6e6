//! Full injection
//!
//! When no injectable satisfies an injection point, [`FullInjection`]
//! fabricates a value for it: it computes the dependency key, reuses a value
//! already bound to that key, special-cases facility types (loggers,
//! providers, web-container types, conversations) and otherwise instantiates
//! the field's class, recursing into the new instance's own injection points
//! when its class belongs to the tested code.

use crate::class::{ClassDescriptor, FieldDescriptor, Instance};
use crate::collaborators::{PersistenceDependencies, WebContainerDependencies};
use crate::conversation::Conversation;
use crate::error::InjectionResult;
use crate::factory::InstanceFactory;
use crate::field_injection::FieldInjection;
use crate::generics::GenericTypeReflection;
use crate::key::DependencyKey;
use crate::logger::Logger;
use crate::provider::Provider;
use crate::registry::ClassRegistry;
use crate::settings::InjectionSettings;
use crate::state::InjectionState;
use crate::types::{ClassName, TypeRef, well_known};
use std::sync::Arc;

/// Fabricates dependencies that no injectable could satisfy.
///
/// # Examples
///
/// ```
/// use fabrik_inject::{ClassDescriptor, ClassRegistry, FullInjection};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
///
/// let registry = Arc::new(ClassRegistry::new());
/// registry.register(ClassDescriptor::concrete("app::Clock").default_constructor::<Clock>());
///
/// let full_injection = FullInjection::builder(registry).build();
/// assert!(!full_injection.has_persistence_support());
/// ```
#[derive(Clone)]
pub struct FullInjection {
	registry: Arc<ClassRegistry>,
	factory: InstanceFactory,
	persistence: Option<Arc<dyn PersistenceDependencies>>,
	web_container: Option<Arc<dyn WebContainerDependencies>>,
}

pub struct FullInjectionBuilder {
	registry: Arc<ClassRegistry>,
	persistence: Option<Arc<dyn PersistenceDependencies>>,
	web_container: Option<Arc<dyn WebContainerDependencies>>,
	settings: Option<InjectionSettings>,
}

impl FullInjectionBuilder {
	pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceDependencies>) -> Self {
		self.persistence = Some(persistence);
		self
	}

	pub fn with_web_container(mut self, web_container: Arc<dyn WebContainerDependencies>) -> Self {
		self.web_container = Some(web_container);
		self
	}

	/// Installs the interface bindings declared in `settings`.
	pub fn with_settings(mut self, settings: InjectionSettings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn build(self) -> FullInjection {
		if let Some(settings) = &self.settings {
			settings.apply_bindings(&self.registry);
		}

		FullInjection {
			factory: InstanceFactory::new(Arc::clone(&self.registry), self.persistence.clone()),
			registry: self.registry,
			persistence: self.persistence,
			web_container: self.web_container,
		}
	}
}

impl FullInjection {
	pub fn builder(registry: Arc<ClassRegistry>) -> FullInjectionBuilder {
		FullInjectionBuilder {
			registry,
			persistence: None,
			web_container: None,
			settings: None,
		}
	}

	pub fn registry(&self) -> &Arc<ClassRegistry> {
		&self.registry
	}

	pub fn has_persistence_support(&self) -> bool {
		self.persistence.is_some()
	}

	pub fn has_web_container_support(&self) -> bool {
		self.web_container.is_some()
	}

	/// Produces a value for the target field of `field_injection`.
	///
	/// `Ok(None)` means the dependency cannot be satisfied and the field stays
	/// unset. Constructor and initialization failures are returned as errors.
	pub fn new_instance(
		&self,
		state: &mut InjectionState,
		field_injection: &dyn FieldInjection,
		qualified_name: Option<&str>,
	) -> InjectionResult<Option<Instance>> {
		let field = field_injection.target_field();
		let dependency_key = self.get_dependency_key(state, field, qualified_name);

		if let Some(dependency) = state.get_instantiated_dependency(&dependency_key) {
			tracing::debug!(key = %dependency_key, "reusing instantiated dependency");
			return Ok(Some(dependency));
		}

		let field_class = match field.declared_type().raw_class() {
			Some(raw) if raw.as_str() == well_known::LOGGER => {
				let logger = Logger::for_class(field_injection.tested_class());
				return Ok(Some(logger.into_instance()));
			}
			Some(raw) => match self.registry.get(raw) {
				Some(class) => Some(class),
				None => {
					tracing::debug!(class = %raw, "field type is not registered; leaving it unset");
					return Ok(None);
				}
			},
			None => None,
		};

		if let Some(class) = &field_class {
			if !class.is_instantiable() {
				tracing::debug!(class = %class.name(), "field type is not instantiable");
				return Ok(None);
			}

			if class.name().as_str() == well_known::PROVIDER {
				return self.create_provider_instance(state, field, dependency_key);
			}

			if let Some(web_container) = &self.web_container
				&& web_container.is_applicable(class)
			{
				return web_container.create_and_register_dependency(state, class);
			}

			if class.name().as_str() == well_known::CONVERSATION {
				return Ok(Some(Self::create_and_register_conversation_instance(state)));
			}
		}

		self.create_and_register_new_instance(state, field_injection, dependency_key)
	}

	fn get_dependency_key(
		&self,
		state: &InjectionState,
		field: &FieldDescriptor,
		qualified_name: Option<&str>,
	) -> DependencyKey {
		let raw_class = field.declared_type().raw_class();
		let dependency_type = raw_class
			.map(|raw| TypeRef::Class(raw.clone()))
			.unwrap_or_else(|| field.declared_type().clone());

		if let Some(name) = qualified_name.filter(|name| !name.is_empty()) {
			return DependencyKey::qualified(dependency_type, name);
		}

		if let Some(persistence) = &self.persistence
			&& let Some(class) = raw_class.and_then(|raw| self.registry.get(raw))
			&& persistence.is_applicable(&class)
		{
			let id = field
				.metadata_items()
				.iter()
				.filter_map(|metadata| persistence.dependency_id_if_available(metadata))
				.find(|id| !id.is_empty());

			if let Some(id) = id {
				return DependencyKey::qualified(dependency_type, id);
			}
		}

		let injection_point = state
			.type_of_injection_point()
			.unwrap_or_else(|| field.declared_type());
		DependencyKey::of(state.tested_type_reflection().resolve(injection_point))
	}

	fn create_provider_instance(
		&self,
		state: &mut InjectionState,
		field: &FieldDescriptor,
		dependency_key: DependencyKey,
	) -> InjectionResult<Option<Instance>> {
		let provided_class = field
			.declared_type()
			.single_argument_of(&ClassName::new(well_known::PROVIDER))
			.map(|provided| state.tested_type_reflection().resolve(provided))
			.and_then(|provided| provided.raw_class().and_then(|raw| self.registry.get(raw)));

		let Some(provided_class) = provided_class else {
			tracing::debug!(field = field.name(), "provided type cannot be determined");
			return Ok(None);
		};

		let provider = Provider::new(provided_class, dependency_key.clone(), self.factory.clone());
		let singleton = provider.is_singleton();
		let instance = Instance::new(well_known::PROVIDER, provider);

		if singleton {
			return Ok(Some(
				state.save_global_dependency_if_absent(dependency_key, instance),
			));
		}

		state.save_instantiated_dependency(dependency_key, instance.clone());
		Ok(Some(instance))
	}

	fn create_and_register_conversation_instance(state: &mut InjectionState) -> Instance {
		state.save_global_dependency_if_absent(
			DependencyKey::of(TypeRef::class(well_known::CONVERSATION)),
			Instance::new(well_known::CONVERSATION, Conversation::new()),
		)
	}

	fn create_and_register_new_instance(
		&self,
		state: &mut InjectionState,
		field_injection: &dyn FieldInjection,
		dependency_key: DependencyKey,
	) -> InjectionResult<Option<Instance>> {
		let Some(class) = self.get_field_class(state, field_injection) else {
			tracing::debug!(key = %dependency_key, "field class cannot be determined");
			return Ok(None);
		};

		if !class.is_instantiable() {
			return Ok(None);
		}

		if let Err(rejection) = state.begin_fabrication(&dependency_key) {
			tracing::warn!(key = %dependency_key, %rejection, "refusing to fabricate dependency");
			return Ok(None);
		}

		let result = self.fabricate(state, field_injection, &class, &dependency_key);
		state.end_fabrication(&dependency_key);
		result
	}

	fn fabricate(
		&self,
		state: &mut InjectionState,
		field_injection: &dyn FieldInjection,
		class: &ClassDescriptor,
		dependency_key: &DependencyKey,
	) -> InjectionResult<Option<Instance>> {
		let dependency = self.factory.create_new_instance(class, dependency_key)?;

		if let Some(dependency) = &dependency {
			tracing::debug!(
				key = %dependency_key,
				class = %dependency.class_name(),
				"fabricated dependency"
			);
			self.register_new_instance(state, field_injection, dependency_key, dependency)?;
		}

		Ok(dependency)
	}

	/// Class to instantiate for the target field, resolving a type variable
	/// through the tested type or the class declaring the field's owner.
	fn get_field_class(
		&self,
		state: &InjectionState,
		field_injection: &dyn FieldInjection,
	) -> Option<Arc<ClassDescriptor>> {
		let field_type = field_injection.target_field().declared_type();

		let resolved = match field_type {
			TypeRef::Variable(_) => {
				let resolved = state.tested_type_reflection().resolve(field_type);
				if matches!(resolved, TypeRef::Variable(_)) {
					let target_type = TypeRef::Class(field_injection.target_class().clone());
					GenericTypeReflection::for_type(&self.registry, &target_type).resolve(&resolved)
				} else {
					resolved
				}
			}
			_ => field_type.clone(),
		};

		resolved.raw_class().and_then(|raw| self.registry.get(raw))
	}

	fn register_new_instance(
		&self,
		state: &mut InjectionState,
		field_injection: &dyn FieldInjection,
		dependency_key: &DependencyKey,
		dependency: &Instance,
	) -> InjectionResult<()> {
		let instantiated_class = dependency.class_name();

		if field_injection.is_class_from_same_module_or_system_as_tested_class(instantiated_class) {
			field_injection.fill_out_dependencies_recursively(state, dependency)?;

			if let Some(class) = self.registry.get(instantiated_class) {
				state.lifecycle_methods_mut().find_lifecycle_methods(&class);
			}
			state
				.lifecycle_methods()
				.execute_initialization_methods_if_any(instantiated_class, dependency)?;
		}

		state.save_instantiated_dependency(dependency_key.clone(), dependency.clone());
		Ok(())
	}
}
