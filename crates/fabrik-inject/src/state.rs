//! Injection state
//!
//! [`InjectionState`] holds everything an injection pass needs for one test
//! class instance: the injectables declared by the test, the subset already
//! consumed in the current pass, the type of the injection point being
//! resolved, and the stores of tested objects and fabricated dependencies.
//!
//! # Threading
//!
//! An `InjectionState` is driven by one construction pass at a time and does
//! no internal locking; callers serialize passes. Only the
//! [`GlobalDependencies`] store it points to is shared between threads.

use crate::class::Instance;
use crate::cycle_detection::{CycleError, FabricationTracker};
use crate::generics::GenericTypeReflection;
use crate::injectable::{ConsumedInjectables, Injectable, ParameterRedefinitions};
use crate::key::DependencyKey;
use crate::lifecycle::LifecycleMethods;
use crate::registry::ClassRegistry;
use crate::settings::InjectionSettings;
use crate::store::{DependencyStore, GlobalDependencies};
use crate::types::{ClassName, TypeRef, well_known};
use std::sync::Arc;

pub struct InjectionState {
	registry: Arc<ClassRegistry>,
	global_dependencies: Arc<GlobalDependencies>,
	tested_objects: DependencyStore,
	instantiated_dependencies: DependencyStore,
	injectables: Vec<Arc<Injectable>>,
	consumed_injectables: ConsumedInjectables,
	lifecycle_methods: LifecycleMethods,
	tested_type_reflection: GenericTypeReflection,
	current_test_class_instance: Option<Instance>,
	type_of_injection_point: Option<TypeRef>,
	fabrication: FabricationTracker,
}

impl InjectionState {
	/// Creates a state backed by the process-wide global store.
	///
	/// # Examples
	///
	/// ```
	/// use fabrik_inject::{ClassRegistry, InjectionState};
	/// use std::sync::Arc;
	///
	/// let state = InjectionState::new(Arc::new(ClassRegistry::new()));
	/// assert!(state.type_of_injection_point().is_none());
	/// ```
	pub fn new(registry: Arc<ClassRegistry>) -> Self {
		Self::with_global_dependencies(registry, GlobalDependencies::shared())
	}

	/// Creates a state backed by the given global store.
	pub fn with_global_dependencies(
		registry: Arc<ClassRegistry>,
		global_dependencies: Arc<GlobalDependencies>,
	) -> Self {
		Self {
			registry,
			global_dependencies,
			tested_objects: DependencyStore::new(),
			instantiated_dependencies: DependencyStore::new(),
			injectables: Vec::new(),
			consumed_injectables: ConsumedInjectables::new(),
			lifecycle_methods: LifecycleMethods::new(),
			tested_type_reflection: GenericTypeReflection::empty(),
			current_test_class_instance: None,
			type_of_injection_point: None,
			fabrication: FabricationTracker::default(),
		}
	}

	/// Applies the fabrication limits of `settings`.
	pub fn with_settings(mut self, settings: &InjectionSettings) -> Self {
		self.fabrication = FabricationTracker::new(settings.max_fabrication_depth);
		self
	}

	pub fn registry(&self) -> &Arc<ClassRegistry> {
		&self.registry
	}

	pub fn global_dependencies(&self) -> &Arc<GlobalDependencies> {
		&self.global_dependencies
	}

	/// Replaces the injectables with those declared by the test class plus those
	/// contributed by the executing test's parameters.
	///
	/// Must run once per test method invocation, before any resolution.
	pub fn build_lists_of_injectables(
		&mut self,
		test_class_instance: Instance,
		injectable_fields: &[Arc<Injectable>],
		parameter_redefinitions: Option<&dyn ParameterRedefinitions>,
	) {
		self.injectables = injectable_fields.to_vec();

		if let Some(redefinitions) = parameter_redefinitions {
			self.injectables
				.extend(redefinitions.injectable_parameters());
		}

		self.current_test_class_instance = Some(test_class_instance);
		self.get_servlet_config_for_init_methods_if_any();

		tracing::debug!(
			injectables = self.injectables.len(),
			"built list of injectables"
		);
	}

	fn get_servlet_config_for_init_methods_if_any(&mut self) {
		let servlet_config = ClassName::new(well_known::SERVLET_CONFIG);
		let config = self
			.injectables
			.iter()
			.find(|injectable| injectable.declared_type().raw_class() == Some(&servlet_config))
			.and_then(|injectable| {
				self.current_test_class_instance
					.as_ref()
					.and_then(|test| injectable.value_to_inject(test))
			});

		if config.is_some() {
			self.lifecycle_methods.set_servlet_config(config);
		}
	}

	/// Drops injectables declared below `test_superclass` in the test class hierarchy.
	///
	/// Injectables without a declaring class (test parameters) are dropped too.
	pub fn discard_injectables_from_lower_test_class_hierarchy_levels(
		&mut self,
		test_superclass: &ClassName,
	) {
		let registry = &self.registry;
		self.injectables.retain(|injectable| {
			injectable
				.declaring_class()
				.is_some_and(|declaring| registry.is_assignable_from(declaring, test_superclass))
		});
	}

	pub fn injectables(&self) -> &[Arc<Injectable>] {
		&self.injectables
	}

	pub fn current_test_class_instance(&self) -> Option<&Instance> {
		self.current_test_class_instance.as_ref()
	}

	/// Binds the type parameters of the tested type for subsequent matching.
	pub fn set_tested_type(&mut self, tested_type: &TypeRef) {
		self.tested_type_reflection = GenericTypeReflection::for_type(&self.registry, tested_type);
	}

	pub fn tested_type_reflection(&self) -> &GenericTypeReflection {
		&self.tested_type_reflection
	}

	/// Sets the type every subsequent matching query compares against.
	pub fn set_type_of_injection_point(&mut self, type_of_injection_point: TypeRef) {
		self.type_of_injection_point = Some(type_of_injection_point);
	}

	pub fn type_of_injection_point(&self) -> Option<&TypeRef> {
		self.type_of_injection_point.as_ref()
	}

	/// Whether a value declared as `injectable_type` can satisfy the current injection point.
	///
	/// Besides generic type matching, an injection point declared as a
	/// provider of `T` accepts an injectable of type `T`.
	pub fn is_same_type_as_injection_point(&self, injectable_type: &TypeRef) -> bool {
		let Some(injection_point) = &self.type_of_injection_point else {
			return false;
		};

		if self
			.tested_type_reflection
			.are_matching_types(&self.registry, injection_point, injectable_type)
		{
			return true;
		}

		injection_point
			.single_argument_of(&ClassName::new(well_known::PROVIDER))
			.is_some_and(|provided| provided == injectable_type)
	}

	fn has_same_type_as_injection_point(&self, injectable: &Injectable) -> bool {
		self.is_same_type_as_injection_point(injectable.declared_type())
	}

	fn is_available(&self, injectable: &Injectable) -> bool {
		self.has_same_type_as_injection_point(injectable)
			&& !self.consumed_injectables.contains(injectable)
	}

	/// First unconsumed injectable matching the injection point.
	pub fn find_next_injectable_for_injection_point(&self) -> Option<Arc<Injectable>> {
		self.injectables
			.iter()
			.find(|injectable| self.is_available(injectable))
			.cloned()
	}

	/// Every unconsumed injectable matching the injection point.
	pub fn find_injectables_by_type(&self) -> Vec<Arc<Injectable>> {
		self.injectables
			.iter()
			.filter(|injectable| self.is_available(injectable))
			.cloned()
			.collect()
	}

	/// Matching injectable named `name`, else the first matching injectable.
	pub fn find_injectable_by_type_and_optionally_name(
		&self,
		name: &str,
	) -> Option<Arc<Injectable>> {
		let mut found = None;

		for injectable in &self.injectables {
			if self.has_same_type_as_injection_point(injectable) {
				if injectable.name() == Some(name) {
					return Some(Arc::clone(injectable));
				}
				if found.is_none() {
					found = Some(Arc::clone(injectable));
				}
			}
		}

		found
	}

	/// Matching injectable named exactly `name`.
	pub fn find_injectable_by_type_and_name(&self, name: &str) -> Option<Arc<Injectable>> {
		self.injectables
			.iter()
			.find(|injectable| {
				self.has_same_type_as_injection_point(injectable) && injectable.name() == Some(name)
			})
			.cloned()
	}

	/// Reads the value of `injectable`, consuming it if a value is present.
	///
	/// Returns `None` when the injectable was already consumed in this pass or
	/// currently has no value; only the latter leaves it available.
	pub fn get_value_to_inject(&mut self, injectable: &Injectable) -> Option<Instance> {
		if self.consumed_injectables.contains(injectable) {
			return None;
		}

		let value = self
			.current_test_class_instance
			.as_ref()
			.and_then(|test| injectable.value_to_inject(test));

		if value.is_some() {
			tracing::trace!(
				injectable = ?injectable.id(),
				name = injectable.name(),
				"consumed injectable"
			);
			self.consumed_injectables.insert(injectable);
		}

		value
	}

	pub fn consumed_injectables(&self) -> &ConsumedInjectables {
		&self.consumed_injectables
	}

	pub fn reset_consumed_injectables(&mut self) {
		self.consumed_injectables.clear();
	}

	/// Starts a nested pass: returns the current consumption set and installs an empty one.
	///
	/// There is a single slot; nested passes must restore before saving again.
	#[must_use = "the saved set must be handed back to restore_consumed_injectables"]
	pub fn save_consumed_injectables(&mut self) -> ConsumedInjectables {
		std::mem::take(&mut self.consumed_injectables)
	}

	pub fn restore_consumed_injectables(&mut self, previous: ConsumedInjectables) {
		self.consumed_injectables = previous;
	}

	pub fn get_tested_object(&self, key: &DependencyKey) -> Option<Instance> {
		self.tested_objects.get(key)
	}

	pub fn save_tested_object(&mut self, key: DependencyKey, tested_object: Instance) {
		self.tested_objects.insert(key, tested_object);
	}

	/// Dependency fabricated earlier in this run, ignoring tested objects and global ones.
	pub fn get_tested_instance(&self, key: &DependencyKey) -> Option<Instance> {
		self.instantiated_dependencies.get(key)
	}

	pub fn get_global_dependency(&self, key: &DependencyKey) -> Option<Instance> {
		self.global_dependencies.get(key)
	}

	/// Looks `key` up in tested objects, then run dependencies, then global dependencies.
	pub fn get_instantiated_dependency(&self, key: &DependencyKey) -> Option<Instance> {
		self.tested_objects
			.get(key)
			.or_else(|| self.instantiated_dependencies.get(key))
			.or_else(|| self.global_dependencies.get(key))
	}

	pub fn save_instantiated_dependency(&mut self, key: DependencyKey, dependency: Instance) {
		self.instantiated_dependencies.insert(key, dependency);
	}

	pub fn save_global_dependency(&self, key: DependencyKey, dependency: Instance) {
		self.global_dependencies.insert(key, dependency);
	}

	/// Registers `dependency` globally unless the key is already bound; returns the bound value.
	pub fn save_global_dependency_if_absent(
		&self,
		key: DependencyKey,
		dependency: Instance,
	) -> Instance {
		self.global_dependencies.get_or_insert(key, dependency)
	}

	/// Resets the per-run stores ahead of a fresh tested-object construction.
	pub fn clear_tested_objects_and_instantiated_dependencies(&mut self) {
		self.tested_objects.clear();
		self.instantiated_dependencies.clear();
		self.fabrication.clear();
	}

	pub fn lifecycle_methods(&self) -> &LifecycleMethods {
		&self.lifecycle_methods
	}

	pub fn lifecycle_methods_mut(&mut self) -> &mut LifecycleMethods {
		&mut self.lifecycle_methods
	}

	pub(crate) fn begin_fabrication(&mut self, key: &DependencyKey) -> Result<(), CycleError> {
		self.fabrication.begin(key)
	}

	pub(crate) fn end_fabrication(&mut self, key: &DependencyKey) {
		self.fabrication.end(key);
	}

	pub fn fabrication_depth(&self) -> usize {
		self.fabrication.depth()
	}
}
