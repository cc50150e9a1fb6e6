//! Shared fixtures for integration tests

#![allow(dead_code)]

use fabrik_inject::{
	ClassName, ClassRegistry, ConstructionError, FieldDescriptor, FieldInjection,
	GlobalDependencies, InjectionResult, InjectionState, Instance, TypeRef,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Injection point storage for test types.
#[derive(Default)]
pub struct Slot(Mutex<Option<Instance>>);

impl Slot {
	pub fn set(&self, value: Instance) {
		*self.0.lock() = Some(value);
	}

	pub fn get(&self) -> Option<Instance> {
		self.0.lock().clone()
	}

	pub fn is_set(&self) -> bool {
		self.0.lock().is_some()
	}
}

/// Field stored in a [`Slot`] of `T`.
pub fn slot_field<T>(name: &str, ty: TypeRef, access: fn(&T) -> &Slot) -> FieldDescriptor
where
	T: Any + Send + Sync,
{
	FieldDescriptor::new(name, ty).setter(move |target: &T, value: Instance| {
		access(target).set(value);
		Ok(())
	})
}

/// State with a private global store so tests do not observe each other.
pub fn new_state(registry: &Arc<ClassRegistry>) -> InjectionState {
	InjectionState::with_global_dependencies(Arc::clone(registry), Arc::new(GlobalDependencies::new()))
}

/// Test class instance the injectables read their values from.
pub fn test_instance() -> Instance {
	Instance::new("shop::OrderServiceTest", ())
}

/// [`FieldInjection`] that records the instances it is asked to fill.
pub struct RecordingFieldInjection {
	pub field: FieldDescriptor,
	pub tested_class: ClassName,
	pub same_module: bool,
	pub filled: Mutex<Vec<ClassName>>,
}

impl RecordingFieldInjection {
	pub fn new(field: FieldDescriptor, same_module: bool) -> Self {
		Self {
			field,
			tested_class: ClassName::new("shop::OrderService"),
			same_module,
			filled: Mutex::new(Vec::new()),
		}
	}

	pub fn fill_count(&self) -> usize {
		self.filled.lock().len()
	}
}

impl FieldInjection for RecordingFieldInjection {
	fn target_field(&self) -> &FieldDescriptor {
		&self.field
	}

	fn target_class(&self) -> &ClassName {
		&self.tested_class
	}

	fn tested_class(&self) -> &ClassName {
		&self.tested_class
	}

	fn is_class_from_same_module_or_system_as_tested_class(&self, _class: &ClassName) -> bool {
		self.same_module
	}

	fn fill_out_dependencies_recursively(
		&self,
		_state: &mut InjectionState,
		dependency: &Instance,
	) -> InjectionResult<()> {
		self.filled.lock().push(dependency.class_name().clone());
		Ok(())
	}
}

/// Default-constructible dependency counting its constructions.
pub struct Counted;

pub fn counting_constructor(
	counter: &Arc<AtomicUsize>,
) -> impl Fn() -> Result<Counted, ConstructionError> + Send + Sync + 'static {
	let counter = Arc::clone(counter);
	move || {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(Counted)
	}
}
