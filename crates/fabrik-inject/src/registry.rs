//! Class registry
//!
//! Holds every [`ClassDescriptor`] known to the engine. It answers the
//! questions runtime reflection would otherwise answer: assignability,
//! injection points of a class hierarchy and the implementation to use for
//! an interface.

use crate::class::{ClassDescriptor, ClassKind, FieldDescriptor};
use crate::types::{ClassName, TypeRef, well_known};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct ClassRegistry {
	classes: RwLock<IndexMap<ClassName, Arc<ClassDescriptor>>>,
	bindings: RwLock<HashMap<ClassName, ClassName>>,
}

impl ClassRegistry {
	/// Creates a registry holding the well-known facility classes.
	pub fn new() -> Self {
		let registry = Self::empty();
		registry.register(ClassDescriptor::interface(well_known::PROVIDER).type_parameters(["T"]));
		registry.register(ClassDescriptor::concrete(well_known::LOGGER));
		registry.register(ClassDescriptor::interface(well_known::CONVERSATION));
		registry.register(ClassDescriptor::interface(well_known::SERVLET_CONFIG));
		registry
	}

	pub fn empty() -> Self {
		Self {
			classes: RwLock::new(IndexMap::new()),
			bindings: RwLock::new(HashMap::new()),
		}
	}

	/// Registers (or replaces) a class; registration order is preserved.
	pub fn register(&self, class: ClassDescriptor) -> Arc<ClassDescriptor> {
		let class = Arc::new(class);
		self.classes
			.write()
			.insert(class.name().clone(), Arc::clone(&class));
		class
	}

	pub fn get(&self, name: &ClassName) -> Option<Arc<ClassDescriptor>> {
		self.classes.read().get(name).cloned()
	}

	pub fn contains(&self, name: &ClassName) -> bool {
		self.classes.read().contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.classes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.read().is_empty()
	}

	/// Binds an interface to the implementation fabricated for it.
	pub fn bind(&self, interface: impl Into<ClassName>, implementation: impl Into<ClassName>) {
		self.bindings
			.write()
			.insert(interface.into(), implementation.into());
	}

	pub fn binding_for(&self, interface: &ClassName) -> Option<ClassName> {
		self.bindings.read().get(interface).cloned()
	}

	/// Whether a value of class `candidate` can be used where `target` is declared.
	pub fn is_assignable_from(&self, target: &ClassName, candidate: &ClassName) -> bool {
		if target == candidate {
			return true;
		}

		let mut visited = HashSet::new();
		let mut pending = vec![candidate.clone()];

		while let Some(current) = pending.pop() {
			if !visited.insert(current.clone()) {
				continue;
			}
			let Some(class) = self.get(&current) else {
				continue;
			};
			for supertype in class.supertypes() {
				if let Some(raw) = supertype.raw_class() {
					if raw == target {
						return true;
					}
					pending.push(raw.clone());
				}
			}
		}

		false
	}

	/// Module a class belongs to: its declared module, else the root segment of its name.
	pub fn module_of(&self, name: &ClassName) -> String {
		self.get(name)
			.and_then(|class| class.declared_module().map(str::to_owned))
			.unwrap_or_else(|| name.root_segment().to_owned())
	}

	/// Finds the class to instantiate for `interface`.
	///
	/// An explicit binding wins. Otherwise every registered class assignable to
	/// `interface` is a candidate, abstract classes and sub-interfaces
	/// included. A single candidate is returned only if it is an instantiable
	/// concrete class; zero or several candidates yield `None`.
	pub fn find_implementation_class_if_unique(
		&self,
		interface: &ClassName,
	) -> Option<Arc<ClassDescriptor>> {
		if let Some(bound) = self.binding_for(interface) {
			return self.get(&bound);
		}

		let classes: Vec<Arc<ClassDescriptor>> = self
			.classes
			.read()
			.values()
			.filter(|class| class.name() != interface)
			.cloned()
			.collect();

		let mut implementation = None;
		for class in classes {
			if self.is_assignable_from(interface, class.name()) {
				if implementation.is_some() {
					tracing::warn!(
						%interface,
						"more than one implementation registered; leaving dependency unresolved"
					);
					return None;
				}
				implementation = Some(class);
			}
		}

		implementation.filter(|class| class.kind() == ClassKind::Concrete && class.is_instantiable())
	}

	/// Concrete superclasses of `name`, nearest first, excluding the class itself.
	pub fn superclasses(&self, name: &ClassName) -> Vec<Arc<ClassDescriptor>> {
		let mut chain = Vec::new();
		let mut visited = HashSet::from([name.clone()]);
		let mut current = self.get(name);

		while let Some(class) = current {
			current = class
				.supertypes()
				.iter()
				.filter_map(TypeRef::raw_class)
				.filter_map(|raw| self.get(raw))
				.find(|parent| !parent.is_interface() && visited.insert(parent.name().clone()));
			if let Some(parent) = &current {
				chain.push(Arc::clone(parent));
			}
		}

		chain
	}

	/// Injection points of `name` followed by those inherited from its superclasses.
	pub fn injection_points(&self, name: &ClassName) -> Vec<FieldDescriptor> {
		let Some(class) = self.get(name) else {
			return Vec::new();
		};

		let mut fields = class.fields().to_vec();
		for parent in self.superclasses(name) {
			fields.extend(parent.fields().iter().cloned());
		}
		fields
	}
}

impl Default for ClassRegistry {
	fn default() -> Self {
		Self::new()
	}
}
