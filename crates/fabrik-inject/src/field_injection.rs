//! Field injection
//!
//! [`FieldInjection`] is the boundary [`FullInjection`] talks to: it names the
//! field being resolved and fills the fields of freshly fabricated
//! instances. [`FieldInjector`] is the implementation used for tested
//! objects: for each injection point it sets the injection point type,
//! looks for an injectable, and falls back to full injection.

use crate::class::{FieldDescriptor, Instance};
use crate::error::{InjectionError, InjectionResult};
use crate::full_injection::FullInjection;
use crate::key::DependencyKey;
use crate::registry::ClassRegistry;
use crate::state::InjectionState;
use crate::types::{ClassName, TypeRef};
use std::sync::Arc;

/// The field currently being injected, and how to fill out fabricated instances.
pub trait FieldInjection {
	/// Field awaiting a value.
	fn target_field(&self) -> &FieldDescriptor;

	/// Class of the object owning [`FieldInjection::target_field`].
	fn target_class(&self) -> &ClassName;

	/// Class of the tested object at the root of this injection.
	fn tested_class(&self) -> &ClassName;

	fn is_class_from_same_module_or_system_as_tested_class(&self, class: &ClassName) -> bool;

	/// Injects the injection points of `dependency`, a freshly fabricated instance.
	fn fill_out_dependencies_recursively(
		&self,
		state: &mut InjectionState,
		dependency: &Instance,
	) -> InjectionResult<()>;
}

/// Injects the fields of a tested object and, with full injection, of every
/// dependency fabricated for it.
#[derive(Clone)]
pub struct FieldInjector {
	registry: Arc<ClassRegistry>,
	full_injection: Option<FullInjection>,
	tested_class: ClassName,
}

impl FieldInjector {
	/// Injector that only assigns injectables.
	pub fn new(registry: Arc<ClassRegistry>, tested_class: impl Into<ClassName>) -> Self {
		Self {
			registry,
			full_injection: None,
			tested_class: tested_class.into(),
		}
	}

	/// Injector that fabricates whatever no injectable satisfies.
	pub fn with_full_injection(
		full_injection: FullInjection,
		tested_class: impl Into<ClassName>,
	) -> Self {
		Self {
			registry: Arc::clone(full_injection.registry()),
			full_injection: Some(full_injection),
			tested_class: tested_class.into(),
		}
	}

	pub fn tested_class(&self) -> &ClassName {
		&self.tested_class
	}

	/// Injects the injection points of `tested`, declared with `tested_type`.
	///
	/// `tested` is registered as a tested object under `tested_type` first, so
	/// dependencies declaring that type receive it instead of a new instance.
	/// Uses the consumption pass already in progress on `state`.
	pub fn inject_into_tested_object(
		&self,
		state: &mut InjectionState,
		tested_type: &TypeRef,
		tested: &Instance,
	) -> InjectionResult<()> {
		state.save_tested_object(DependencyKey::of(tested_type.clone()), tested.clone());
		state.set_tested_type(tested_type);
		let fields = self.registry.injection_points(tested.class_name());
		self.inject_into_eligible_fields(state, &fields, tested)
	}

	/// Injects the injection points of a fabricated `dependency` in a nested
	/// consumption pass, leaving the outer pass untouched.
	pub fn fill_out_dependencies_recursively(
		&self,
		state: &mut InjectionState,
		dependency: &Instance,
	) -> InjectionResult<()> {
		let fields = self.registry.injection_points(dependency.class_name());
		if fields.is_empty() {
			return Ok(());
		}

		let currently_consumed = state.save_consumed_injectables();
		let result = self.inject_into_eligible_fields(state, &fields, dependency);
		state.restore_consumed_injectables(currently_consumed);
		result
	}

	pub fn is_class_from_same_module_or_system_as_tested_class(&self, class: &ClassName) -> bool {
		self.registry.module_of(class) == self.registry.module_of(&self.tested_class)
	}

	fn inject_into_eligible_fields(
		&self,
		state: &mut InjectionState,
		fields: &[FieldDescriptor],
		target: &Instance,
	) -> InjectionResult<()> {
		for field in fields.iter().filter(|field| field.is_assignable()) {
			let Some(value) = self.get_value_for_field_if_available(state, fields, field, target)?
			else {
				tracing::debug!(
					class = %field.declaring_class(),
					field = field.name(),
					"no value available; field left unset"
				);
				continue;
			};

			field
				.assign(target, value)
				.map_err(|source| InjectionError::FieldAssignment {
					field: format!("{}.{}", field.declaring_class(), field.name()),
					source,
				})?;
		}

		Ok(())
	}

	fn get_value_for_field_if_available(
		&self,
		state: &mut InjectionState,
		fields: &[FieldDescriptor],
		field: &FieldDescriptor,
		target: &Instance,
	) -> InjectionResult<Option<Instance>> {
		state.set_type_of_injection_point(field.declared_type().clone());
		let qualified_name = field.qualified_name();

		let injectable = match qualified_name {
			Some(name) => state.find_injectable_by_type_and_name(name),
			None if Self::has_sibling_of_same_type(fields, field) => {
				state.find_injectable_by_type_and_optionally_name(field.name())
			}
			None => state.find_next_injectable_for_injection_point(),
		};

		if let Some(injectable) = injectable
			&& let Some(value) = state.get_value_to_inject(&injectable)
		{
			return Ok(Some(value));
		}

		match &self.full_injection {
			Some(full_injection) => {
				let target_field = TargetField {
					injector: self,
					field,
					target_class: target.class_name(),
				};
				full_injection.new_instance(state, &target_field, qualified_name)
			}
			None => Ok(None),
		}
	}

	fn has_sibling_of_same_type(fields: &[FieldDescriptor], field: &FieldDescriptor) -> bool {
		fields
			.iter()
			.filter(|other| other.declared_type() == field.declared_type())
			.nth(1)
			.is_some()
	}
}

struct TargetField<'a> {
	injector: &'a FieldInjector,
	field: &'a FieldDescriptor,
	target_class: &'a ClassName,
}

impl FieldInjection for TargetField<'_> {
	fn target_field(&self) -> &FieldDescriptor {
		self.field
	}

	fn target_class(&self) -> &ClassName {
		self.target_class
	}

	fn tested_class(&self) -> &ClassName {
		&self.injector.tested_class
	}

	fn is_class_from_same_module_or_system_as_tested_class(&self, class: &ClassName) -> bool {
		self.injector
			.is_class_from_same_module_or_system_as_tested_class(class)
	}

	fn fill_out_dependencies_recursively(
		&self,
		state: &mut InjectionState,
		dependency: &Instance,
	) -> InjectionResult<()> {
		self.injector
			.fill_out_dependencies_recursively(state, dependency)
	}
}
